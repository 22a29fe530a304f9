/*
 * Copyright © 2026 the ibf contributors.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! display-unit conversions: `ibf_common::units` normalizes provider data
//! *into* the internal standard units, these functions run in the opposite
//! direction, turning a standard-unit value back into whatever the location
//! or area config asked to display.

use ibf_common::units::{is_fahrenheit, is_inch};

/// bundles the four per-entity display unit tokens threaded through every
/// formatting call.
#[derive(Debug, Clone)]
pub struct DisplayUnits {
    pub temperature_unit: String,
    pub precipitation_unit: String,
    pub snowfall_unit: String,
    pub windspeed_unit: String,
}

pub fn snow_level_unit_label(temperature_unit: &str, precipitation_unit: &str) -> &'static str {
    if is_fahrenheit(temperature_unit) || is_inch(precipitation_unit) { "ft" } else { "m" }
}

pub fn display_temperature(value_c: f64, unit: &str) -> f64 {
    if is_fahrenheit(unit) { value_c * 9.0 / 5.0 + 32.0 } else { value_c }
}

pub fn display_precipitation(value_mm: f64, unit: &str) -> f64 {
    if is_inch(unit) { value_mm / 25.4 } else { value_mm }
}

pub fn display_snowfall(value_cm: f64, unit: &str) -> f64 {
    if is_inch(unit) { value_cm / 2.54 } else { value_cm }
}

pub fn display_wind(value_kph: f64, unit: &str) -> f64 {
    match unit.to_lowercase().as_str() {
        "mph" => value_kph / 1.609344,
        "kt" => value_kph / 1.852,
        "mps" => value_kph / 3.6,
        _ => value_kph,
    }
}

/// `None` for non-positive values; otherwise the snow level rounded to the
/// nearest 500 ft (imperial display) or 100 m (metric display).
pub fn display_snow_level(value_m: f64, temperature_unit: &str, precipitation_unit: &str) -> Option<i64> {
    if value_m <= 0.0 {
        return None;
    }
    if is_fahrenheit(temperature_unit) || is_inch(precipitation_unit) {
        let value_ft = value_m * 3.28084;
        Some((value_ft / 500.0).round() as i64 * 500)
    } else {
        Some((value_m / 100.0).round() as i64 * 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_converts_only_for_fahrenheit() {
        assert!((display_temperature(0.0, "fahrenheit") - 32.0).abs() < 1e-9);
        assert!((display_temperature(100.0, "celsius") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn snow_level_rounds_to_nearest_bucket() {
        assert_eq!(display_snow_level(950.0, "celsius", "mm"), Some(1000));
        assert_eq!(display_snow_level(0.0, "celsius", "mm"), None);
    }

    #[test]
    fn snow_level_unit_follows_temperature_or_precip() {
        assert_eq!(snow_level_unit_label("fahrenheit", "mm"), "ft");
        assert_eq!(snow_level_unit_label("celsius", "inch"), "ft");
        assert_eq!(snow_level_unit_label("celsius", "mm"), "m");
    }
}
