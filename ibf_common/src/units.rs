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

//! unit-token resolution and conversion to the internal standard units
//! (°C, mm, cm, kph, meters). `MemberRecord` fields are plain `f64`s with
//! unit-suffixed names rather than `uom` quantities: the rounding rules that
//! consume them (see `ibf_format`) are display-time business rules, not
//! dimensional algebra.

pub const STANDARD_TEMP_UNIT: &str = "celsius";
pub const STANDARD_PRECIP_UNIT: &str = "mm";
pub const STANDARD_WIND_UNIT: &str = "kph";

fn is_one_of(token: &str, set: &[&str]) -> bool {
    set.contains(&token)
}

const CELSIUS_UNITS: &[&str] = &["c", "celsius", "centigrade"];
const FAHRENHEIT_UNITS: &[&str] = &["f", "fahrenheit"];
const MM_UNITS: &[&str] = &["mm", "millimeter", "millimeters", "millimetre", "millimetres"];
const CM_UNITS: &[&str] = &["cm", "centimeter", "centimeters", "centimetre", "centimetres"];
const INCH_UNITS: &[&str] = &["inch", "in", "inches"];
const KPH_UNITS: &[&str] = &["kph", "kmh", "km/h"];
const MPH_UNITS: &[&str] = &["mph"];
const MPS_UNITS: &[&str] = &["mps", "m/s", "ms"];
const KT_UNITS: &[&str] = &["kt", "kts", "kn", "knots"];
const FEET_UNITS: &[&str] = &["ft", "feet", "foot"];
const METER_UNITS: &[&str] = &["m", "meter", "meters", "metre", "metres"];

/// normalize a raw unit token: trim, lowercase, strip any degree symbol
pub fn normalize_unit_token(value: &str) -> String {
    value.trim().to_lowercase().replace('\u{00b0}', "")
}

/// resolve the unit token for `key` out of an Open-Meteo `hourly_units` map, or fall back
pub fn resolve_unit_token(hourly_units: &serde_json::Map<String, serde_json::Value>, key: &str, fallback: &str) -> String {
    let token = hourly_units
        .get(key)
        .and_then(|v| v.as_str())
        .map(normalize_unit_token)
        .unwrap_or_default();
    if token.is_empty() { normalize_unit_token(fallback) } else { token }
}

/// snowfall has no stable hourly_units key of its own on some Open-Meteo responses;
/// fall back to the precipitation unit's natural snowfall counterpart
pub fn resolve_snowfall_unit(hourly_units: &serde_json::Map<String, serde_json::Value>, precip_unit: &str) -> String {
    let token = hourly_units
        .get("snowfall")
        .and_then(|v| v.as_str())
        .map(normalize_unit_token)
        .unwrap_or_default();
    if !token.is_empty() {
        return token;
    }
    if is_one_of(precip_unit, INCH_UNITS) { "inch".to_string() } else { "cm".to_string() }
}

pub fn to_celsius(value: f64, unit: &str) -> f64 {
    if is_one_of(unit, FAHRENHEIT_UNITS) { (value - 32.0) * (5.0 / 9.0) } else { value }
}

pub fn to_mm(value: f64, unit: &str) -> f64 {
    if is_one_of(unit, INCH_UNITS) { value * 25.4 }
    else if is_one_of(unit, CM_UNITS) { value * 10.0 }
    else { value }
}

pub fn to_cm(value: f64, unit: &str) -> f64 {
    if is_one_of(unit, INCH_UNITS) { value * 2.54 }
    else if is_one_of(unit, MM_UNITS) { value / 10.0 }
    else { value }
}

pub fn to_kph(value: f64, unit: &str) -> f64 {
    if is_one_of(unit, MPH_UNITS) { value * 1.609344 }
    else if is_one_of(unit, MPS_UNITS) { value * 3.6 }
    else if is_one_of(unit, KT_UNITS) { value * 1.852 }
    else { value }
}

pub fn to_meters(value: f64, unit: &str) -> f64 {
    if is_one_of(unit, FEET_UNITS) { value * 0.3048 } else { value }
}

pub fn is_fahrenheit(unit: &str) -> bool { is_one_of(unit, FAHRENHEIT_UNITS) }
pub fn is_inch(unit: &str) -> bool { is_one_of(unit, INCH_UNITS) }
pub fn is_feet(unit: &str) -> bool { is_one_of(unit, FEET_UNITS) }

/// display label for a unit token (e.g. "inch" -> "in"); otherwise returned as-is
pub fn format_unit_label(unit: &str) -> String {
    let normalized = unit.trim().to_lowercase();
    if normalized == "inch" || normalized == "in" { "in".to_string() } else { normalized }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_round_trip() {
        assert!((to_celsius(32.0, "fahrenheit") - 0.0).abs() < 1e-9);
        assert!((to_celsius(212.0, "f") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn precip_conversions() {
        assert!((to_mm(1.0, "inch") - 25.4).abs() < 1e-9);
        assert!((to_mm(1.0, "cm") - 10.0).abs() < 1e-9);
        assert!((to_mm(5.0, "mm") - 5.0).abs() < 1e-9);
    }

    #[test]
    fn wind_conversions() {
        assert!((to_kph(1.0, "mph") - 1.609344).abs() < 1e-9);
        assert!((to_kph(1.0, "kt") - 1.852).abs() < 1e-9);
    }
}
