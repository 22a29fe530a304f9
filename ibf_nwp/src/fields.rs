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

//! hourly field-set strings for the two request shapes, plus the
//! pressure-level profile fields used by the snow-level diagnostic's
//! fallback path when freezing-level height is unavailable.

use ibf_model::ModelKind;

pub const HOURLY_FIELDS_BASE: &str = "temperature_2m,dewpoint_2m,precipitation,snowfall,weather_code,cloud_cover,wind_speed_10m,wind_direction_10m,wind_gusts_10m";

pub const HOURLY_FIELDS_DETERMINISTIC_SUFFIX: &str = "precipitation_probability,freezing_level_height";

pub const PRESSURE_LEVELS_SNOW_HPA: &[u32] = &[1000, 925, 850, 700, 600, 500];

pub const STANDARD_TEMPERATURE_UNIT: &str = "celsius";
pub const STANDARD_PRECIPITATION_UNIT: &str = "mm";
pub const STANDARD_WINDSPEED_UNIT: &str = "kmh";

pub fn hourly_fields_for(kind: ModelKind, explicit: Option<&str>) -> String {
    if let Some(explicit) = explicit {
        return explicit.to_string();
    }
    match kind {
        ModelKind::Ensemble => HOURLY_FIELDS_BASE.to_string(),
        ModelKind::Deterministic => format!("{HOURLY_FIELDS_BASE},{HOURLY_FIELDS_DETERMINISTIC_SUFFIX}"),
    }
}

pub fn remove_field(fields: &str, name: &str) -> String {
    fields
        .split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty() && *tok != name)
        .collect::<Vec<_>>()
        .join(",")
}

/// `surface_pressure` plus temperature/relative_humidity/geopotential_height
/// at each of `PRESSURE_LEVELS_SNOW_HPA`, used when freezing-level height is
/// absent and snow diagnostics are still enabled.
pub fn pressure_profile_fields() -> String {
    let mut fields = vec!["surface_pressure".to_string()];
    for level in PRESSURE_LEVELS_SNOW_HPA {
        fields.push(format!("temperature_{level}hPa"));
    }
    for level in PRESSURE_LEVELS_SNOW_HPA {
        fields.push(format!("relative_humidity_{level}hPa"));
    }
    for level in PRESSURE_LEVELS_SNOW_HPA {
        fields.push(format!("geopotential_height_{level}hPa"));
    }
    fields.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensemble_omits_deterministic_only_fields() {
        let fields = hourly_fields_for(ModelKind::Ensemble, None);
        assert!(!fields.contains("freezing_level_height"));
    }

    #[test]
    fn deterministic_includes_freezing_level() {
        let fields = hourly_fields_for(ModelKind::Deterministic, None);
        assert!(fields.contains("freezing_level_height"));
        assert!(fields.contains("precipitation_probability"));
    }

    #[test]
    fn remove_field_drops_single_token() {
        let fields = hourly_fields_for(ModelKind::Deterministic, None);
        let reduced = remove_field(&fields, "freezing_level_height");
        assert!(!reduced.contains("freezing_level_height"));
        assert!(reduced.contains("precipitation_probability"));
    }
}
