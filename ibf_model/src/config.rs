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

//! immutable configuration records produced by the out-of-scope TOML loader
//! and consumed by value throughout the pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// prose length target for generated narratives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wordiness {
    Brief,
    Normal,
    Detailed,
}

/// reasoning effort requested from a reasoning-capable LLM; `Auto` lets the
/// provider pick, `Off` disables the reasoning parameter entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningLevel {
    Low,
    Medium,
    High,
    Auto,
    Off,
}

/// display unit system; per-entity unit overrides are free-form string maps
/// (temperature_unit, precipitation_unit, windspeed_unit, snowfall_unit,
/// altitude_m) resolved through `ibf_common::units`, but a coarse metric vs.
/// imperial toggle is useful as a quick default for formatter rounding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaMode {
    Area,
    Regional,
}

/// raw unit-override tokens keyed by field name, e.g. `temperature_unit` ->
/// `"fahrenheit"`. Kept as strings rather than a typed enum because the set
/// of accepted synonyms is owned by `ibf_common::units`.
pub type UnitOverrides = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub translation_language: Option<String>,
    pub extra_context: Option<String>,
    pub units: UnitOverrides,
    pub model: Option<String>,
    pub snow_levels: Option<bool>,
    pub refresh_interval_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub name: String,
    pub locations: Vec<String>,
    pub mode: AreaMode,
    pub translation_language: Option<String>,
    pub extra_context: Option<String>,
    pub units: UnitOverrides,
    pub model: Option<String>,
    pub snow_levels: Option<bool>,
    pub refresh_interval_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub locations: Vec<Location>,
    pub areas: Vec<Area>,
    pub web_root: PathBuf,

    pub location_forecast_days: u32,
    pub area_forecast_days: u32,

    pub location_wordiness: Wordiness,
    pub area_wordiness: Wordiness,

    pub enable_reasoning: bool,
    pub location_reasoning: ReasoningLevel,
    pub area_reasoning: ReasoningLevel,

    pub location_impact_based: bool,
    pub area_impact_based: bool,

    pub location_thin_select: Option<u32>,
    pub area_thin_select: Option<u32>,

    pub llm: String,
    pub context_llm: String,
    pub translation_llm: Option<String>,
    pub translation_language: Option<String>,

    pub recent_overwrite_minutes: u32,
    pub snow_levels: bool,
    pub model: String,
}

impl ForecastConfig {
    /// units an `Area` member inherits from the matching top-level `Location`
    /// by name. Unmatched names fall back to the area's own overrides -- both
    /// branches are valid per the data model invariant.
    pub fn resolve_member_units(&self, area: &Area, member_name: &str) -> UnitOverrides {
        match self.locations.iter().find(|loc| loc.name == member_name) {
            Some(loc) => loc.units.clone(),
            None => area.units.clone(),
        }
    }

    pub fn resolve_member_altitude(&self, member_name: &str) -> Option<f64> {
        self.locations
            .iter()
            .find(|loc| loc.name == member_name)
            .and_then(|loc| loc.units.get("altitude_m"))
            .and_then(|s| s.parse::<f64>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ForecastConfig {
        ForecastConfig {
            locations: vec![Location {
                name: "Test City".into(),
                translation_language: None,
                extra_context: None,
                units: UnitOverrides::from([("temperature_unit".to_string(), "fahrenheit".to_string())]),
                model: None,
                snow_levels: None,
                refresh_interval_minutes: None,
            }],
            areas: vec![Area {
                name: "Sample Area".into(),
                locations: vec!["Test City".into(), "Unmatched".into()],
                mode: AreaMode::Area,
                translation_language: None,
                extra_context: None,
                units: UnitOverrides::from([("temperature_unit".to_string(), "celsius".to_string())]),
                model: None,
                snow_levels: None,
                refresh_interval_minutes: None,
            }],
            web_root: PathBuf::from("/tmp/web"),
            location_forecast_days: 4,
            area_forecast_days: 4,
            location_wordiness: Wordiness::Normal,
            area_wordiness: Wordiness::Normal,
            enable_reasoning: false,
            location_reasoning: ReasoningLevel::Off,
            area_reasoning: ReasoningLevel::Off,
            location_impact_based: false,
            area_impact_based: false,
            location_thin_select: None,
            area_thin_select: None,
            llm: "gpt-4.1".into(),
            context_llm: "gemini-2.0-flash".into(),
            translation_llm: None,
            translation_language: None,
            recent_overwrite_minutes: 60,
            snow_levels: false,
            model: "ens:ecmwf_ifs025".into(),
        }
    }

    #[test]
    fn member_inherits_location_units() {
        let cfg = sample_config();
        let area = &cfg.areas[0];
        let units = cfg.resolve_member_units(area, "Test City");
        assert_eq!(units.get("temperature_unit").unwrap(), "fahrenheit");
    }

    #[test]
    fn unmatched_member_uses_area_units() {
        let cfg = sample_config();
        let area = &cfg.areas[0];
        let units = cfg.resolve_member_units(area, "Unmatched");
        assert_eq!(units.get("temperature_unit").unwrap(), "celsius");
    }
}
