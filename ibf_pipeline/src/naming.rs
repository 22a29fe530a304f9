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

//! display-name disambiguation for duplicated location names (§4.8 step 2).

use std::collections::HashMap;

use ibf_model::{resolve_model_spec, Location, ModelKind};

/// the display name every `config.locations[i]` resolves to, in the same
/// order as the input slice. Exactly-two-entries-sharing-a-name-with-
/// differing-model-kinds gets the `" (Deterministic)"`/`" (Ensemble)"`
/// suffix; any other duplicate count gets a 1-based index suffix instead.
pub fn compute_location_display_names(locations: &[Location], default_model: &str) -> Vec<String> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, location) in locations.iter().enumerate() {
        groups.entry(location.name.as_str()).or_default().push(idx);
    }

    let mut display_names = vec![String::new(); locations.len()];
    for (name, indices) in groups {
        if indices.len() == 1 {
            display_names[indices[0]] = name.to_string();
            continue;
        }

        if indices.len() == 2 {
            let kinds: Vec<ModelKind> = indices
                .iter()
                .map(|&i| resolve_model_spec(locations[i].model.as_deref().or(Some(default_model))).kind)
                .collect();
            if kinds[0] != kinds[1] {
                for (&idx, kind) in indices.iter().zip(&kinds) {
                    let suffix = match kind {
                        ModelKind::Deterministic => " (Deterministic)",
                        ModelKind::Ensemble => " (Ensemble)",
                    };
                    display_names[idx] = format!("{name}{suffix}");
                }
                continue;
            }
        }

        for (position, &idx) in indices.iter().enumerate() {
            display_names[idx] = format!("{name} ({})", position + 1);
        }
    }

    display_names
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibf_model::config::UnitOverrides;

    fn location(name: &str, model: Option<&str>) -> Location {
        Location {
            name: name.to_string(),
            translation_language: None,
            extra_context: None,
            units: UnitOverrides::default(),
            model: model.map(str::to_string),
            snow_levels: None,
            refresh_interval_minutes: None,
        }
    }

    #[test]
    fn unique_names_pass_through() {
        let locations = vec![location("Test City", None), location("Other City", None)];
        let names = compute_location_display_names(&locations, "ens:ecmwf_ifs025");
        assert_eq!(names, vec!["Test City", "Other City"]);
    }

    #[test]
    fn duplicate_with_differing_kinds_gets_kind_suffix() {
        let locations = vec![location("Duplicate City", Some("ens:ecmwf_ifs025")), location("Duplicate City", Some("det:ecmwf_ifs"))];
        let names = compute_location_display_names(&locations, "ens:ecmwf_ifs025");
        assert_eq!(names, vec!["Duplicate City (Ensemble)", "Duplicate City (Deterministic)"]);
    }

    #[test]
    fn duplicate_with_same_kind_gets_index_suffix() {
        let locations = vec![location("Same Kind City", Some("ens:ecmwf_ifs025")), location("Same Kind City", Some("ens:gfs025"))];
        let names = compute_location_display_names(&locations, "ens:ecmwf_ifs025");
        assert_eq!(names, vec!["Same Kind City (1)", "Same Kind City (2)"]);
    }

    #[test]
    fn triple_duplicate_gets_index_suffix() {
        let locations = vec![location("Triple City", None), location("Triple City", None), location("Triple City", None)];
        let names = compute_location_display_names(&locations, "ens:ecmwf_ifs025");
        assert_eq!(names, vec!["Triple City (1)", "Triple City (2)", "Triple City (3)"]);
    }
}
