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
#![allow(unused)]

use ibf_model::config::{Location, UnitOverrides};
use ibf_pipeline::compute_location_display_names;
use ibf_pipeline::skip::should_skip_entity;

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
fn three_locations_sharing_a_name_all_get_index_suffixes() {
    let locations = vec![location("Base Camp", None), location("Base Camp", None), location("Base Camp", None)];
    let names = compute_location_display_names(&locations, "ens:ecmwf_ifs025");
    assert_eq!(names, vec!["Base Camp (1)", "Base Camp (2)", "Base Camp (3)"]);
}

#[test]
fn distinct_names_are_untouched_and_order_preserving() {
    let locations = vec![location("Wellington", None), location("Auckland", None), location("Dunedin", None)];
    let names = compute_location_display_names(&locations, "ens:ecmwf_ifs025");
    assert_eq!(names, vec!["Wellington", "Auckland", "Dunedin"]);
}

#[test]
fn skip_policy_round_trips_through_the_scaffolder_and_a_real_render() {
    let dir = std::env::temp_dir().join(format!("ibf_pipeline_executor_support_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    ibf_render::ensure_site_scaffold(&dir, "wellington", "Wellington").unwrap();
    assert!(!should_skip_entity(&dir, "wellington", 60), "a freshly scaffolded placeholder is never skipped");

    let page = ibf_render::ForecastPage {
        display_name: "Wellington",
        issued_at: chrono::Utc::now(),
        body: "Fine weather expected.",
        translation: None,
    };
    ibf_render::write_forecast_page(&dir, "wellington", &page).unwrap();
    assert!(should_skip_entity(&dir, "wellington", 60), "a just-rendered real page is within any sane refresh interval");
    assert!(!should_skip_entity(&dir, "wellington", 0), "a zero-minute refresh interval never tolerates an existing page");

    std::fs::remove_dir_all(&dir).ok();
}
