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

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ibf_format::{format_area_dataset, format_location_dataset, DisplayUnits, LocationEntry};
use ibf_model::{AlertSummary, Day, Hour, MemberRecord, ProcessedDataset};

fn member(temperature_c: f64, precip_mm: f64) -> MemberRecord {
    MemberRecord {
        temperature_c,
        precip_mm,
        snowfall_cm: 0.0,
        weather_description: "Partly cloudy".to_string(),
        cloud_cover_pct: 40.0,
        wind_direction: "NW".to_string(),
        wind_speed_kph: 12.0,
        wind_gust_kph: 20.0,
        snow_level_m: None,
        pop: Some(10),
    }
}

fn two_member_dataset() -> ProcessedDataset {
    let mut hour_members = BTreeMap::new();
    hour_members.insert("member00".to_string(), member(18.0, 0.0));
    hour_members.insert("member01".to_string(), member(19.5, 1.2));

    let day = Day {
        date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        year: 2025,
        month: 1,
        day: 10,
        label: "Friday".to_string(),
        timezone: chrono_tz::Pacific::Auckland,
        hours: vec![Hour { hour_key: "09:00".to_string(), members: hour_members }],
    };

    ProcessedDataset { days: vec![day] }
}

fn metric_units() -> DisplayUnits {
    DisplayUnits {
        temperature_unit: "celsius".to_string(),
        precipitation_unit: "mm".to_string(),
        snowfall_unit: "cm".to_string(),
        windspeed_unit: "kph".to_string(),
    }
}

#[test]
fn location_dataset_formats_day_heading_and_both_members() {
    let dataset = two_member_dataset();
    let units = metric_units();
    let text = format_location_dataset(&dataset, &[], &units);

    assert!(text.contains("Friday"));
    assert!(text.contains("18") || text.contains("19"));
    assert!(!text.contains("No valid forecast data"));
}

#[test]
fn location_dataset_reports_missing_data_when_no_days_present() {
    let units = metric_units();
    let text = format_location_dataset(&ProcessedDataset::default(), &[], &units);
    assert!(text.contains("No valid forecast data"));
}

#[test]
fn area_dataset_wraps_each_member_location_with_end_marker() {
    let dataset = two_member_dataset();
    let units = metric_units();
    let text = format_location_dataset(&dataset, &[], &units);

    let entries = vec![
        LocationEntry { name: "Wellington".to_string(), latitude: Some(-41.28), longitude: Some(174.77), timezone: "Pacific/Auckland".to_string(), text: text.clone() },
        LocationEntry { name: "Auckland".to_string(), latitude: Some(-36.85), longitude: Some(174.76), timezone: "Pacific/Auckland".to_string(), text },
    ];
    let area_text = format_area_dataset("Greater North Island", &entries);

    assert!(area_text.contains("AREA CONTEXT: Greater North Island"));
    assert!(area_text.contains("### LOCATION: Wellington"));
    assert!(area_text.contains("### LOCATION: Auckland"));
    assert_eq!(area_text.matches("<END LOCATION>").count(), 2);
}

#[test]
fn area_dataset_is_empty_string_with_no_members() {
    assert_eq!(format_area_dataset("Empty Area", &[]), "");
}
