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

//! the raw NWP response wrapper and the normalized, per-day/per-hour/per-member
//! dataset produced by the dataset transformer (`ibf_dataset`) and consumed by
//! thinning, the formatter, and the HTML renderer.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const CANONICAL_MEMBER: &str = "member00";

/// wrapper around the raw Open-Meteo JSON payload. `raw` keeps `hourly`,
/// `hourly_units`, and `elevation` verbatim; only the dataset transformer
/// interprets its shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub raw: serde_json::Value,
    pub from_cache: bool,
    pub cache_path: Option<PathBuf>,
}

/// all fields normalized to internal standard units: Celsius, millimeters,
/// centimeters, kilometers-per-hour, meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub temperature_c: f64,
    pub precip_mm: f64,
    pub snowfall_cm: f64,
    pub weather_description: String,
    pub cloud_cover_pct: f64,
    pub wind_direction: String,
    pub wind_speed_kph: f64,
    pub wind_gust_kph: f64,
    pub snow_level_m: Option<f64>,
    pub pop: Option<u8>,
}

/// a single local hour; members are kept in a `BTreeMap` so that `member00`
/// sorts first and iteration order is deterministic across the whole dataset
/// (zero-padded ids sort lexicographically the same as numerically).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hour {
    pub hour_key: String,
    pub members: BTreeMap<String, MemberRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    pub date: chrono::NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub label: String,
    pub timezone: Tz,
    pub hours: Vec<Hour>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessedDataset {
    pub days: Vec<Day>,
}

impl ProcessedDataset {
    /// member ids present anywhere in the dataset, in sorted (= numeric)
    /// order. Used by thinning and the formatter to iterate scenarios.
    pub fn member_ids(&self) -> Vec<String> {
        let mut ids: std::collections::BTreeSet<String> = Default::default();
        for day in &self.days {
            for hour in &day.hours {
                for id in hour.members.keys() {
                    ids.insert(id.clone());
                }
            }
        }
        ids.into_iter().collect()
    }

    /// checks the §3 invariants that are cheap to verify structurally:
    /// every day has at least one hour, and every member present in any hour
    /// of a day is present in every other hour of that same day.
    pub fn check_invariants(&self) -> Result<(), String> {
        for day in &self.days {
            if day.hours.is_empty() {
                return Err(format!("day {} has zero hours", day.date));
            }
            let first_ids: std::collections::BTreeSet<&String> = day.hours[0].members.keys().collect();
            for hour in &day.hours[1..] {
                let ids: std::collections::BTreeSet<&String> = hour.members.keys().collect();
                if ids != first_ids {
                    return Err(format!(
                        "day {} has inconsistent member set across hours ({:?} over hour {})",
                        day.date, ids, hour.hour_key
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn member(temp: f64) -> MemberRecord {
        MemberRecord {
            temperature_c: temp,
            precip_mm: 0.0,
            snowfall_cm: 0.0,
            weather_description: "clear sky".into(),
            cloud_cover_pct: 0.0,
            wind_direction: "northerly".into(),
            wind_speed_kph: 5.0,
            wind_gust_kph: 8.0,
            snow_level_m: None,
            pop: None,
        }
    }

    #[test]
    fn member_ids_are_numerically_sorted() {
        let mut members = BTreeMap::new();
        members.insert("member10".to_string(), member(1.0));
        members.insert(CANONICAL_MEMBER.to_string(), member(2.0));
        members.insert("member02".to_string(), member(3.0));
        let dataset = ProcessedDataset {
            days: vec![Day {
                date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                year: 2025,
                month: 1,
                day: 10,
                label: "Today, Friday".into(),
                timezone: chrono_tz::UTC,
                hours: vec![Hour { hour_key: "09:00".into(), members }],
            }],
        };
        assert_eq!(dataset.member_ids(), vec!["member00", "member02", "member10"]);
    }

    #[test]
    fn detects_inconsistent_member_set() {
        let mut hour1_members = BTreeMap::new();
        hour1_members.insert(CANONICAL_MEMBER.to_string(), member(1.0));
        hour1_members.insert("member01".to_string(), member(1.0));

        let mut hour2_members = BTreeMap::new();
        hour2_members.insert(CANONICAL_MEMBER.to_string(), member(1.0));

        let dataset = ProcessedDataset {
            days: vec![Day {
                date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                year: 2025,
                month: 1,
                day: 10,
                label: "Today, Friday".into(),
                timezone: chrono_tz::UTC,
                hours: vec![
                    Hour { hour_key: "09:00".into(), members: hour1_members },
                    Hour { hour_key: "10:00".into(), members: hour2_members },
                ],
            }],
        };
        assert!(dataset.check_invariants().is_err());
    }
}
