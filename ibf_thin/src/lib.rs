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

//! maximum-diversity greedy ensemble member thinning. A pure function over
//! [`ProcessedDataset`] -- no I/O, no hidden state.

use std::collections::{BTreeMap, BTreeSet};

use ibf_model::{ProcessedDataset, CANONICAL_MEMBER};

#[derive(Default, Clone)]
struct MemberSeries {
    temperature: Vec<f64>,
    precipitation: Vec<f64>,
}

/// thin `dataset` down to `thin_select` members, preserving `member00`
/// (or the lexicographically first member if absent) and filling the rest
/// with the members that maximize the mean RMS distance from the already
/// selected set across temperature and precipitation. A no-op if the
/// ensemble already has `<= thin_select` members.
pub fn select_members(dataset: &ProcessedDataset, thin_select: usize, weight_temp: f64, weight_precip: f64) -> ProcessedDataset {
    let flattened = flatten_members(dataset);
    if flattened.is_empty() || flattened.len() <= thin_select {
        return dataset.clone();
    }

    let selected = run_selection(&flattened, thin_select, weight_temp, weight_precip);
    let keep: BTreeSet<&String> = selected.iter().collect();

    let mut thinned = dataset.clone();
    for day in &mut thinned.days {
        for hour in &mut day.hours {
            hour.members.retain(|id, _| keep.contains(id));
        }
    }
    thinned
}

fn flatten_members(dataset: &ProcessedDataset) -> BTreeMap<String, MemberSeries> {
    let mut members: BTreeMap<String, MemberSeries> = BTreeMap::new();
    for day in &dataset.days {
        for hour in &day.hours {
            for (id, record) in &hour.members {
                let series = members.entry(id.clone()).or_default();
                series.temperature.push(record.temperature_c);
                series.precipitation.push(record.precip_mm);
            }
        }
    }
    members
}

fn normalize(series: &[f64], min: f64, max: f64) -> Vec<f64> {
    if (max - min).abs() < f64::EPSILON {
        return vec![0.0; series.len()];
    }
    series.iter().map(|v| (v - min) / (max - min)).collect()
}

fn rms(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let sum_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
    (sum_sq / a.len() as f64).sqrt()
}

fn run_selection(members: &BTreeMap<String, MemberSeries>, thin_select: usize, weight_temp: f64, weight_precip: f64) -> Vec<String> {
    let all_temps: Vec<f64> = members.values().flat_map(|s| s.temperature.iter().copied()).collect();
    let all_precip: Vec<f64> = members.values().flat_map(|s| s.precipitation.iter().copied()).collect();
    let (min_t, max_t) = min_max(&all_temps);
    let (min_p, max_p) = min_max(&all_precip);

    let normalized: BTreeMap<String, MemberSeries> = members
        .iter()
        .map(|(id, series)| {
            (
                id.clone(),
                MemberSeries {
                    temperature: normalize(&series.temperature, min_t, max_t),
                    precipitation: normalize(&series.precipitation, min_p, max_p),
                },
            )
        })
        .collect();

    let mut selected: Vec<String> = if members.contains_key(CANONICAL_MEMBER) {
        vec![CANONICAL_MEMBER.to_string()]
    } else {
        vec![members.keys().next().expect("non-empty members checked by caller").clone()]
    };

    let mut remaining: Vec<String> = members.keys().filter(|id| !selected.contains(id)).cloned().collect();

    while selected.len() < thin_select && !remaining.is_empty() {
        let mut best_member: Option<String> = None;
        let mut best_distance = f64::NEG_INFINITY;

        for candidate in &remaining {
            let candidate_series = &normalized[candidate];
            let mean_distance: f64 = selected
                .iter()
                .map(|existing| {
                    let existing_series = &normalized[existing];
                    let temp_dist = rms(&candidate_series.temperature, &existing_series.temperature);
                    let precip_dist = rms(&candidate_series.precipitation, &existing_series.precipitation);
                    weight_temp * temp_dist + weight_precip * precip_dist
                })
                .sum::<f64>()
                / selected.len() as f64;

            if mean_distance > best_distance {
                best_distance = mean_distance;
                best_member = Some(candidate.clone());
            }
        }

        let Some(best_member) = best_member else { break };
        remaining.retain(|id| id != &best_member);
        selected.push(best_member);
    }

    selected
}

fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| (min.min(v), max.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibf_model::{Day, Hour, MemberRecord};

    fn member(temp: f64, precip: f64) -> MemberRecord {
        MemberRecord {
            temperature_c: temp,
            precip_mm: precip,
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

    fn dataset_with(members: Vec<(&str, f64, f64)>) -> ProcessedDataset {
        let mut hour_members = BTreeMap::new();
        for (id, temp, precip) in members {
            hour_members.insert(id.to_string(), member(temp, precip));
        }
        ProcessedDataset {
            days: vec![Day {
                date: chrono::NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                year: 2025,
                month: 1,
                day: 10,
                label: "Today, Friday".into(),
                timezone: chrono_tz::UTC,
                hours: vec![Hour { hour_key: "09:00".into(), members: hour_members }],
            }],
        }
    }

    #[test]
    fn preserves_member00_across_every_hour() {
        let dataset = dataset_with(vec![
            (CANONICAL_MEMBER, 10.0, 0.0),
            ("member01", 12.0, 1.0),
            ("member02", 8.0, 2.0),
            ("member03", 20.0, 0.5),
        ]);
        let thinned = select_members(&dataset, 2, 1.0, 1.0);
        for day in &thinned.days {
            for hour in &day.hours {
                assert!(hour.members.contains_key(CANONICAL_MEMBER));
            }
        }
    }

    #[test]
    fn idempotent_when_k_equals_current_count() {
        let dataset = dataset_with(vec![(CANONICAL_MEMBER, 10.0, 0.0), ("member01", 12.0, 1.0)]);
        let thinned = select_members(&dataset, 2, 1.0, 1.0);
        assert_eq!(thinned.days[0].hours[0].members.len(), 2);
    }

    #[test]
    fn no_op_when_already_at_or_below_target() {
        let dataset = dataset_with(vec![(CANONICAL_MEMBER, 10.0, 0.0)]);
        let thinned = select_members(&dataset, 5, 1.0, 1.0);
        assert_eq!(thinned.days[0].hours[0].members.len(), 1);
    }

    #[test]
    fn picks_most_diverse_member_second() {
        let dataset = dataset_with(vec![
            (CANONICAL_MEMBER, 10.0, 0.0),
            ("member01", 10.1, 0.0),
            ("member02", 30.0, 5.0),
        ]);
        let thinned = select_members(&dataset, 2, 1.0, 1.0);
        let ids: BTreeSet<&String> = thinned.days[0].hours[0].members.keys().collect();
        assert!(ids.contains(&"member02".to_string()));
        assert!(!ids.contains(&"member01".to_string()));
    }
}
