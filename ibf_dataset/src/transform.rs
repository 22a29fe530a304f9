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

//! raw Open-Meteo JSON -> normalized [`ProcessedDataset`]. Detects the set of
//! ensemble members present in the payload, normalizes every field to the
//! internal standard units, groups hours into local-calendar days, and (when
//! requested) derives a snow level for each hour.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use ibf_common::datetime::{classify_day, hour_key};
use ibf_common::units::{resolve_snowfall_unit, resolve_unit_token, to_celsius, to_cm, to_kph, to_mm};
use ibf_common::wmo::wmo_weather;
use ibf_model::{Day, Hour, MemberRecord, ProcessedDataset, CANONICAL_MEMBER};

use crate::errors::{op_failed, Result};
use crate::snow::{compute_hourly_snow_level_from_profile, estimate_snow_level_from_freezing_level, PressureProfile};

lazy_static! {
    static ref MEMBER_SUFFIX_RE: Regex = Regex::new(r"^(?P<base>.+)_member(?P<num>\d{2})$").unwrap();
}

/// pressure levels (hPa) the profile fallback expects, lowest index highest
/// altitude. Mirrors the set `ibf_nwp` requests when freezing-level height
/// isn't part of the model's field set.
const PRESSURE_LEVELS_HPA: &[u32] = &[1000, 925, 850, 700, 600, 500];

/// inputs that are not themselves part of the raw payload.
pub struct TransformOptions {
    pub now: chrono::DateTime<Tz>,
    pub timezone_name: String,
    pub forecast_days: u32,
    pub station_altitude_m: f64,
    pub compute_snow_levels: bool,
    pub max_terrain_m: Option<f64>,
}

/// transform a raw Open-Meteo hourly response into a [`ProcessedDataset`].
pub fn transform(raw: &Value, opts: &TransformOptions) -> Result<ProcessedDataset> {
    let tz = ibf_common::datetime::resolve_timezone(&opts.timezone_name);

    let hourly = raw
        .get("hourly")
        .and_then(Value::as_object)
        .ok_or_else(|| op_failed("raw payload has no `hourly` object"))?;
    let hourly_units = raw
        .get("hourly_units")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let times = hourly
        .get("time")
        .and_then(Value::as_array)
        .ok_or_else(|| op_failed("raw payload has no `hourly.time` array"))?;

    let temp_unit = resolve_unit_token(&hourly_units, "temperature_2m", "celsius");
    let precip_unit = resolve_unit_token(&hourly_units, "precipitation", "mm");
    let wind_unit = resolve_unit_token(&hourly_units, "wind_speed_10m", "kmh");
    let snowfall_unit = resolve_snowfall_unit(&hourly_units, &precip_unit);

    let member_ids = detect_members(hourly);
    let cutoff_date = opts.now.date_naive() + chrono::Days::new(opts.forecast_days as u64);

    let mut days: BTreeMap<chrono::NaiveDate, Vec<Hour>> = BTreeMap::new();

    for (idx, time_value) in times.iter().enumerate() {
        let Some(time_str) = time_value.as_str() else { continue };
        let Ok(naive) = NaiveDateTime::parse_from_str(time_str, "%Y-%m-%dT%H:%M") else {
            warn!(time = time_str, "skipping hour with unparseable timestamp");
            continue;
        };
        let local = match tz.from_local_datetime(&naive).single() {
            Some(dt) => dt,
            None => tz.from_utc_datetime(&naive),
        };
        if local < opts.now {
            continue;
        }
        if local.date_naive() >= cutoff_date {
            continue;
        }

        let mut members: BTreeMap<String, MemberRecord> = BTreeMap::new();
        for member_id in &member_ids {
            if let Some(record) = build_member_record(
                hourly,
                member_id,
                idx,
                &temp_unit,
                &precip_unit,
                &wind_unit,
                &snowfall_unit,
                opts,
            ) {
                members.insert(member_id.clone(), record);
            }
        }
        if members.is_empty() {
            continue;
        }

        let hour = Hour { hour_key: hour_key(&local), members };
        days.entry(local.date_naive()).or_default().push(hour);
    }

    let mut result = Vec::with_capacity(days.len());
    for (date, mut hours) in days {
        restrict_to_common_members(&mut hours);
        let label = classify_day(date, &opts.now);
        result.push(Day {
            date,
            year: date.format("%Y").to_string().parse().unwrap_or(0),
            month: date.format("%m").to_string().parse().unwrap_or(0),
            day: date.format("%d").to_string().parse().unwrap_or(0),
            label,
            timezone: tz,
            hours,
        });
    }

    let dataset = ProcessedDataset { days: result };
    dataset.check_invariants().map_err(op_failed)?;
    Ok(dataset)
}

/// a member missing a required field in even one hour of the day is dropped
/// from every hour of that day, preserving the per-day member-set invariant
/// instead of producing a day with hour-to-hour gaps.
fn restrict_to_common_members(hours: &mut [Hour]) {
    if hours.len() < 2 {
        return;
    }
    let mut common: std::collections::BTreeSet<String> = hours[0].members.keys().cloned().collect();
    for hour in &hours[1..] {
        let present: std::collections::BTreeSet<String> = hour.members.keys().cloned().collect();
        common = common.intersection(&present).cloned().collect();
    }
    for hour in hours.iter_mut() {
        hour.members.retain(|id, _| common.contains(id));
    }
}

fn detect_members(hourly: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut ids: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
    ids.insert(CANONICAL_MEMBER.to_string());
    for key in hourly.keys() {
        if let Some(caps) = MEMBER_SUFFIX_RE.captures(key) {
            let num = &caps["num"];
            ids.insert(format!("member{num}"));
        }
    }
    ids.into_iter().collect()
}

fn field_name(base: &str, member_id: &str) -> String {
    if member_id == CANONICAL_MEMBER {
        base.to_string()
    } else {
        let num = &member_id[member_id.len() - 2..];
        format!("{base}_member{num}")
    }
}

fn get_f64(hourly: &serde_json::Map<String, Value>, field: &str, idx: usize) -> Option<f64> {
    hourly.get(field)?.as_array()?.get(idx)?.as_f64()
}

fn get_i64(hourly: &serde_json::Map<String, Value>, field: &str, idx: usize) -> Option<i64> {
    hourly.get(field)?.as_array()?.get(idx)?.as_i64()
}

#[allow(clippy::too_many_arguments)]
fn build_member_record(
    hourly: &serde_json::Map<String, Value>,
    member_id: &str,
    idx: usize,
    temp_unit: &str,
    precip_unit: &str,
    wind_unit: &str,
    snowfall_unit: &str,
    opts: &TransformOptions,
) -> Option<MemberRecord> {
    let temperature_raw = get_f64(hourly, &field_name("temperature_2m", member_id), idx)?;
    let weather_code = get_i64(hourly, &field_name("weather_code", member_id), idx)?;

    let temperature_c = to_celsius(temperature_raw, temp_unit);
    let dewpoint_c = get_f64(hourly, &field_name("dewpoint_2m", member_id), idx)
        .map(|v| to_celsius(v, temp_unit))
        .unwrap_or(temperature_c);
    let precip_mm = get_f64(hourly, &field_name("precipitation", member_id), idx)
        .map(|v| to_mm(v, precip_unit))
        .unwrap_or(0.0);
    let snowfall_cm = get_f64(hourly, &field_name("snowfall", member_id), idx)
        .map(|v| to_cm(v, snowfall_unit))
        .unwrap_or(0.0);
    let cloud_cover_pct = get_f64(hourly, &field_name("cloud_cover", member_id), idx).unwrap_or(0.0);
    let wind_speed_kph = get_f64(hourly, &field_name("wind_speed_10m", member_id), idx)
        .map(|v| to_kph(v, wind_unit))
        .unwrap_or(0.0);
    let wind_gust_kph = get_f64(hourly, &field_name("wind_gusts_10m", member_id), idx)
        .map(|v| to_kph(v, wind_unit))
        .unwrap_or(wind_speed_kph);
    let wind_direction_deg = get_f64(hourly, &field_name("wind_direction_10m", member_id), idx).unwrap_or(0.0);
    let pop = get_f64(hourly, &field_name("precipitation_probability", member_id), idx).map(|v| v.clamp(0.0, 100.0) as u8);

    let snow_level_m = if opts.compute_snow_levels {
        derive_snow_level(hourly, member_id, idx, weather_code, temperature_c, dewpoint_c, precip_mm, opts)
    } else {
        None
    };

    Some(MemberRecord {
        temperature_c,
        precip_mm,
        snowfall_cm,
        weather_description: wmo_weather(Some(weather_code)),
        cloud_cover_pct,
        wind_direction: ibf_common::angle::degrees_to_compass(wind_direction_deg).to_string(),
        wind_speed_kph,
        wind_gust_kph,
        snow_level_m,
        pop,
    })
}

#[allow(clippy::too_many_arguments)]
fn derive_snow_level(
    hourly: &serde_json::Map<String, Value>,
    member_id: &str,
    idx: usize,
    weather_code: i64,
    temperature_c: f64,
    dewpoint_c: f64,
    precip_mm: f64,
    opts: &TransformOptions,
) -> Option<f64> {
    if let Some(freezing_level_m) = get_f64(hourly, &field_name("freezing_level_height", member_id), idx) {
        return estimate_snow_level_from_freezing_level(
            temperature_c,
            dewpoint_c,
            precip_mm,
            weather_code,
            Some(freezing_level_m),
            opts.station_altitude_m,
            opts.max_terrain_m,
        );
    }

    let profile = extract_pressure_profile(hourly, idx)?;
    compute_hourly_snow_level_from_profile(
        precip_mm,
        weather_code,
        temperature_c,
        dewpoint_c,
        opts.station_altitude_m,
        &profile,
        opts.max_terrain_m,
    )
}

fn extract_pressure_profile(hourly: &serde_json::Map<String, Value>, idx: usize) -> Option<PressureProfile> {
    let mut pressures_hpa = Vec::with_capacity(PRESSURE_LEVELS_HPA.len());
    let mut temps_c = Vec::with_capacity(PRESSURE_LEVELS_HPA.len());
    let mut rhs_pct = Vec::with_capacity(PRESSURE_LEVELS_HPA.len());
    let mut geop_heights_m = Vec::with_capacity(PRESSURE_LEVELS_HPA.len());

    for level in PRESSURE_LEVELS_HPA {
        let t = get_f64(hourly, &format!("temperature_{level}hPa"), idx)?;
        let rh = get_f64(hourly, &format!("relative_humidity_{level}hPa"), idx)?;
        let z = get_f64(hourly, &format!("geopotential_height_{level}hPa"), idx)?;
        pressures_hpa.push(*level as f64);
        temps_c.push(t);
        rhs_pct.push(rh);
        geop_heights_m.push(z);
    }

    Some(PressureProfile { pressures_hpa, temps_c, rhs_pct, geop_heights_m })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::UTC;
    use serde_json::json;

    fn opts(now: chrono::DateTime<Tz>) -> TransformOptions {
        TransformOptions {
            now,
            timezone_name: "UTC".to_string(),
            forecast_days: 3,
            station_altitude_m: 50.0,
            compute_snow_levels: false,
            max_terrain_m: None,
        }
    }

    fn sample_raw() -> Value {
        json!({
            "hourly": {
                "time": ["2025-01-10T09:00", "2025-01-10T10:00"],
                "temperature_2m": [10.0, 11.0],
                "temperature_2m_member01": [9.5, 10.5],
                "dewpoint_2m": [5.0, 5.0],
                "dewpoint_2m_member01": [4.5, 4.5],
                "precipitation": [0.0, 1.2],
                "precipitation_member01": [0.0, 0.8],
                "snowfall": [0.0, 0.0],
                "snowfall_member01": [0.0, 0.0],
                "weather_code": [1, 61],
                "weather_code_member01": [1, 61],
                "cloud_cover": [20.0, 40.0],
                "cloud_cover_member01": [25.0, 45.0],
                "wind_speed_10m": [5.0, 7.0],
                "wind_speed_10m_member01": [5.5, 7.5],
                "wind_gusts_10m": [8.0, 10.0],
                "wind_gusts_10m_member01": [8.5, 10.5],
                "wind_direction_10m": [180.0, 200.0],
                "wind_direction_10m_member01": [185.0, 205.0],
            },
            "hourly_units": {
                "temperature_2m": "°C",
                "precipitation": "mm",
                "wind_speed_10m": "km/h",
            },
        })
    }

    #[test]
    fn detects_member00_and_member01() {
        let raw = sample_raw();
        let hourly = raw.get("hourly").unwrap().as_object().unwrap();
        let members = detect_members(hourly);
        assert_eq!(members, vec!["member00".to_string(), "member01".to_string()]);
    }

    #[test]
    fn builds_two_hours_with_both_members() {
        let raw = sample_raw();
        let now = UTC.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let dataset = transform(&raw, &opts(now)).expect("transform should succeed");
        assert_eq!(dataset.days.len(), 1);
        assert_eq!(dataset.days[0].hours.len(), 2);
        assert_eq!(dataset.days[0].hours[0].members.len(), 2);
        assert!(dataset.days[0].hours[0].members.contains_key(CANONICAL_MEMBER));
        assert!(dataset.days[0].hours[0].members.contains_key("member01"));
    }

    #[test]
    fn drops_hours_before_now() {
        let raw = sample_raw();
        let now = UTC.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap();
        let dataset = transform(&raw, &opts(now)).expect("transform should succeed");
        assert_eq!(dataset.days[0].hours.len(), 1);
        assert_eq!(dataset.days[0].hours[0].hour_key, "10:00");
    }

    #[test]
    fn converts_units_to_celsius_and_mm() {
        let mut raw = sample_raw();
        raw["hourly"]["temperature_2m"] = json!([50.0, 51.0]);
        raw["hourly_units"]["temperature_2m"] = json!("fahrenheit");
        let now = UTC.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let dataset = transform(&raw, &opts(now)).expect("transform should succeed");
        let record = &dataset.days[0].hours[0].members[CANONICAL_MEMBER];
        assert!((record.temperature_c - 10.0).abs() < 1e-6);
    }

    #[test]
    fn missing_required_field_in_any_hour_drops_member_for_whole_day() {
        let mut raw = sample_raw();
        raw["hourly"]["weather_code_member01"] = json!([Value::Null, 61]);
        let now = UTC.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let dataset = transform(&raw, &opts(now)).expect("transform should succeed");
        assert!(!dataset.days[0].hours[0].members.contains_key("member01"));
        assert!(!dataset.days[0].hours[1].members.contains_key("member01"));
        assert!(dataset.days[0].hours[0].members.contains_key(CANONICAL_MEMBER));
        assert!(dataset.days[0].hours[1].members.contains_key(CANONICAL_MEMBER));
    }
}
