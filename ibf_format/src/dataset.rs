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

//! the textual input fed to the narrative LLM: one block per day, one
//! scenario per ensemble member, and (for true ensembles) a RANGE SUMMARY
//! closing the day.

use ibf_common::datetime::hour_to_ampm;
use ibf_model::{AlertSummary, Day, Hour, ProcessedDataset};

use crate::alerts::format_alerts;
use crate::convert::{display_precipitation, display_snow_level, display_snowfall, display_temperature, display_wind, snow_level_unit_label, DisplayUnits};
use crate::numfmt::{capitalize, round_to};
use crate::precip::{format_hourly_precip_rate, format_member_summary};
use crate::range::{calculate_range_summary, normalize_daily_total};
use crate::wind::{format_wind, round_windspeed};

/// one representative location contributed to an area-level prompt.
pub struct LocationEntry {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: String,
    pub text: String,
}

/// render a single location's processed dataset and active alerts into the
/// text block handed to the narrative LLM. `"Error: No valid forecast data
/// received for formatting."` when the dataset has no days at all.
pub fn format_location_dataset(dataset: &ProcessedDataset, alerts: &[AlertSummary], units: &DisplayUnits) -> String {
    if dataset.days.is_empty() {
        return "Error: No valid forecast data received for formatting.".to_string();
    }

    let alert_text = format_alerts(alerts, dataset.days[0].date, dataset.days[0].timezone);
    let snow_level_unit = snow_level_unit_label(&units.temperature_unit, &units.precipitation_unit);

    let mut output_parts: Vec<String> = Vec::new();

    for day in &dataset.days {
        let heading = date_heading(day);
        if day.hours.is_empty() {
            output_parts.push(format!("{heading}\n No hourly data available.\n"));
            continue;
        }

        let member_ids: Vec<String> = day.hours[0].members.keys().cloned().collect();
        let is_single_member = member_ids.len() <= 1;

        let mut members_output: Vec<String> = Vec::new();
        let mut daily_lows: Vec<f64> = Vec::new();
        let mut daily_highs: Vec<f64> = Vec::new();
        let mut daily_precip: Vec<f64> = Vec::new();
        let mut daily_snow: Vec<f64> = Vec::new();

        for member_id in &member_ids {
            let mut block_lines: Vec<String> = if is_single_member {
                Vec::new()
            } else {
                vec![format!("Scenario {}:", member_id.trim_start_matches("member"))]
            };

            let mut high_temp = f64::NEG_INFINITY;
            let mut low_temp = f64::INFINITY;
            let mut total_precip = 0.0;
            let mut total_snow = 0.0;
            let mut has_data = false;

            for hour in &day.hours {
                let Some(record) = hour.members.get(member_id) else { continue };
                has_data = true;

                let temp = display_temperature(record.temperature_c, &units.temperature_unit);
                let precip_val = display_precipitation(record.precip_mm, &units.precipitation_unit);
                let snowfall_val = display_snowfall(record.snowfall_cm, &units.snowfall_unit);
                let wind_speed = display_wind(record.wind_speed_kph, &units.windspeed_unit);
                let wind_gust = display_wind(record.wind_gust_kph, &units.windspeed_unit);

                high_temp = high_temp.max(temp);
                low_temp = low_temp.min(temp);
                total_precip += precip_val;
                total_snow += snowfall_val;

                let hour_label = hour_to_ampm(hour_of(hour));
                let weather_desc = capitalize(&record.weather_description);
                let snow_level = record.snow_level_m.and_then(|v| display_snow_level(v, &units.temperature_unit, &units.precipitation_unit));

                let precip_text = format_hourly_precip_rate(precip_val, snowfall_val, &weather_desc, &units.precipitation_unit);
                let snow_text = match snow_level {
                    Some(v) if v > 0 => format!("(snow down to about {v} {snow_level_unit})"),
                    _ => String::new(),
                };

                let wind_speed_rounded = round_windspeed(wind_speed, &units.windspeed_unit);
                let wind_gust_rounded = if wind_gust > 0.0 { round_windspeed(wind_gust, &units.windspeed_unit) } else { 0 };
                let wind_text = format_wind(&record.wind_direction, wind_speed_rounded, wind_gust_rounded);

                let pop_text = record.pop.map(|p| format!("pop{p}")).unwrap_or_default();
                let cloud_text = if is_single_member && (0.0..=100.0).contains(&record.cloud_cover_pct) {
                    format!("cc{}", record.cloud_cover_pct.round() as i64)
                } else {
                    String::new()
                };

                let temp_text = format!("{}°", temp.round() as i64);
                let mut details = vec![temp_text, weather_desc];
                for extra in [precip_text, cloud_text, snow_text, pop_text] {
                    if !extra.is_empty() {
                        details.push(extra);
                    }
                }
                details.push(wind_text);
                let detail_str = details.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");
                block_lines.push(format!("{hour_label} {detail_str}"));
            }

            if has_data {
                let summary = format_member_summary(
                    high_temp,
                    low_temp,
                    total_precip,
                    total_snow,
                    &units.temperature_unit,
                    &units.precipitation_unit,
                    &units.snowfall_unit,
                );
                block_lines.push(summary);
                members_output.push(block_lines.join("\n"));

                if high_temp.is_finite() && low_temp.is_finite() {
                    daily_highs.push(high_temp.round());
                    daily_lows.push(low_temp.round());
                }
                daily_precip.push(normalize_daily_total(total_precip, &units.precipitation_unit, "rainfall"));
                daily_snow.push(round_to(total_snow, 1));
            }
        }

        if members_output.is_empty() {
            continue;
        }

        let scenarios_text = members_output.join("\n\n");
        if is_single_member {
            output_parts.push(format!("{heading}\n{scenarios_text}\n"));
        } else {
            let use_only_low = should_use_only_low(&day.hours);
            let reverse_high_and_low = should_reverse_high_low(&day.hours);
            let temp_unit_char = units.temperature_unit.chars().next().map(|c| c.to_ascii_uppercase()).unwrap_or('C');
            let range_summary = calculate_range_summary(
                &daily_lows,
                &daily_highs,
                &daily_precip,
                &daily_snow,
                temp_unit_char,
                &units.precipitation_unit,
                &units.snowfall_unit,
                use_only_low,
                reverse_high_and_low,
            );
            output_parts.push(format!("{heading}\n{scenarios_text}\nRANGE SUMMARY:\n{range_summary}\n"));
        }
    }

    let final_text = output_parts.iter().map(String::as_str).filter(|s| !s.trim().is_empty()).collect::<Vec<_>>().join("\n");
    if alert_text.is_empty() { final_text.trim().to_string() } else { format!("{alert_text}\n{final_text}").trim().to_string() }
}

/// fold several locations' already-formatted texts into one area-level block.
pub fn format_area_dataset(area_name: &str, locations: &[LocationEntry]) -> String {
    if locations.is_empty() {
        return String::new();
    }

    let mut parts = vec![
        format!("AREA CONTEXT: {area_name}"),
        "Each block below is the processed dataset for a representative location.".to_string(),
    ];

    for entry in locations {
        let mut header = format!("### LOCATION: {}", entry.name);
        if let (Some(lat), Some(lon)) = (entry.latitude, entry.longitude) {
            header.push_str(&format!(" ({lat:.4}, {lon:.4})"));
        }
        header.push_str(&format!(" — Timezone: {}", entry.timezone));
        parts.push(header);

        let text = entry.text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
        parts.push("<END LOCATION>".to_string());
    }

    parts.join("\n\n").trim().to_string()
}

fn date_heading(day: &Day) -> String {
    let month_name = day.date.format("%B").to_string().to_uppercase();
    let day_num = day.date.format("%d").to_string();
    let day_num = day_num.trim_start_matches('0');
    let day_num = if day_num.is_empty() { "0" } else { day_num };
    format!("Date: {} {day_num} {month_name}\n", day.label.to_uppercase())
}

fn hour_of(hour: &Hour) -> u32 {
    hour.hour_key.split(':').next().and_then(|s| s.parse().ok()).unwrap_or(0)
}

fn should_use_only_low(hours: &[Hour]) -> bool {
    hours.first().map(hour_of).unwrap_or(0) > 15
}

fn should_reverse_high_low(hours: &[Hour]) -> bool {
    let hour = hours.first().map(hour_of).unwrap_or(0);
    hour > 10 && hour <= 15
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ibf_model::CANONICAL_MEMBER;
    use std::collections::BTreeMap;

    fn member(temp: f64, precip: f64, pop: Option<u8>) -> ibf_model::MemberRecord {
        ibf_model::MemberRecord {
            temperature_c: temp,
            precip_mm: precip,
            snowfall_cm: 0.0,
            weather_description: "light rain".into(),
            cloud_cover_pct: 40.0,
            wind_direction: "northerly".into(),
            wind_speed_kph: 15.0,
            wind_gust_kph: 20.0,
            snow_level_m: None,
            pop,
        }
    }

    fn single_member_dataset() -> ProcessedDataset {
        let mut members = BTreeMap::new();
        members.insert(CANONICAL_MEMBER.to_string(), member(10.0, 2.0, Some(60)));
        ProcessedDataset {
            days: vec![Day {
                date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                year: 2025,
                month: 1,
                day: 10,
                label: "Today, Friday".into(),
                timezone: chrono_tz::UTC,
                hours: vec![Hour { hour_key: "09:00".into(), members }],
            }],
        }
    }

    fn display_units() -> DisplayUnits {
        DisplayUnits {
            temperature_unit: "celsius".into(),
            precipitation_unit: "mm".into(),
            snowfall_unit: "cm".into(),
            windspeed_unit: "kph".into(),
        }
    }

    #[test]
    fn empty_dataset_reports_error_text() {
        let dataset = ProcessedDataset::default();
        let text = format_location_dataset(&dataset, &[], &display_units());
        assert!(text.starts_with("Error:"));
    }

    #[test]
    fn single_member_omits_scenario_label_and_range_summary() {
        let dataset = single_member_dataset();
        let text = format_location_dataset(&dataset, &[], &display_units());
        assert!(!text.contains("Scenario"));
        assert!(!text.contains("RANGE SUMMARY"));
        assert!(text.contains("9am"));
        assert!(text.contains("pop60"));
    }

    #[test]
    fn ensemble_dataset_includes_range_summary_and_scenario_labels() {
        let mut members = BTreeMap::new();
        members.insert(CANONICAL_MEMBER.to_string(), member(10.0, 2.0, None));
        members.insert("member01".to_string(), member(14.0, 0.0, None));
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
        let text = format_location_dataset(&dataset, &[], &display_units());
        assert!(text.contains("Scenario 00:"));
        assert!(text.contains("Scenario 01:"));
        assert!(text.contains("RANGE SUMMARY"));
    }

    #[test]
    fn area_dataset_wraps_each_location() {
        let locations = vec![LocationEntry {
            name: "Wellington".into(),
            latitude: Some(-41.2865),
            longitude: Some(174.7762),
            timezone: "Pacific/Auckland".into(),
            text: "Date: TODAY 10 JANUARY\n...".into(),
        }];
        let text = format_area_dataset("Greater Wellington", &locations);
        assert!(text.starts_with("AREA CONTEXT: Greater Wellington"));
        assert!(text.contains("### LOCATION: Wellington (-41.2865, 174.7762)"));
        assert!(text.contains("<END LOCATION>"));
    }
}
