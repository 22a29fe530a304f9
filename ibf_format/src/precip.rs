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

//! hourly precipitation-rate text and the per-member running totals shown at
//! the end of each scenario block.

use ibf_common::units::format_unit_label;

use crate::numfmt::{round_to, trim_trailing_zeros};

const SNOW_KEYWORDS: &[&str] = &["snow", "sleet", "flurry", "wintry", "freezing", "ice pellet"];
const RAIN_KEYWORDS: &[&str] = &["rain", "shower", "drizzle", "thunder", "storm"];

/// whether an hour's precipitation reads as rain, snow, or an ambiguous mix
/// of both -- used only to decide whether to parenthesize the rate text.
pub fn precip_phase(snowfall: f64, weather_desc: &str) -> &'static str {
    let weather_lower = weather_desc.to_lowercase();
    let has_snow_signal = snowfall > 0.0 || SNOW_KEYWORDS.iter().any(|k| weather_lower.contains(k));
    let has_rain_signal = RAIN_KEYWORDS.iter().any(|k| weather_lower.contains(k));
    match (has_snow_signal, has_rain_signal) {
        (true, true) => "mixed",
        (true, false) => "snow",
        (false, true) => "rain",
        (false, false) if snowfall == 0.0 => "rain",
        (false, false) => "mixed",
    }
}

/// `""` when there is no measurable precipitation that hour.
pub fn format_hourly_precip_rate(precipitation: f64, snowfall: f64, weather_desc: &str, unit: &str) -> String {
    let precision = if unit == "mm" { 0 } else { 1 };
    let value = round_to(precipitation, precision);
    if value == 0.0 {
        return String::new();
    }
    let value_text = format!("{value:.precision$}");
    let phase = precip_phase(snowfall, weather_desc);
    let unit_label = format_unit_label(unit);
    let rate_text = format!("{value_text} {unit_label}/h");
    if phase == "mixed" { format!("(Precip {rate_text})") } else { rate_text }
}

/// `None` for non-positive or below-threshold totals (§4.4: trace rainfall
/// under 0.25 mm is not worth reporting).
pub fn format_total_amount_line(value: f64, unit: &str, label: &str) -> Option<String> {
    if value <= 0.0 {
        return None;
    }
    let unit_label = format_unit_label(unit);

    if label == "rainfall" && unit == "mm" {
        if value < 0.25 {
            return None;
        }
        let rounded = if value < 1.0 { (value * 2.0).round() / 2.0 } else { value.round() };
        if rounded <= 0.0 {
            return None;
        }
        let text = if rounded.fract() == 0.0 { format!("{}", rounded as i64) } else { trim_trailing_zeros(&format!("{rounded:.1}")) };
        return Some(format!(" Total rainfall: {text} {unit_label}."));
    }

    let precision = if unit == "mm" { 0 } else { 1 };
    let rounded = round_to(value, precision);
    if rounded == 0.0 {
        return None;
    }
    if precision == 0 {
        Some(format!(" Total {label}: {} {unit_label}.", rounded as i64))
    } else {
        Some(format!(" Total {label}: {rounded:.precision$} {unit_label}."))
    }
}

pub fn format_total_snowfall_line(value: f64, unit: &str) -> Option<String> {
    if value <= 0.0 {
        return None;
    }
    let unit_label = format_unit_label(unit);

    if unit_label == "cm" {
        if value < 1.0 {
            return Some(" Total snowfall: less than 1 cm.".to_string());
        }
        let rounded = value.round();
        if rounded <= 0.0 {
            return None;
        }
        return Some(format!(" Total snowfall: {} cm.", rounded as i64));
    }

    let rounded = round_to(value, 1);
    if rounded == 0.0 {
        return None;
    }
    let text = if rounded.fract() == 0.0 { format!("{}", rounded as i64) } else { trim_trailing_zeros(&format!("{rounded:.1}")) };
    Some(format!(" Total snowfall: {text} {unit_label}."))
}

/// per-member low/high plus precipitation and snowfall totals, appended as
/// the last line of each scenario block.
pub fn format_member_summary(
    high_temp: f64,
    low_temp: f64,
    total_precip: f64,
    total_snow: f64,
    temperature_unit: &str,
    precipitation_unit: &str,
    snowfall_unit: &str,
) -> String {
    if !high_temp.is_finite() || !low_temp.is_finite() {
        return " No valid temperature data found for summary.\n".to_string();
    }
    let unit_letter = temperature_unit.chars().next().map(|c| c.to_ascii_uppercase()).unwrap_or('C');
    let mut lines = vec![format!(" Low {}°{unit_letter}, High {}°{unit_letter}", low_temp.round() as i64, high_temp.round() as i64)];
    if let Some(line) = format_total_snowfall_line(total_snow, snowfall_unit) {
        lines.push(line);
    }
    if let Some(line) = format_total_amount_line(total_precip, precipitation_unit, "rainfall") {
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_detects_mixed_precipitation() {
        assert_eq!(precip_phase(2.0, "heavy rain"), "mixed");
        assert_eq!(precip_phase(2.0, "light snow"), "snow");
        assert_eq!(precip_phase(0.0, "moderate rain"), "rain");
    }

    #[test]
    fn zero_rate_formats_to_empty_string() {
        assert_eq!(format_hourly_precip_rate(0.0, 0.0, "clear sky", "mm"), "");
    }

    #[test]
    fn mixed_phase_rate_is_parenthesized() {
        let text = format_hourly_precip_rate(3.0, 1.0, "heavy rain", "mm");
        assert!(text.starts_with("(Precip"));
    }

    #[test]
    fn trace_rainfall_under_quarter_mm_is_omitted() {
        assert_eq!(format_total_amount_line(0.1, "mm", "rainfall"), None);
    }

    #[test]
    fn sub_mm_rainfall_rounds_to_half_steps() {
        assert_eq!(format_total_amount_line(0.6, "mm", "rainfall").unwrap(), " Total rainfall: 0.5 mm.");
    }

    #[test]
    fn snowfall_under_one_cm_reads_as_less_than_one() {
        assert_eq!(format_total_snowfall_line(0.4, "cm").unwrap(), " Total snowfall: less than 1 cm.");
    }

    #[test]
    fn member_summary_reports_no_data_when_temps_never_set() {
        let summary = format_member_summary(f64::NEG_INFINITY, f64::INFINITY, 0.0, 0.0, "celsius", "mm", "cm");
        assert!(summary.contains("No valid temperature data"));
    }
}
