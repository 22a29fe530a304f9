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

//! the day-level "RANGE SUMMARY" block: Jeffreys-rule probability of
//! precipitation/snowfall, 20th/80th percentile likely ranges, and the
//! heavy-precipitation exceedance probability.

use ibf_common::units::format_unit_label;

use crate::numfmt::{format_decimal, min_max, round_to};

pub const PRECIP_HEAVY_THRESHOLD_MM: f64 = 10.0;
pub const PRECIP_HEAVY_THRESHOLD_IN: f64 = 0.5;

/// Jeffreys prior probability estimate, rounded to the nearest 5 and
/// clamped to [0, 100].
pub fn jeffreys_probability(occurrences: usize, total: usize) -> i64 {
    if total == 0 {
        return 0;
    }
    let prob = (occurrences as f64 + 0.5) / (total as f64 + 1.0);
    let rounded = (prob * 20.0).round() * 5.0;
    (rounded as i64).clamp(0, 100)
}

/// linear-interpolated `lower_fraction` and `1 - lower_fraction` percentiles;
/// `(NaN, NaN)` when fewer than two values are available.
pub fn estimate_percentiles(values: &[f64], lower_fraction: f64) -> (f64, f64) {
    if values.len() < 2 {
        return (f64::NAN, f64::NAN);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let lower_pos = lower_fraction * (n as f64 - 1.0);
    let upper_pos = (1.0 - lower_fraction) * (n as f64 - 1.0);
    (interp(lower_pos, &sorted), interp(upper_pos, &sorted))
}

fn interp(pos: f64, sorted: &[f64]) -> f64 {
    let lo = pos.floor().max(0.0) as usize;
    let hi = pos.ceil().min(sorted.len() as f64 - 1.0) as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// clamp a raw total to zero below reporting thresholds; collapses trace
/// rainfall under 0.25 mm to zero and rounds sub-1 mm totals to the nearest
/// half millimeter so the range summary never reads "0.0 mm".
pub fn normalize_daily_total(value: f64, unit: &str, kind: &str) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    if kind == "rainfall" && unit == "mm" {
        if value < 0.25 {
            return 0.0;
        }
        if value < 1.0 {
            return (value * 2.0).round() / 2.0;
        }
        return value.round();
    }
    round_to(value, 1)
}

/// `None` when there is no positive-precipitation member to report on.
pub fn precipitation_or_snowfall_likely(label: &str, values: &[f64], unit: &str) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    if positive.is_empty() {
        return None;
    }
    let probability = jeffreys_probability(positive.len(), values.len());
    let (lower_raw, upper_raw) = estimate_percentiles(&positive, 0.20);
    if lower_raw.is_nan() || upper_raw.is_nan() {
        return Some(format!("Estimated probability of {label}: {probability}%"));
    }
    let unit_label = format_unit_label(unit);

    if label == "snowfall" && unit_label == "cm" {
        if upper_raw < 1.0 {
            return Some(format!("Estimated probability of {label}: {probability}%\nLikely {label} less than 1 {unit_label}"));
        }
        let lower = lower_raw.round() as i64;
        let upper = upper_raw.round() as i64;
        if lower <= 0 {
            return Some(format!("Estimated probability of {label}: {probability}%\nLikely {label} up to {upper} {unit_label}"));
        }
        if lower == upper {
            return Some(format!("Estimated probability of {label}: {probability}%\nLikely {label} around {lower} {unit_label}"));
        }
        return Some(format!("Estimated probability of {label}: {probability}%\nLikely {label} {lower} {unit_label} to {upper} {unit_label}"));
    }

    let precision = if unit == "mm" { 0 } else { 1 };
    let lower = round_to(lower_raw, precision);
    let upper = round_to(upper_raw, precision);
    let fmt = |v: f64| -> String { if precision == 0 { format!("{}", v as i64) } else { format!("{v:.1}") } };
    if (lower - upper).abs() < f64::EPSILON {
        Some(format!("Estimated probability of {label}: {probability}%\nLikely {label} around {} {unit_label}", fmt(lower)))
    } else {
        Some(format!(
            "Estimated probability of {label}: {probability}%\nLikely {label} {} {unit_label} to {} {unit_label}",
            fmt(lower),
            fmt(upper)
        ))
    }
}

/// `None` when the threshold is non-positive or nothing exceeds it.
pub fn precipitation_exceedance_probability(values: &[f64], unit: &str, threshold_mm: f64) -> Option<String> {
    if threshold_mm <= 0.0 || values.is_empty() {
        return None;
    }
    let threshold_value = if unit == "mm" { threshold_mm } else { threshold_mm / 25.4 };
    let exceedances = values.iter().filter(|v| **v >= threshold_value).count();
    if exceedances == 0 {
        return None;
    }
    let probability = jeffreys_probability(exceedances, values.len());
    let threshold_label = format_threshold_label(unit, threshold_mm, threshold_value);
    Some(format!("Estimated probability of precipitation >= {threshold_label}: {probability}%"))
}

fn format_threshold_label(unit: &str, threshold_mm: f64, threshold_value: f64) -> String {
    if unit == "mm" {
        return format!("{} mm", format_decimal(threshold_mm, 1));
    }
    let converted_precision = if threshold_value < 10.0 { 1 } else { 0 };
    let converted = format_decimal(threshold_value, converted_precision);
    let rounded_mm = format_decimal(threshold_mm, 1);
    let unit_label = if unit == "inch" { "in" } else { unit };
    format!("{rounded_mm} mm ({converted} {unit_label})")
}

fn fmt_temp(value: f64, unit_char: char) -> String {
    format!("{}°{unit_char}", value.round() as i64)
}

/// the day's "Likely low/high ... Estimated probability of ..." block.
/// `"N/A"` when no member produced a finite high/low pair.
#[allow(clippy::too_many_arguments)]
pub fn calculate_range_summary(
    daily_lows: &[f64],
    daily_highs: &[f64],
    daily_precip: &[f64],
    daily_snow: &[f64],
    temp_unit_short: char,
    precip_unit: &str,
    snow_unit: &str,
    use_only_low: bool,
    reverse_high_and_low: bool,
) -> String {
    if daily_lows.is_empty() || daily_highs.is_empty() {
        return "N/A".to_string();
    }

    let (low_min, low_max) = min_max(daily_lows);
    let (high_min, high_max) = min_max(daily_highs);
    let low_line = format!("Likely low {} to {}", fmt_temp(low_min, temp_unit_short), fmt_temp(low_max, temp_unit_short));
    let high_line = format!("Likely high {} to {}", fmt_temp(high_min, temp_unit_short), fmt_temp(high_max, temp_unit_short));

    let mut lines = Vec::new();
    if use_only_low {
        lines.push(low_line);
    } else if reverse_high_and_low {
        lines.push(high_line);
        lines.push(low_line);
    } else {
        lines.push(low_line);
        lines.push(high_line);
    }

    if let Some(line) = precipitation_or_snowfall_likely("precipitation", daily_precip, precip_unit) {
        lines.push(line);
    }
    if let Some(line) = precipitation_or_snowfall_likely("snowfall", daily_snow, snow_unit) {
        lines.push(line);
    }

    let heavy_threshold_mm = if precip_unit == "mm" { PRECIP_HEAVY_THRESHOLD_MM } else { PRECIP_HEAVY_THRESHOLD_IN * 25.4 };
    if let Some(line) = precipitation_exceedance_probability(daily_precip, precip_unit, heavy_threshold_mm) {
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jeffreys_probability_is_zero_with_no_occurrences() {
        assert_eq!(jeffreys_probability(0, 51), 0);
    }

    #[test]
    fn jeffreys_probability_clamped_to_range() {
        assert_eq!(jeffreys_probability(51, 51), 100);
    }

    #[test]
    fn percentiles_need_at_least_two_values() {
        let (lo, hi) = estimate_percentiles(&[5.0], 0.2);
        assert!(lo.is_nan() && hi.is_nan());
    }

    #[test]
    fn percentiles_interpolate_between_sorted_values() {
        let values: Vec<f64> = (1..=11).map(|v| v as f64).collect();
        let (lo, hi) = estimate_percentiles(&values, 0.20);
        assert!((lo - 3.0).abs() < 1e-6);
        assert!((hi - 9.0).abs() < 1e-6);
    }

    #[test]
    fn trace_rainfall_normalizes_to_zero() {
        assert_eq!(normalize_daily_total(0.1, "mm", "rainfall"), 0.0);
    }

    #[test]
    fn no_data_yields_na() {
        assert_eq!(calculate_range_summary(&[], &[], &[], &[], 'C', "mm", "cm", false, false), "N/A");
    }

    #[test]
    fn range_summary_orders_high_before_low_in_early_afternoon() {
        let summary = calculate_range_summary(&[5.0, 6.0], &[10.0, 12.0], &[], &[], 'C', "mm", "cm", false, true);
        let high_pos = summary.find("Likely high").unwrap();
        let low_pos = summary.find("Likely low").unwrap();
        assert!(high_pos < low_pos);
    }

    #[test]
    fn exceedance_probability_absent_below_threshold() {
        assert_eq!(precipitation_exceedance_probability(&[1.0, 2.0], "mm", 10.0), None);
    }
}
