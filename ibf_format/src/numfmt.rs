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

//! small rounding/trimming helpers shared across the formatter's totals and
//! range-summary text.

pub fn round_to(value: f64, precision: i32) -> f64 {
    let mul = 10f64.powi(precision);
    (value * mul).round() / mul
}

/// trim a fixed-precision decimal string down to its meaningful digits,
/// e.g. "0.50" -> "0.5", "1.00" -> "1".
pub fn trim_trailing_zeros(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

pub fn format_decimal(value: f64, max_decimals: usize) -> String {
    trim_trailing_zeros(&format!("{value:.max_decimals$}"))
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

pub fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| (min.min(v), max.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_zeros() {
        assert_eq!(trim_trailing_zeros("0.50"), "0.5");
        assert_eq!(trim_trailing_zeros("1.00"), "1");
        assert_eq!(trim_trailing_zeros("12"), "12");
    }

    #[test]
    fn capitalizes_like_python_str_capitalize() {
        assert_eq!(capitalize("LIGHT RAIN"), "Light rain");
        assert_eq!(capitalize("fog"), "Fog");
        assert_eq!(capitalize(""), "");
    }
}
