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

//! wind speed rounding and the compact "direction speed gust N" phrase.

/// round to the nearest 10 (kph/kmh) or 5 (mph/kt/kts/mps); any other unit
/// rounds to the nearest integer. A non-zero input that rounds to zero is
/// bumped up to 1 so "light wind" never reads as "calm".
pub fn round_windspeed(speed: f64, unit: &str) -> i64 {
    let unit = unit.to_lowercase();
    let nearest = match unit.as_str() {
        "kph" | "kmh" => 10.0,
        "mph" | "kt" | "kts" | "mps" => 5.0,
        _ => return speed.round() as i64,
    };
    let rounded = nearest * (speed / nearest).round();
    if rounded == 0.0 && speed > 0.0 {
        return (speed.round() as i64).max(1);
    }
    rounded as i64
}

/// "calm" when speed is non-positive, otherwise "<direction> <speed>" with an
/// optional "gust <n>" suffix when the gust exceeds the sustained speed by
/// at least 5.
pub fn format_wind(direction: &str, speed: i64, gust: i64) -> String {
    if speed <= 0 {
        return "calm".to_string();
    }
    let dir = if direction.trim().is_empty() { "VAR" } else { direction };
    let mut out = format!("{dir} {speed}");
    if gust - speed >= 5 {
        out.push_str(&format!(" gust {gust}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_kph_to_nearest_ten() {
        assert_eq!(round_windspeed(24.0, "kph"), 20);
        assert_eq!(round_windspeed(26.0, "kph"), 30);
    }

    #[test]
    fn light_wind_never_rounds_to_zero() {
        assert_eq!(round_windspeed(2.0, "kph"), 1);
    }

    #[test]
    fn calm_below_or_at_zero() {
        assert_eq!(format_wind("northerly", 0, 0), "calm");
    }

    #[test]
    fn gust_only_shown_past_five_kph_gap() {
        assert_eq!(format_wind("northerly", 20, 23), "northerly 20");
        assert_eq!(format_wind("northerly", 20, 26), "northerly 20 gust 26");
    }

    #[test]
    fn missing_direction_falls_back_to_var() {
        assert_eq!(format_wind("", 10, 10), "VAR 10");
    }
}
