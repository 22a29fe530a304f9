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

//! WMO weather-code decoding table

/// decode a WMO weather code into a short description; unknown codes are
/// reported literally rather than silently dropped, so the formatter still
/// has something to print.
pub fn wmo_weather(code: Option<i64>) -> String {
    match code {
        None => "unknown".to_string(),
        Some(c) => match wmo_table(c) {
            Some(desc) => desc.to_string(),
            None => format!("Invalid code: {c}"),
        },
    }
}

fn wmo_table(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "fog",
        48 => "depositing rime fog",
        51 => "light rain",
        53 => "moderate rain",
        55 => "moderate rain",
        56 => "light freezing drizzle",
        57 => "dense freezing drizzle",
        61 => "light rain",
        63 => "moderate rain",
        65 => "heavy rain",
        66 => "light freezing rain",
        67 => "heavy freezing rain",
        71 => "light snow",
        73 => "moderate snow",
        75 => "heavy snow",
        77 => "snow grains",
        80 => "light rain showers",
        81 => "moderate rain showers",
        82 => "heavy rain showers",
        85 => "light snow showers",
        86 => "heavy snow showers",
        95 => "thunderstorm",
        96 => "thunderstorm with slight hail",
        99 => "thunderstorm with heavy hail",
        _ => return None,
    })
}

/// WMO codes that already denote a freezing or snow phenomenon; gates the
/// snow-level diagnostic (it would be redundant to estimate a snow level
/// when the weather code already says it's snowing or freezing).
pub fn is_freezing_or_snow_code(code: i64) -> bool {
    matches!(code, 56 | 57 | 66 | 67 | 71 | 73 | 75 | 77 | 85 | 86)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_code() {
        assert_eq!(wmo_weather(Some(95)), "thunderstorm");
    }

    #[test]
    fn unknown_code_is_literal() {
        assert_eq!(wmo_weather(Some(12345)), "Invalid code: 12345");
    }

    #[test]
    fn missing_code_is_unknown() {
        assert_eq!(wmo_weather(None), "unknown");
    }
}
