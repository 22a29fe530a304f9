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

//! timezone resolution and day/hour labeling shared by the dataset transformer and formatter

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;

/// resolve a timezone name, falling back to UTC silently on anything invalid
/// (per the dataset transformer's edge policy: an invalid timezone is not fatal).
pub fn resolve_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or(chrono_tz::UTC)
}

/// `HH:00`-style local hour label
pub fn hour_key(dt: &DateTime<Tz>) -> String {
    format!("{:02}:00", dt.format("%H").to_string().parse::<u32>().unwrap_or(0))
}

/// `HH(am|pm|noon|midnight)` label used in the formatter's per-hour lines
pub fn hour_to_ampm(hour: u32) -> String {
    match hour {
        0 => "midnight".to_string(),
        12 => "noon".to_string(),
        h if h < 12 => format!("{h}am"),
        h => format!("{}pm", h - 12),
    }
}

/// human day-of-week label relative to "now", per the dataset transformer's day-label rules
pub fn classify_day(forecast_date: NaiveDate, now: &DateTime<Tz>) -> String {
    let current_date = now.date_naive();
    let day_name = forecast_date.format("%A").to_string();

    if forecast_date == current_date {
        let hour = now.format("%H").to_string().parse::<u32>().unwrap_or(0);
        return if hour >= 22 {
            format!("Rest of the evening, {day_name}")
        } else if hour > 15 {
            format!("This evening, {day_name}")
        } else if hour > 10 {
            format!("This afternoon and evening, {day_name}")
        } else if hour >= 6 {
            format!("Rest of today, {day_name}")
        } else {
            format!("Today, {day_name}")
        };
    }
    if forecast_date == current_date.succ_opt().unwrap_or(current_date) {
        return format!("Tomorrow, {day_name}");
    }
    if forecast_date < current_date {
        return "Past".to_string();
    }
    day_name
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::UTC;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
        UTC.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn rest_of_today() {
        let now = at(2025, 1, 10, 9);
        let label = classify_day(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(), &now);
        assert!(label.starts_with("Rest of today"), "{label}");
    }

    #[test]
    fn tomorrow() {
        let now = at(2025, 1, 10, 9);
        let label = classify_day(NaiveDate::from_ymd_opt(2025, 1, 11).unwrap(), &now);
        assert!(label.starts_with("Tomorrow"), "{label}");
    }

    #[test]
    fn weekday_for_later_day() {
        let now = at(2025, 1, 10, 9);
        let label = classify_day(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(), &now);
        assert_eq!(label, "Sunday");
    }

    #[test]
    fn invalid_timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone("Not/A_Zone"), chrono_tz::UTC);
    }

    #[test]
    fn ampm_labels() {
        assert_eq!(hour_to_ampm(0), "midnight");
        assert_eq!(hour_to_ampm(12), "noon");
        assert_eq!(hour_to_ampm(6), "6am");
        assert_eq!(hour_to_ampm(18), "6pm");
    }
}
