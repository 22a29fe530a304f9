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

//! renders active alerts into the "ACTIVE ALERTS:" block that precedes the
//! dataset text.

use chrono::NaiveDate;
use chrono_tz::Tz;
use ibf_model::AlertSummary;

/// alerts that have already expired before the forecast window begins are
/// dropped (see [`AlertSummary::is_active`]); the rest are rendered with
/// their onset/expiry converted into the location's local timezone.
pub fn format_alerts(alerts: &[AlertSummary], first_forecast_day: NaiveDate, tz: Tz) -> String {
    if alerts.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = alerts
        .iter()
        .filter(|alert| alert.is_active(first_forecast_day))
        .map(|alert| {
            let onset = alert.onset.with_timezone(&tz);
            let expires = alert.expiry.with_timezone(&tz);
            format!(
                "ALERT from {}:\nTitle: {}\nValid from: {}\nExpires: {}\nDescription: {}",
                non_empty(&alert.source),
                non_empty(&alert.title),
                onset.format("%Y-%m-%d %H:%M %Z"),
                expires.format("%Y-%m-%d %H:%M %Z"),
                non_empty(&alert.description),
            )
        })
        .collect();

    if lines.is_empty() {
        return String::new();
    }
    format!("ACTIVE ALERTS:\n{}", lines.join("\n"))
}

fn non_empty(value: &str) -> &str {
    if value.trim().is_empty() { "N/A" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn alert(onset_days: i64, expiry_days: i64) -> AlertSummary {
        AlertSummary {
            title: "Heavy rain warning".into(),
            description: "Significant rainfall expected.".into(),
            severity: "moderate".into(),
            source: "NWS".into(),
            onset: Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap() + chrono::Duration::days(onset_days),
            expiry: Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap() + chrono::Duration::days(expiry_days),
        }
    }

    #[test]
    fn empty_alerts_yield_empty_text() {
        assert_eq!(format_alerts(&[], NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(), chrono_tz::UTC), "");
    }

    #[test]
    fn drops_expired_alert() {
        let alerts = vec![alert(-5, -1)];
        let text = format_alerts(&alerts, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(), chrono_tz::UTC);
        assert_eq!(text, "");
    }

    #[test]
    fn keeps_active_alert_and_renders_fields() {
        let alerts = vec![alert(0, 1)];
        let text = format_alerts(&alerts, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(), chrono_tz::UTC);
        assert!(text.starts_with("ACTIVE ALERTS:"));
        assert!(text.contains("Heavy rain warning"));
        assert!(text.contains("ALERT from NWS:"));
    }
}
