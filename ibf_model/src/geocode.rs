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

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub country_code: Option<String>,
    pub altitude_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub title: String,
    pub description: String,
    pub severity: String,
    pub source: String,
    pub onset: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
}

impl AlertSummary {
    /// an alert is worth surfacing only if it has not already expired
    /// relative to the first forecast day.
    pub fn is_active(&self, first_forecast_day: NaiveDate) -> bool {
        self.expiry.date_naive() >= first_forecast_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn discards_alert_expired_before_first_day() {
        let alert = AlertSummary {
            title: "Heavy rain".into(),
            description: "".into(),
            severity: "moderate".into(),
            source: "NWS".into(),
            onset: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            expiry: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
        };
        let first_day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert!(!alert.is_active(first_day));
    }

    #[test]
    fn keeps_alert_expiring_on_or_after_first_day() {
        let alert = AlertSummary {
            title: "Flood watch".into(),
            description: "".into(),
            severity: "severe".into(),
            source: "NWS".into(),
            onset: Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap(),
            expiry: Utc.with_ymd_and_hms(2025, 1, 11, 0, 0, 0).unwrap(),
        };
        let first_day = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert!(alert.is_active(first_day));
    }
}
