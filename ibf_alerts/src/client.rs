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

//! country-aware alert aggregation: NWS for the US, MetService CAP for New
//! Zealand (point-in-polygon matched against the alert's own area), and
//! OpenWeatherMap everywhere else.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use geo::{Contains, Point};
use ibf_geocode::GeocodeClient;
use ibf_model::AlertSummary;
use serde::Deserialize;

use crate::cap::{parse_cap_info, parse_rss_items};
use crate::errors::Result;

const NWS_TIMEOUT: Duration = Duration::from_secs(20);
const ALERTS_TIMEOUT: Duration = Duration::from_secs(20);
const METSERVICE_RSS_URL: &str = "https://alerts.metservice.com/cap/rss";

pub struct AlertsClient {
    http: reqwest::Client,
    openweathermap_api_key: Option<String>,
}

impl AlertsClient {
    pub fn new(http: reqwest::Client, openweathermap_api_key: Option<String>) -> Self {
        Self { http, openweathermap_api_key }
    }

    /// resolve the alert provider to use from `country_code` if given,
    /// otherwise reverse-geocode it first.
    pub async fn fetch_alerts(
        &self,
        geocode: &GeocodeClient,
        latitude: f64,
        longitude: f64,
        country_code: Option<&str>,
    ) -> Result<Vec<AlertSummary>> {
        let resolved_country = match country_code {
            Some(c) => Some(c.to_string()),
            None => geocode.resolve_country_code(latitude, longitude).await?,
        };
        let country = resolved_country.unwrap_or_default().to_uppercase();

        let alerts = match country.as_str() {
            "US" => self.fetch_us_alerts(latitude, longitude).await,
            "NZ" => self.fetch_nz_alerts(latitude, longitude).await,
            _ => self.fetch_openweather_alerts(latitude, longitude).await,
        };
        tracing::info!(count = alerts.len(), country = %country, "alerts fetched");
        Ok(alerts)
    }

    async fn fetch_us_alerts(&self, latitude: f64, longitude: f64) -> Vec<AlertSummary> {
        #[derive(Deserialize)]
        struct AlertsResponse {
            #[serde(default)]
            features: Vec<Feature>,
        }
        #[derive(Deserialize)]
        struct Feature {
            properties: Properties,
        }
        #[derive(Deserialize)]
        struct Properties {
            event: Option<String>,
            description: Option<String>,
            headline: Option<String>,
            severity: Option<String>,
            onset: Option<String>,
            ends: Option<String>,
            expires: Option<String>,
        }

        let url = format!("https://api.weather.gov/alerts/active?point={latitude},{longitude}");
        let response = match self
            .http
            .get(&url)
            .header("User-Agent", "ibf-core/0.1")
            .timeout(NWS_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "NWS alerts request failed");
                return Vec::new();
            }
        };

        let parsed: AlertsResponse = match response.json().await {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(error = %err, "NWS alerts returned invalid JSON");
                return Vec::new();
            }
        };

        parsed
            .features
            .into_iter()
            .filter_map(|f| {
                let props = f.properties;
                build_summary(
                    props.event.unwrap_or_else(|| "NWS Alert".to_string()),
                    props.description.or(props.headline).unwrap_or_default(),
                    props.severity,
                    "National Weather Service".to_string(),
                    props.onset,
                    props.ends.or(props.expires),
                )
            })
            .collect()
    }

    async fn fetch_openweather_alerts(&self, latitude: f64, longitude: f64) -> Vec<AlertSummary> {
        #[derive(Deserialize)]
        struct OneCallResponse {
            #[serde(default)]
            alerts: Vec<OneCallAlert>,
        }
        #[derive(Deserialize)]
        struct OneCallAlert {
            event: Option<String>,
            description: Option<String>,
            sender_name: Option<String>,
            start: Option<i64>,
            end: Option<i64>,
        }

        let Some(api_key) = &self.openweathermap_api_key else {
            tracing::debug!("OPENWEATHERMAP_API_KEY not configured; skipping alerts");
            return Vec::new();
        };

        let response = match self
            .http
            .get("https://api.openweathermap.org/data/3.0/onecall")
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("exclude", "current,minutely,hourly,daily".to_string()),
                ("appid", api_key.clone()),
            ])
            .timeout(ALERTS_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "OpenWeatherMap alerts request failed");
                return Vec::new();
            }
        };

        let parsed: OneCallResponse = match response.json().await {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(error = %err, "OpenWeatherMap alerts returned invalid JSON");
                return Vec::new();
            }
        };

        parsed
            .alerts
            .into_iter()
            .filter_map(|a| {
                build_summary(
                    a.event.unwrap_or_else(|| "Weather Alert".to_string()),
                    a.description.unwrap_or_default(),
                    None,
                    a.sender_name.unwrap_or_else(|| "OpenWeatherMap".to_string()),
                    a.start.and_then(unix_to_iso),
                    a.end.and_then(unix_to_iso),
                )
            })
            .collect()
    }

    async fn fetch_nz_alerts(&self, latitude: f64, longitude: f64) -> Vec<AlertSummary> {
        let response = match self
            .http
            .get(METSERVICE_RSS_URL)
            .header("User-Agent", "ibf-core/0.1")
            .timeout(ALERTS_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(error = %err, "MetService RSS request failed");
                return Vec::new();
            }
        };

        let body = match response.bytes().await {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(error = %err, "MetService RSS body read failed");
                return Vec::new();
            }
        };

        let point = Point::new(longitude, latitude);
        let mut summaries = Vec::new();
        for item in parse_rss_items(&body) {
            let cap_response = match self.http.get(&item.link).timeout(ALERTS_TIMEOUT).send().await {
                Ok(r) => r,
                Err(err) => {
                    tracing::debug!(link = %item.link, error = %err, "MetService CAP fetch failed");
                    continue;
                }
            };
            let cap_body = match cap_response.bytes().await {
                Ok(b) => b,
                Err(_) => continue,
            };
            let info = parse_cap_info(&cap_body);
            if info.polygons.is_empty() {
                continue;
            }
            let matched = info.polygons.iter().any(|poly| poly.contains(&point));
            if !matched {
                continue;
            }
            if let Some(summary) = build_summary(
                item.title.clone().unwrap_or_else(|| "MetService Alert".to_string()),
                item.title.unwrap_or_default(),
                info.severity,
                "MetService".to_string(),
                info.onset,
                info.expires,
            ) {
                summaries.push(summary);
            }
        }
        summaries
    }
}

fn unix_to_iso(value: i64) -> Option<String> {
    Utc.timestamp_opt(value, 0).single().map(|dt| dt.to_rfc3339())
}

fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.with_timezone(&Utc))
}

/// alerts with an unparsable or missing onset/expiry are dropped here rather
/// than carried as optional fields downstream -- the discard rule in §3
/// applies to "missing expiry" the same as "past expiry".
fn build_summary(
    title: String,
    description: String,
    severity: Option<String>,
    source: String,
    onset: Option<String>,
    expiry: Option<String>,
) -> Option<AlertSummary> {
    let onset = onset.as_deref().and_then(parse_iso)?;
    let expiry = expiry.as_deref().and_then(parse_iso)?;
    Some(AlertSummary {
        title,
        description,
        severity: severity.unwrap_or_else(|| "Unknown".to_string()),
        source,
        onset,
        expiry,
    })
}
