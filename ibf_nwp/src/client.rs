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

//! Open-Meteo ensemble/forecast client: cache-first fetch, field-set
//! fallback on 400, and exponential-backoff retry on transport/JSON/schema
//! failures.

use std::path::PathBuf;
use std::time::Duration;

use ibf_model::ModelKind;

use crate::cache::{cache_key, cache_path};
use crate::errors::{op_failed, NwpError, Result};
use crate::fields::{hourly_fields_for, remove_field, STANDARD_PRECIPITATION_UNIT, STANDARD_TEMPERATURE_UNIT};

const ENSEMBLE_BASE_URL: &str = "https://ensemble-api.open-meteo.com/v1/ensemble";
const FORECAST_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;
const CACHE_SWEEP_MAX_AGE: Duration = Duration::from_secs(48 * 3600);

/// parameters for a single Open-Meteo fetch. Units are always normalized to
/// °C/mm/kph on the wire regardless of display preference (§4.1); conversion
/// to display units happens downstream in the dataset transformer/formatter.
pub struct NwpRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub forecast_days: u32,
    pub model_kind: ModelKind,
    pub model_id: Option<String>,
    pub hourly_fields: Option<String>,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
}

pub struct NwpClient {
    http: reqwest::Client,
}

impl NwpClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// fetch a validated raw payload, serving from cache when fresh and
    /// sweeping entries older than 48h on every call (§4.1).
    pub async fn fetch(&self, request: &NwpRequest) -> Result<ibf_model::ForecastResponse> {
        ibf_fs_cache::ensure_dir(&request.cache_dir).map_err(|e| op_failed(e.to_string()))?;
        let _ = ibf_fs_cache::remove_old_files(&request.cache_dir, CACHE_SWEEP_MAX_AGE);

        let primary_fields = hourly_fields_for(request.model_kind, request.hourly_fields.as_deref());
        let model_id = request.model_id.as_deref().unwrap_or("auto");
        let key = cache_key(request.latitude, request.longitude, request.forecast_days, request.model_kind, model_id, &primary_fields);
        let path = cache_path(&request.cache_dir, &key);

        if request.cache_ttl > Duration::ZERO {
            match ibf_fs_cache::read_json_cache::<serde_json::Value>(&path, request.cache_ttl) {
                Ok(Some(raw)) if validate_response(&raw).is_ok() => {
                    tracing::debug!(path = %path.display(), "NWP cache hit");
                    return Ok(ibf_model::ForecastResponse { raw, from_cache: true, cache_path: Some(path) });
                }
                Ok(Some(_)) => {
                    tracing::warn!(path = %path.display(), "cached NWP payload failed schema validation; deleting");
                    let _ = std::fs::remove_file(&path);
                }
                _ => {}
            }
        }

        let raw = self.download(request, &primary_fields).await?;
        if request.cache_ttl > Duration::ZERO {
            if let Err(err) = ibf_fs_cache::write_json_cache(&path, &raw) {
                tracing::warn!(error = %err, "failed to write NWP cache entry");
            }
        }
        Ok(ibf_model::ForecastResponse { raw, from_cache: false, cache_path: Some(path) })
    }

    async fn download(&self, request: &NwpRequest, primary_fields: &str) -> Result<serde_json::Value> {
        let base_url = match request.model_kind {
            ModelKind::Ensemble => ENSEMBLE_BASE_URL,
            ModelKind::Deterministic => FORECAST_BASE_URL,
        };

        // deterministic requests that ask for freezing-level height retry once
        // with the base field set if the endpoint rejects it with a 400 (§4.1).
        let mut candidates = vec![primary_fields.to_string()];
        if request.model_kind == ModelKind::Deterministic
            && request.hourly_fields.is_none()
            && primary_fields.contains("freezing_level_height")
        {
            let reduced = remove_field(primary_fields, "freezing_level_height");
            if !reduced.is_empty() && reduced != primary_fields {
                candidates.push(reduced);
            }
        }

        let mut last_error: Option<String> = None;
        let num_candidates = candidates.len();
        for (candidate_idx, fields) in candidates.into_iter().enumerate() {
            let params = self.build_params(request, &fields);

            for attempt in 1..=MAX_ATTEMPTS {
                match self.http.get(base_url).query(&params).timeout(REQUEST_TIMEOUT).send().await {
                    Ok(response) => {
                        let status = response.status();
                        if status.as_u16() == 400 && candidate_idx + 1 < num_candidates {
                            tracing::info!(candidate = candidate_idx + 1, total = num_candidates, "Open-Meteo rejected field set; retrying with fallback");
                            break;
                        }
                        match response.error_for_status() {
                            Ok(response) => match response.json::<serde_json::Value>().await {
                                Ok(data) => match validate_response(&data) {
                                    Ok(()) => return Ok(data),
                                    Err(err) => {
                                        last_error = Some(err.to_string());
                                        tracing::warn!(error = %last_error.as_ref().unwrap(), attempt, "Open-Meteo payload failed schema validation");
                                    }
                                },
                                Err(err) => {
                                    last_error = Some(format!("invalid JSON from Open-Meteo: {err}"));
                                    tracing::warn!(error = %err, attempt, "Open-Meteo response was not valid JSON");
                                }
                            },
                            Err(err) => {
                                last_error = Some(format!("HTTP error calling Open-Meteo: {err}"));
                                tracing::warn!(error = %err, attempt, "Open-Meteo returned an error status");
                            }
                        }
                    }
                    Err(err) => {
                        last_error = Some(format!("transport error calling Open-Meteo: {err}"));
                        tracing::warn!(error = %err, attempt, "Open-Meteo request failed");
                    }
                }

                if attempt < MAX_ATTEMPTS {
                    let backoff = Duration::from_secs(1u64 << (attempt - 1));
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Err(NwpError::TransportFailed(last_error.unwrap_or_else(|| "failed to fetch Open-Meteo forecast".to_string())))
    }

    fn build_params(&self, request: &NwpRequest, hourly_fields: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("latitude".to_string(), format!("{:.2}", request.latitude)),
            ("longitude".to_string(), format!("{:.2}", request.longitude)),
            ("hourly".to_string(), hourly_fields.to_string()),
            ("timezone".to_string(), request.timezone.clone()),
            ("forecast_days".to_string(), request.forecast_days.to_string()),
            ("temperature_unit".to_string(), STANDARD_TEMPERATURE_UNIT.to_string()),
            ("windspeed_unit".to_string(), "kmh".to_string()),
            ("precipitation_unit".to_string(), STANDARD_PRECIPITATION_UNIT.to_string()),
        ];
        if let Some(model_id) = &request.model_id {
            params.push(("models".to_string(), model_id.clone()));
        }
        params
    }
}

fn validate_response(data: &serde_json::Value) -> Result<()> {
    let hourly = data.get("hourly").ok_or_else(|| NwpError::InvalidResponse("missing 'hourly'".to_string()))?;
    let hourly = hourly.as_object().ok_or_else(|| NwpError::InvalidResponse("'hourly' is not an object".to_string()))?;
    if !hourly.contains_key("time") {
        return Err(NwpError::InvalidResponse("missing 'hourly.time'".to_string()));
    }
    let time_len = hourly.get("time").and_then(|v| v.as_array()).map(|a| a.len());
    if let Some(expected_len) = time_len {
        for (key, value) in hourly {
            if key == "time" {
                continue;
            }
            if let Some(arr) = value.as_array() {
                if arr.len() != expected_len {
                    return Err(NwpError::InvalidResponse(format!("'{key}' length {} does not match 'time' length {expected_len}", arr.len())));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validates_hourly_time_presence() {
        let ok = json!({"hourly": {"time": ["2025-01-01T00:00"], "temperature_2m": [1.0]}});
        assert!(validate_response(&ok).is_ok());

        let missing = json!({"hourly": {"temperature_2m": [1.0]}});
        assert!(validate_response(&missing).is_err());
    }

    #[test]
    fn rejects_mismatched_array_lengths() {
        let mismatched = json!({"hourly": {"time": ["2025-01-01T00:00", "2025-01-01T01:00"], "temperature_2m": [1.0]}});
        assert!(validate_response(&mismatched).is_err());
    }
}
