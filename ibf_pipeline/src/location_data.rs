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

//! the shared per-location data-gathering pipeline (§4.8 steps 3-4): geocode,
//! alerts, NWP fetch (with the pressure-level-profile fallback for snow
//! diagnostics), transform, thinning, and text formatting. Used both for a
//! standalone location entity and for each member gathered on behalf of an
//! area.

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use ibf_dataset::{transform, TransformOptions};
use ibf_format::{format_location_dataset, DisplayUnits};
use ibf_model::{resolve_model_spec, AlertSummary, GeocodeResult, ProcessedDataset, UnitOverrides};
use ibf_nwp::{hourly_fields_for, pressure_profile_fields, NwpRequest, PRESSURE_LEVELS_SNOW_HPA};

use crate::context::PipelineContext;
use crate::errors::{PipelineError, Result};

pub struct LocationParams<'a> {
    pub name: &'a str,
    pub display_name: &'a str,
    pub model_ref: Option<&'a str>,
    pub forecast_days: u32,
    pub units: &'a UnitOverrides,
    pub altitude_override: Option<f64>,
    pub snow_levels: bool,
    pub thin_select: Option<u32>,
}

pub struct LocationData {
    pub display_name: String,
    pub slug: String,
    pub geocode: GeocodeResult,
    pub alerts: Vec<AlertSummary>,
    pub dataset: ProcessedDataset,
    pub formatted_text: String,
    pub timezone: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub async fn gather_location_data(ctx: &PipelineContext, params: &LocationParams<'_>) -> Result<LocationData> {
    let geocode = ctx
        .geocode
        .geocode_name(params.name, "en")
        .await?
        .ok_or_else(|| PipelineError::NoGeocodeResult(params.name.to_string()))?;

    let alerts = ctx
        .alerts
        .fetch_alerts(&ctx.geocode, geocode.latitude, geocode.longitude, geocode.country_code.as_deref())
        .await?;

    let altitude_m = params.altitude_override.or(geocode.altitude_m).unwrap_or(0.0);
    let model_ref = params.model_ref.or(Some(ctx.config.model.as_str()));
    let model_spec = resolve_model_spec(model_ref);
    let wide_forecast_days = params.forecast_days + 1;
    let cache_ttl = Duration::from_secs(u64::from(ctx.config.recent_overwrite_minutes) * 60);

    let primary_request = NwpRequest {
        latitude: geocode.latitude,
        longitude: geocode.longitude,
        timezone: geocode.timezone.clone(),
        forecast_days: wide_forecast_days,
        model_kind: model_spec.kind,
        model_id: Some(model_spec.model_id.clone()),
        hourly_fields: None,
        cache_dir: ctx.cache_root.join("nwp"),
        cache_ttl,
    };
    let mut response = ctx.nwp.fetch(&primary_request).await?;

    if params.snow_levels && !ctx.is_pressure_profile_unsupported(&model_spec.model_id) && !has_freezing_level_height(&response.raw) {
        let profile_fields = format!("{},{}", strip_field(&hourly_fields_for(model_spec.kind, None), "freezing_level_height"), pressure_profile_fields());
        let profile_request = NwpRequest {
            latitude: geocode.latitude,
            longitude: geocode.longitude,
            timezone: geocode.timezone.clone(),
            forecast_days: wide_forecast_days,
            model_kind: model_spec.kind,
            model_id: Some(model_spec.model_id.clone()),
            hourly_fields: Some(profile_fields),
            cache_dir: ctx.cache_root.join("nwp"),
            cache_ttl,
        };
        match ctx.nwp.fetch(&profile_request).await {
            Ok(profile_response) if pressure_profile_all_null(&profile_response.raw) => {
                if ctx.mark_pressure_profile_unsupported(&model_spec.model_id) {
                    tracing::info!(model = %model_spec.model_id, "pressure-level profile returned only nulls; skipping for the rest of this run");
                }
            }
            Ok(profile_response) => merge_pressure_profile(&mut response.raw, &profile_response.raw),
            Err(err) => {
                tracing::warn!(model = %model_spec.model_id, error = %err, "pressure-level profile fetch failed");
                ctx.mark_pressure_profile_unsupported(&model_spec.model_id);
            }
        }
    }

    let tz = ibf_common::datetime::resolve_timezone(&geocode.timezone);
    let transform_opts = TransformOptions {
        now: Utc::now().with_timezone(&tz),
        timezone_name: geocode.timezone.clone(),
        forecast_days: wide_forecast_days,
        station_altitude_m: altitude_m,
        compute_snow_levels: params.snow_levels,
        max_terrain_m: None,
    };
    let mut dataset = transform(&response.raw, &transform_opts)?;
    dataset.days.truncate(params.forecast_days as usize);

    if let Some(thin_select) = params.thin_select {
        dataset = ibf_thin::select_members(&dataset, thin_select as usize, 1.0, 1.0);
    }

    let display_units = display_units_from_overrides(params.units);
    let formatted_text = format_location_dataset(&dataset, &alerts, &display_units);

    let latitude = geocode.latitude;
    let longitude = geocode.longitude;
    let timezone = geocode.timezone.clone();

    Ok(LocationData {
        display_name: params.display_name.to_string(),
        slug: ibf_common::slug::slugify(params.display_name),
        geocode,
        alerts,
        dataset,
        formatted_text,
        timezone,
        latitude,
        longitude,
    })
}

pub fn display_units_from_overrides(overrides: &UnitOverrides) -> DisplayUnits {
    DisplayUnits {
        temperature_unit: overrides.get("temperature_unit").cloned().unwrap_or_else(|| "celsius".to_string()),
        precipitation_unit: overrides.get("precipitation_unit").cloned().unwrap_or_else(|| "mm".to_string()),
        snowfall_unit: overrides.get("snowfall_unit").cloned().unwrap_or_else(|| "cm".to_string()),
        windspeed_unit: overrides.get("windspeed_unit").cloned().unwrap_or_else(|| "kph".to_string()),
    }
}

fn strip_field(fields: &str, name: &str) -> String {
    fields.split(',').map(str::trim).filter(|tok| !tok.is_empty() && *tok != name).collect::<Vec<_>>().join(",")
}

fn has_freezing_level_height(raw: &Value) -> bool {
    raw.get("hourly").and_then(|h| h.get("freezing_level_height")).is_some()
}

/// every temperature/relative_humidity/geopotential_height series at every
/// requested pressure level came back entirely null.
fn pressure_profile_all_null(raw: &Value) -> bool {
    let Some(hourly) = raw.get("hourly").and_then(Value::as_object) else { return true };
    for level in PRESSURE_LEVELS_SNOW_HPA {
        for prefix in ["temperature", "relative_humidity", "geopotential_height"] {
            let key = format!("{prefix}_{level}hPa");
            if let Some(arr) = hourly.get(&key).and_then(Value::as_array) {
                if arr.iter().any(|v| v.as_f64().is_some()) {
                    return false;
                }
            }
        }
    }
    true
}

fn merge_pressure_profile(primary: &mut Value, profile: &Value) {
    let Some(profile_hourly) = profile.get("hourly").and_then(Value::as_object).cloned() else { return };
    if let Some(primary_hourly) = primary.get_mut("hourly").and_then(Value::as_object_mut) {
        for (key, value) in profile_hourly {
            if key == "time" {
                continue;
            }
            primary_hourly.entry(key).or_insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_missing_freezing_level_height() {
        let raw = json!({"hourly": {"time": ["2025-01-10T00:00"], "temperature_2m": [5.0]}});
        assert!(!has_freezing_level_height(&raw));

        let raw = json!({"hourly": {"time": ["2025-01-10T00:00"], "freezing_level_height": [1500.0]}});
        assert!(has_freezing_level_height(&raw));
    }

    #[test]
    fn pressure_profile_is_null_when_every_level_is_null() {
        let raw = json!({
            "hourly": {
                "time": ["2025-01-10T00:00"],
                "temperature_1000hPa": [serde_json::Value::Null],
                "relative_humidity_1000hPa": [serde_json::Value::Null],
                "geopotential_height_1000hPa": [serde_json::Value::Null],
            }
        });
        assert!(pressure_profile_all_null(&raw));
    }

    #[test]
    fn pressure_profile_is_not_null_when_one_level_has_data() {
        let raw = json!({
            "hourly": {
                "time": ["2025-01-10T00:00"],
                "temperature_1000hPa": [12.0],
            }
        });
        assert!(!pressure_profile_all_null(&raw));
    }

    #[test]
    fn merge_copies_missing_fields_without_overwriting_time() {
        let mut primary = json!({"hourly": {"time": ["2025-01-10T00:00"], "temperature_2m": [5.0]}});
        let profile = json!({"hourly": {"time": ["WRONG"], "surface_pressure": [1001.0]}});
        merge_pressure_profile(&mut primary, &profile);
        assert_eq!(primary["hourly"]["time"][0], "2025-01-10T00:00");
        assert_eq!(primary["hourly"]["surface_pressure"][0], 1001.0);
    }

    #[test]
    fn strip_field_removes_only_named_token() {
        let fields = "a,b,c";
        assert_eq!(strip_field(fields, "b"), "a,c");
    }
}
