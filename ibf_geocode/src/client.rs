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

//! place-name and reverse-country-code resolution via Open-Meteo (primary)
//! and Google (fallback), both cached to disk by the caller-supplied cache
//! root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ibf_model::GeocodeResult;
use serde::Deserialize;

use crate::cache::{
    coordinate_cache_key, country_cache_path, normalize_query, read_country_cache, read_search_cache,
    search_cache_path, write_country_cache, write_search_cache, CacheEntry,
};
use crate::errors::Result;

const OPEN_METEO_GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const OPEN_METEO_TIMEOUT: Duration = Duration::from_secs(20);
const GOOGLE_TIMEOUT: Duration = Duration::from_secs(15);

pub struct GeocodeClient {
    http: reqwest::Client,
    cache_root: PathBuf,
    google_api_key: Option<String>,
}

impl GeocodeClient {
    pub fn new(http: reqwest::Client, cache_root: PathBuf, google_api_key: Option<String>) -> Self {
        Self { http, cache_root, google_api_key }
    }

    pub async fn geocode_name(&self, name: &str, language: &str) -> Result<Option<GeocodeResult>> {
        let path = search_cache_path(&self.cache_root);
        let key = normalize_query(name);

        let cache = read_search_cache(&path);
        if let Some(entry) = cache.get(&key) {
            tracing::info!(name, lat = entry.latitude, lon = entry.longitude, "geocode cache hit");
            return Ok(Some(to_result(entry.clone())));
        }

        let resolved = match self.open_meteo_geocode(name, language).await? {
            Some(r) => Some(r),
            None => match &self.google_api_key {
                Some(key) => self.google_geocode(name, key).await?,
                None => {
                    tracing::warn!(name, "no Open-Meteo result and no Google API key configured");
                    None
                }
            },
        };

        let Some(result) = resolved else { return Ok(None) };

        let mut cache = read_search_cache(&path);
        cache.insert(
            key,
            CacheEntry {
                name: result.formatted_name.clone(),
                latitude: result.latitude,
                longitude: result.longitude,
                timezone: result.timezone.clone(),
                country_code: result.country_code.clone(),
                altitude: result.altitude_m,
            },
        );
        write_search_cache(&path, &cache)?;
        Ok(Some(result))
    }

    pub async fn resolve_country_code(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let path = country_cache_path(&self.cache_root);
        let key = coordinate_cache_key(latitude, longitude);

        let cache = read_country_cache(&path);
        if let Some(code) = cache.get(&key) {
            return Ok(Some(code.clone()));
        }

        let code = match &self.google_api_key {
            Some(key) => self.google_reverse_country(latitude, longitude, key).await?,
            None => None,
        };

        if let Some(code) = &code {
            let mut cache = read_country_cache(&path);
            cache.insert(key, code.clone());
            write_country_cache(&path, &cache)?;
        }
        Ok(code)
    }

    async fn open_meteo_geocode(&self, name: &str, language: &str) -> Result<Option<GeocodeResult>> {
        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            results: Vec<SearchEntry>,
        }
        #[derive(Deserialize)]
        struct SearchEntry {
            name: String,
            latitude: f64,
            longitude: f64,
            #[serde(default = "default_timezone")]
            timezone: String,
            country_code: Option<String>,
        }
        fn default_timezone() -> String {
            "UTC".to_string()
        }

        let response = self
            .http
            .get(OPEN_METEO_GEOCODE_URL)
            .query(&[("name", name), ("count", "1"), ("language", language), ("format", "json")])
            .timeout(OPEN_METEO_TIMEOUT)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(name, error = %err, "Open-Meteo geocoding request failed");
                return Ok(None);
            }
        };

        let parsed: SearchResponse = match response.error_for_status() {
            Ok(r) => match r.json().await {
                Ok(p) => p,
                Err(err) => {
                    tracing::warn!(name, error = %err, "Open-Meteo geocoding response was not valid JSON");
                    return Ok(None);
                }
            },
            Err(err) => {
                tracing::warn!(name, error = %err, "Open-Meteo geocoding returned an error status");
                return Ok(None);
            }
        };

        Ok(parsed.results.into_iter().next().map(|entry| GeocodeResult {
            formatted_name: entry.name,
            latitude: entry.latitude,
            longitude: entry.longitude,
            timezone: entry.timezone,
            country_code: entry.country_code,
            altitude_m: None,
        }))
    }

    async fn google_geocode(&self, name: &str, api_key: &str) -> Result<Option<GeocodeResult>> {
        #[derive(Deserialize)]
        struct GeocodeResponse {
            status: String,
            #[serde(default)]
            results: Vec<GeocodeEntry>,
        }
        #[derive(Deserialize)]
        struct GeocodeEntry {
            formatted_address: String,
            geometry: Geometry,
            #[serde(default)]
            address_components: Vec<AddressComponent>,
        }
        #[derive(Deserialize)]
        struct Geometry {
            location: LatLng,
        }
        #[derive(Deserialize)]
        struct LatLng {
            lat: f64,
            lng: f64,
        }
        #[derive(Deserialize)]
        struct AddressComponent {
            short_name: String,
            types: Vec<String>,
        }
        #[derive(Deserialize)]
        struct ElevationResponse {
            status: String,
            #[serde(default)]
            results: Vec<ElevationEntry>,
        }
        #[derive(Deserialize)]
        struct ElevationEntry {
            elevation: f64,
        }

        let url = "https://maps.googleapis.com/maps/api/geocode/json";
        let response = match self
            .http
            .get(url)
            .query(&[("address", name), ("key", api_key)])
            .timeout(GOOGLE_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                tracing::error!(name, error = %err, "Google geocoding request failed");
                return Ok(None);
            }
        };

        let parsed: GeocodeResponse = match response.json().await {
            Ok(p) => p,
            Err(err) => {
                tracing::error!(name, error = %err, "Google geocoding response was not valid JSON");
                return Ok(None);
            }
        };

        if parsed.status != "OK" {
            tracing::warn!(name, status = %parsed.status, "Google Geocoding returned non-OK status");
            return Ok(None);
        }
        let Some(entry) = parsed.results.into_iter().next() else { return Ok(None) };

        let country_code = entry
            .address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == "country"))
            .map(|c| c.short_name.clone());

        let altitude = match self
            .http
            .get("https://maps.googleapis.com/maps/api/elevation/json")
            .query(&[
                ("locations", format!("{},{}", entry.geometry.location.lat, entry.geometry.location.lng)),
                ("key", api_key.to_string()),
            ])
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(r) => match r.json::<ElevationResponse>().await {
                Ok(elev) if elev.status == "OK" => elev.results.into_iter().next().map(|e| e.elevation),
                _ => None,
            },
            Err(err) => {
                tracing::debug!(name, error = %err, "Google elevation request failed");
                None
            }
        };

        // the source's timezonefinder offline lookup has no equivalent crate already
        // in this stack; Google-resolved entries fall back to UTC, matching the
        // dataset transformer's own invalid-timezone-falls-back-to-UTC edge policy.
        Ok(Some(GeocodeResult {
            formatted_name: entry.formatted_address,
            latitude: entry.geometry.location.lat,
            longitude: entry.geometry.location.lng,
            timezone: "UTC".to_string(),
            country_code,
            altitude_m: altitude,
        }))
    }

    async fn google_reverse_country(&self, latitude: f64, longitude: f64, api_key: &str) -> Result<Option<String>> {
        #[derive(Deserialize)]
        struct GeocodeResponse {
            #[serde(default)]
            results: Vec<GeocodeEntry>,
        }
        #[derive(Deserialize)]
        struct GeocodeEntry {
            #[serde(default)]
            address_components: Vec<AddressComponent>,
        }
        #[derive(Deserialize)]
        struct AddressComponent {
            short_name: String,
            types: Vec<String>,
        }

        let response = match self
            .http
            .get("https://maps.googleapis.com/maps/api/geocode/json")
            .query(&[("latlng", format!("{latitude},{longitude}")), ("key", api_key.to_string())])
            .timeout(GOOGLE_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                tracing::debug!(error = %err, "Google reverse geocode failed");
                return Ok(None);
            }
        };

        let parsed: GeocodeResponse = match response.json().await {
            Ok(p) => p,
            Err(_) => return Ok(None),
        };

        Ok(parsed
            .results
            .into_iter()
            .next()
            .and_then(|entry| entry.address_components.into_iter().find(|c| c.types.iter().any(|t| t == "country")))
            .map(|c| c.short_name))
    }
}

fn to_result(entry: CacheEntry) -> GeocodeResult {
    GeocodeResult {
        formatted_name: entry.name,
        latitude: entry.latitude,
        longitude: entry.longitude,
        timezone: entry.timezone,
        country_code: entry.country_code,
        altitude_m: entry.altitude,
    }
}

pub fn cache_root_geocode_dir(cache_root: &Path) -> PathBuf {
    cache_root.join("geocode")
}
