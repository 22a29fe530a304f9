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

//! shared, process-wide run state: the HTTP-backed service clients, the
//! filesystem cache root, and the two pieces of mutable state every entity
//! in a run contends over -- the per-model pressure-profile-support set and
//! the cost ledger.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use ibf_alerts::AlertsClient;
use ibf_geocode::GeocodeClient;
use ibf_llm::{CostLedger, LlmClient};
use ibf_model::ForecastConfig;
use ibf_nwp::NwpClient;
use tokio_util::sync::CancellationToken;

pub struct PipelineContext {
    pub http: reqwest::Client,
    pub geocode: GeocodeClient,
    pub alerts: AlertsClient,
    pub nwp: NwpClient,
    pub llm: LlmClient,
    pub cache_root: PathBuf,
    pub config: ForecastConfig,
    /// model ids that, for this run, have already been observed to return
    /// only nulls for the pressure-level profile fields -- further requests
    /// for that model id skip the extra fetch entirely (§4.8 step 3).
    pub pressure_unsupported: Mutex<HashSet<String>>,
    pub cost_ledger: CostLedger,
    pub cancellation: CancellationToken,
}

impl PipelineContext {
    pub fn new(http: reqwest::Client, cache_root: PathBuf, config: ForecastConfig, google_api_key: Option<String>, openweathermap_api_key: Option<String>) -> Self {
        let geocode = GeocodeClient::new(http.clone(), cache_root.join("geocode"), google_api_key);
        let alerts = AlertsClient::new(http.clone(), openweathermap_api_key);
        let nwp = NwpClient::new(http.clone());
        let llm = LlmClient::new(http.clone());
        Self {
            http,
            geocode,
            alerts,
            nwp,
            llm,
            cache_root,
            config,
            pressure_unsupported: Mutex::new(HashSet::new()),
            cost_ledger: CostLedger::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// `true` the first time `model_id` is marked unsupported this run, so
    /// the caller can log it once instead of on every subsequent location.
    pub fn mark_pressure_profile_unsupported(&self, model_id: &str) -> bool {
        let mut set = self.pressure_unsupported.lock().expect("pressure_unsupported mutex poisoned");
        set.insert(model_id.to_string())
    }

    pub fn is_pressure_profile_unsupported(&self, model_id: &str) -> bool {
        self.pressure_unsupported.lock().expect("pressure_unsupported mutex poisoned").contains(model_id)
    }
}
