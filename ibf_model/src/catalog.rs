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

//! canonical `<kind>:<model_id>` model references and the known ensemble/deterministic
//! catalogs used to resolve unprefixed references and member counts.

use serde::{Deserialize, Serialize};

/// an NWP model producing multiple realizations, vs. one producing a single
/// best-estimate trajectory (treated as an ensemble of one member).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    Ensemble,
    Deterministic,
}

/// resolved model metadata used to route NWP requests and label output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub reference: String,
    pub kind: ModelKind,
    pub model_id: String,
    pub name: String,
    pub members: u32,
    pub provider: Option<String>,
    pub ack_url: Option<String>,
}

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    members: u32,
    provider: Option<&'static str>,
    ack_url: Option<&'static str>,
}

const ENSEMBLE_MODELS: &[CatalogEntry] = &[
    CatalogEntry {
        id: "ecmwf_ifs025",
        name: "ECMWF IFS 0.25° ensemble",
        members: 51,
        provider: None,
        ack_url: Some("https://apps.ecmwf.int/datasets/licences/general/"),
    },
    CatalogEntry {
        id: "ecmwf_aifs025",
        name: "ECMWF AIFS 0.25° ensemble",
        members: 51,
        provider: None,
        ack_url: Some("https://apps.ecmwf.int/datasets/licences/general/"),
    },
    CatalogEntry {
        id: "gem_global",
        name: "ECCC GEM Global ensemble",
        members: 21,
        provider: Some("Environment and Climate Change Canada"),
        ack_url: None,
    },
    CatalogEntry {
        id: "ukmo_global_ensemble_20km",
        name: "UKMO MOGREPS-G 20 km ensemble",
        members: 21,
        provider: Some("UK Met Office"),
        ack_url: None,
    },
    CatalogEntry {
        id: "ukmo_uk_ensemble_2km",
        name: "UKMO MOGREPS-UK 2 km ensemble",
        members: 3,
        provider: Some("UK Met Office"),
        ack_url: None,
    },
    CatalogEntry {
        id: "gfs025",
        name: "NOAA GFS 0.25° ensemble",
        members: 31,
        provider: Some("NOAA"),
        ack_url: None,
    },
    CatalogEntry {
        id: "icon_seamless",
        name: "DWD ICON seamless ensemble",
        members: 40,
        provider: Some("Deutscher Wetterdienst"),
        ack_url: None,
    },
];

pub const DEFAULT_ENSEMBLE_MODEL: &str = "ecmwf_ifs025";

const DETERMINISTIC_MODELS: &[CatalogEntry] = &[
    CatalogEntry {
        id: "ecmwf_ifs",
        name: "ECMWF IFS HRES 9 km (deterministic)",
        members: 1,
        provider: None,
        ack_url: Some("https://apps.ecmwf.int/datasets/licences/general/"),
    },
    CatalogEntry {
        id: "icon_seamless",
        name: "DWD ICON seamless (deterministic)",
        members: 1,
        provider: Some("Deutscher Wetterdienst"),
        ack_url: None,
    },
    CatalogEntry {
        id: "open-meteo",
        name: "Open-Meteo auto (best available deterministic)",
        members: 1,
        provider: Some("Open-Meteo"),
        ack_url: None,
    },
];

fn find<'a>(table: &'a [CatalogEntry], id: &str) -> Option<&'a CatalogEntry> {
    table.iter().find(|e| e.id == id)
}

/// lookup table of known ensemble member counts and deterministic model metadata;
/// unprefixed model references are resolved against it.
pub struct ModelCatalog;

impl ModelCatalog {
    pub fn ensemble_members(model_id: &str) -> Option<u32> {
        find(ENSEMBLE_MODELS, model_id).map(|e| e.members)
    }

    pub fn is_known_ensemble(model_id: &str) -> bool {
        find(ENSEMBLE_MODELS, model_id).is_some()
    }
}

/// resolve a model reference into a [`ModelSpec`].
///
/// Accepted forms: `"ens:<id>"`, `"ensemble:<id>"`, `"det:<id>"`, `"deterministic:<id>"`,
/// or a bare id (back-compat: treated as ensemble when it names a known ensemble model,
/// deterministic otherwise). An empty reference resolves to the default ensemble model.
pub fn resolve_model_spec(value: Option<&str>) -> ModelSpec {
    let raw = value.unwrap_or("").trim();
    let raw = if raw.is_empty() {
        format!("ens:{DEFAULT_ENSEMBLE_MODEL}")
    } else {
        raw.to_string()
    };

    let (prefix, rest) = match raw.split_once(':') {
        Some((p, r)) => {
            let p = p.trim().to_lowercase();
            if p == "ens" || p == "ensemble" {
                (Some(ModelKind::Ensemble), r.trim())
            } else if p == "det" || p == "deterministic" {
                (Some(ModelKind::Deterministic), r.trim())
            } else {
                (None, raw.as_str())
            }
        }
        None => (None, raw.as_str()),
    };

    let rest = if rest.is_empty() { DEFAULT_ENSEMBLE_MODEL } else { rest };

    let kind = prefix.unwrap_or_else(|| {
        if ModelCatalog::is_known_ensemble(rest) {
            ModelKind::Ensemble
        } else {
            ModelKind::Deterministic
        }
    });

    match kind {
        ModelKind::Ensemble => {
            let (model_id, entry) = match find(ENSEMBLE_MODELS, rest) {
                Some(e) => (rest.to_string(), e),
                None => {
                    let fallback = find(ENSEMBLE_MODELS, DEFAULT_ENSEMBLE_MODEL)
                        .expect("default ensemble model must be in the catalog");
                    (DEFAULT_ENSEMBLE_MODEL.to_string(), fallback)
                }
            };
            ModelSpec {
                reference: format!("ens:{model_id}"),
                kind: ModelKind::Ensemble,
                model_id: model_id.clone(),
                name: entry.name.to_string(),
                members: entry.members.max(1),
                provider: entry.provider.map(str::to_string),
                ack_url: entry.ack_url.map(str::to_string),
            }
        }
        ModelKind::Deterministic => {
            let model_id = rest.to_string();
            let entry = find(DETERMINISTIC_MODELS, &model_id);
            ModelSpec {
                reference: format!("det:{model_id}"),
                kind: ModelKind::Deterministic,
                model_id: model_id.clone(),
                name: entry.map(|e| e.name.to_string()).unwrap_or_else(|| model_id.clone()),
                members: 1,
                provider: entry.and_then(|e| e.provider.map(str::to_string)),
                ack_url: entry.and_then(|e| e.ack_url.map(str::to_string)),
            }
        }
    }
}
