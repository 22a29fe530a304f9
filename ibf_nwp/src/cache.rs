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

//! cache-key derivation and path layout for forecast responses. The key
//! folds in everything that changes the wire response (coordinate, horizon,
//! model, field set) so stale requests never collide with fresh ones under
//! the same cache directory.

use std::path::{Path, PathBuf};

use ibf_model::ModelKind;
use sha2::{Digest, Sha256};

/// round to 2 decimal places and append a hemisphere suffix so `lat=-41.30`
/// and `lat=41.30` never collide after rounding.
fn round_coordinate(value: f64, positive_suffix: char, negative_suffix: char) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let suffix = if rounded < 0.0 { negative_suffix } else { positive_suffix };
    format!("{:.2}{}", rounded.abs(), suffix)
}

fn kind_token(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Ensemble => "ens",
        ModelKind::Deterministic => "det",
    }
}

/// first 8 hex characters of the sha-256 digest of the hourly field list,
/// standing in for the source's sha1 fingerprint (sha2 is the hashing crate
/// already carried for this purpose).
fn fields_fingerprint(hourly_fields: &str) -> String {
    let digest = Sha256::digest(hourly_fields.as_bytes());
    let hex = format!("{digest:x}");
    hex[..8].to_string()
}

pub fn cache_key(
    latitude: f64,
    longitude: f64,
    forecast_days: u32,
    kind: ModelKind,
    model_id: &str,
    hourly_fields: &str,
) -> String {
    let lat = round_coordinate(latitude, 'N', 'S');
    let lon = round_coordinate(longitude, 'E', 'W');
    let fingerprint = fields_fingerprint(hourly_fields);
    format!("{lat}_{lon}_{forecast_days}d_{}_{model_id}_{fingerprint}", kind_token(kind))
}

pub fn cache_path(cache_dir: &Path, key: &str) -> PathBuf {
    cache_dir.join(format!("{key}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_distinguishes_hemispheres() {
        let north = cache_key(41.3, 2.1, 7, ModelKind::Ensemble, "ecmwf_ifs025", "a,b");
        let south = cache_key(-41.3, 2.1, 7, ModelKind::Ensemble, "ecmwf_ifs025", "a,b");
        assert_ne!(north, south);
    }

    #[test]
    fn key_distinguishes_field_sets() {
        let a = cache_key(41.3, 2.1, 7, ModelKind::Deterministic, "ecmwf_ifs", "a,b");
        let b = cache_key(41.3, 2.1, 7, ModelKind::Deterministic, "ecmwf_ifs", "a,b,c");
        assert_ne!(a, b);
    }

    #[test]
    fn key_is_stable_for_identical_inputs() {
        let a = cache_key(41.305, 2.099, 7, ModelKind::Ensemble, "gfs025", "a,b");
        let b = cache_key(41.3049, 2.0951, 7, ModelKind::Ensemble, "gfs025", "a,b");
        assert_eq!(a, b);
    }
}
