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

//! the two permanent (non-TTL) lookup tables this crate maintains: resolved
//! place names keyed by normalized query, and resolved ISO country codes
//! keyed by a rounded coordinate pair. Unlike the NWP/impact caches these
//! never expire on their own -- a geocoded name or a country for a
//! coordinate doesn't change -- they are only ever invalidated by schema
//! corruption.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ibf_fs_cache::{atomic_write, safe_unlink, with_exclusive_lock};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub country_code: Option<String>,
    pub altitude: Option<f64>,
}

pub fn search_cache_path(cache_root: &Path) -> PathBuf {
    cache_root.join("geocode").join("search_cache.json")
}

pub fn country_cache_path(cache_root: &Path) -> PathBuf {
    cache_root.join("geocode").join("country_cache.json")
}

/// read a whole cache map, self-healing on parse or schema failure by
/// deleting the file and returning an empty map.
fn read_map<V: for<'de> Deserialize<'de>>(path: &Path) -> BTreeMap<String, V> {
    if !path.is_file() {
        return BTreeMap::new();
    }
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(_) => return BTreeMap::new(),
    };
    match serde_json::from_slice::<BTreeMap<String, V>>(&bytes) {
        Ok(map) => map,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "deleting corrupt geocode cache");
            if let Some(base) = path.parent() {
                let _ = safe_unlink(path, base, false);
            }
            BTreeMap::new()
        }
    }
}

fn write_map<V: Serialize>(path: &Path, map: &BTreeMap<String, V>) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(map).map_err(|e| crate::errors::op_failed(e.to_string()))?;
    with_exclusive_lock(path, || atomic_write(path, &bytes))?;
    Ok(())
}

pub fn read_search_cache(path: &Path) -> BTreeMap<String, CacheEntry> {
    read_map(path)
}

pub fn write_search_cache(path: &Path, map: &BTreeMap<String, CacheEntry>) -> Result<()> {
    write_map(path, map)
}

pub fn read_country_cache(path: &Path) -> BTreeMap<String, String> {
    read_map(path)
}

pub fn write_country_cache(path: &Path, map: &BTreeMap<String, String>) -> Result<()> {
    write_map(path, map)
}

pub fn normalize_query(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn coordinate_cache_key(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.4},{longitude:.4}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ibf_geocode_cache_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn round_trips_search_cache() {
        let dir = tempdir();
        let path = dir.join("search_cache.json");
        let mut map = BTreeMap::new();
        map.insert(
            normalize_query("Test City"),
            CacheEntry {
                name: "Test City".into(),
                latitude: 1.0,
                longitude: 2.0,
                timezone: "UTC".into(),
                country_code: None,
                altitude: None,
            },
        );
        write_search_cache(&path, &map).unwrap();
        let loaded = read_search_cache(&path);
        assert_eq!(loaded.get("test city").unwrap().latitude, 1.0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_cache_reads_as_empty_and_is_deleted() {
        let dir = tempdir();
        let path = dir.join("search_cache.json");
        std::fs::write(&path, b"not json").unwrap();
        let loaded: BTreeMap<String, CacheEntry> = read_search_cache(&path);
        assert!(loaded.is_empty());
        assert!(!path.exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
