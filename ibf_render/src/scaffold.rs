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

//! site scaffolding: the favicon and placeholder pages a fresh `web_root`
//! needs before the first real run, plus `.ibf_maps_hash`, the small
//! fingerprint file an area's map-rendering step (out of scope here, see
//! §4.9 Non-goals) uses to skip recomputing a region's boundary when its
//! member set hasn't changed since the last run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::Result;
use crate::html::{render_placeholder_page, FAVICON_SVG};

const MAPS_HASH_FILE: &str = ".ibf_maps_hash";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MapsHashState {
    #[serde(default)]
    pub config_hash: String,
    #[serde(default)]
    pub areas: BTreeMap<String, String>,
}

/// writes `favicon.svg` and a placeholder `index.html` for `slug` under
/// `web_root` if they don't already exist. Never overwrites a page a prior
/// run already rendered.
pub fn ensure_site_scaffold(web_root: &Path, slug: &str, display_name: &str) -> Result<()> {
    ibf_fs_cache::ensure_dir(web_root)?;

    let favicon_path = web_root.join("favicon.svg");
    if !favicon_path.is_file() {
        ibf_fs_cache::atomic_write(&favicon_path, FAVICON_SVG.as_bytes())?;
    }

    let page_dir = web_root.join(slug);
    ibf_fs_cache::ensure_dir(&page_dir)?;
    let page_path = page_dir.join("index.html");
    if !page_path.is_file() {
        let placeholder = render_placeholder_page(display_name);
        ibf_fs_cache::atomic_write(&page_path, placeholder.as_bytes())?;
    }

    Ok(())
}

fn maps_hash_path(web_root: &Path) -> PathBuf {
    web_root.join(MAPS_HASH_FILE)
}

pub fn load_maps_hash_state(web_root: &Path) -> MapsHashState {
    let path = maps_hash_path(web_root);
    match ibf_fs_cache::read_json_cache::<MapsHashState>(&path, std::time::Duration::from_secs(u64::MAX)) {
        Ok(Some(state)) => state,
        _ => MapsHashState::default(),
    }
}

pub fn store_maps_hash_state(web_root: &Path, state: &MapsHashState) -> Result<()> {
    Ok(ibf_fs_cache::write_json_cache(&maps_hash_path(web_root), state)?)
}

/// sha256 hex digest of an area's name and its sorted member names, used to
/// detect when an area's boundary needs recomputing between runs.
pub fn compute_area_hash(name: &str, members: &[String]) -> String {
    let mut sorted: Vec<&str> = members.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    for member in sorted {
        hasher.update(b"\0");
        hasher.update(member.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// records (or refreshes) `name`'s hash in `.ibf_maps_hash`, returning
/// whether the area's member set changed since the last recorded hash.
pub fn record_area_hash(web_root: &Path, slug: &str, name: &str, members: &[String]) -> Result<bool> {
    let mut state = load_maps_hash_state(web_root);
    let new_hash = compute_area_hash(name, members);
    let changed = state.areas.get(slug).map(|existing| existing != &new_hash).unwrap_or(true);
    state.areas.insert(slug.to_string(), new_hash);
    store_maps_hash_state(web_root, &state)?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempdir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ibf_render_scaffold_test_{label}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn scaffold_writes_favicon_and_placeholder_once() {
        let dir = tempdir("scaffold");
        ensure_site_scaffold(&dir, "sample-area", "Sample Area").unwrap();
        assert!(dir.join("favicon.svg").is_file());
        let page = std::fs::read_to_string(dir.join("sample-area/index.html")).unwrap();
        assert!(crate::html::is_placeholder_page(&page));

        std::fs::write(dir.join("sample-area/index.html"), "already rendered").unwrap();
        ensure_site_scaffold(&dir, "sample-area", "Sample Area").unwrap();
        let page = std::fs::read_to_string(dir.join("sample-area/index.html")).unwrap();
        assert_eq!(page, "already rendered");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn area_hash_is_order_independent_and_changes_with_members() {
        let a = compute_area_hash("Sample Area", &["alpha".into(), "beta".into()]);
        let b = compute_area_hash("Sample Area", &["beta".into(), "alpha".into()]);
        assert_eq!(a, b);

        let c = compute_area_hash("Sample Area", &["alpha".into(), "beta".into(), "gamma".into()]);
        assert_ne!(a, c);
    }

    #[test]
    fn record_area_hash_detects_membership_change() {
        let dir = tempdir("maps_hash");
        let members = vec!["alpha".to_string(), "beta".to_string()];
        let first = record_area_hash(&dir, "sample-area", "Sample Area", &members).unwrap();
        assert!(first, "first recording is always a change");

        let second = record_area_hash(&dir, "sample-area", "Sample Area", &members).unwrap();
        assert!(!second);

        let grown = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        let third = record_area_hash(&dir, "sample-area", "Sample Area", &grown).unwrap();
        assert!(third);

        std::fs::remove_dir_all(&dir).ok();
    }
}
