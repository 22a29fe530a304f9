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

//! small filesystem helpers shared by every cache-backed component. The
//! atomic-write/lock/safe-unlink primitives that are themselves a spec'd
//! subsystem live in `ibf_fs_cache`; this module only holds the generic aged
//! file sweep every one of those caches wants (NWP's 48h sweep, impact
//! context's 3-day purge, prompt snapshot retention).

use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::errors::Result;

/// delete every regular file directly under `dir` whose modification time is
/// older than `max_age`. Best-effort: unreadable entries are skipped rather
/// than aborting the sweep.
pub fn remove_old_files(dir: &Path, max_age: Duration) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let now = SystemTime::now();
    let mut removed = 0usize;
    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        let Ok(modified) = meta.modified() else { continue };
        let Ok(age) = now.duration_since(modified) else { continue };
        if age > max_age && std::fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

/// keep the `keep_newest` most recently modified files and delete anything
/// else older than `max_age`, both conditions applied together (retain-N
/// first, then age -- the stricter reading of the two competing rules).
pub fn prune_snapshots(dir: &Path, keep_newest: usize, max_age: Duration) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let now = SystemTime::now();
    let mut files: Vec<(std::path::PathBuf, SystemTime)> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.metadata().ok().and_then(|m| m.modified().ok()).map(|mt| (e.path(), mt)))
        .collect();
    files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0usize;
    for (path, modified) in files.into_iter().skip(keep_newest) {
        let Ok(age) = now.duration_since(modified) else { continue };
        if age > max_age && std::fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweeps_old_files() {
        let dir = tempdir();
        let old = dir.join("old.json");
        std::fs::write(&old, b"{}").unwrap();
        filetime_set_past(&old);
        let removed = remove_old_files(&dir, Duration::from_secs(1)).unwrap();
        assert_eq!(removed, 1);
        assert!(!old.exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    fn tempdir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ibf_common_fs_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn filetime_set_past(path: &Path) {
        // back-date by touching mtime far enough in the past for the 1s sweep threshold
        let past = SystemTime::now() - Duration::from_secs(3600);
        let file = std::fs::File::open(path).unwrap();
        let _ = file.set_modified(past);
    }
}
