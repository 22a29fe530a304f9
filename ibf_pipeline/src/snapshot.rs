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

//! prompt snapshotting (§4.8 step 6): every system+user prompt pair is
//! written to `<cache_root>/prompts/<timestamp>_<kind>-<slug>.txt` before the
//! LLM call, then the directory is pruned to the retention policy.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::Result;

const KEEP_NEWEST: usize = 10;
const MAX_AGE: Duration = Duration::from_secs(3 * 24 * 3600);

pub fn snapshot_prompt(cache_root: &Path, slug: &str, kind: &str, system_prompt: &str, user_prompt: &str, now: DateTime<Utc>) -> Result<()> {
    let dir = cache_root.join("prompts");
    ibf_fs_cache::ensure_dir(&dir)?;

    let timestamp = now.format("%Y%m%dT%H%M%SZ");
    let path = dir.join(format!("{timestamp}_{kind}-{slug}.txt"));
    let contents = format!("SYSTEM:\n{system_prompt}\n\nUSER:\n{user_prompt}\n");
    ibf_fs_cache::atomic_write(&path, contents.as_bytes())?;

    ibf_fs_cache::prune_snapshots(&dir, KEEP_NEWEST, MAX_AGE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn writes_snapshot_with_expected_filename_shape() {
        let dir = std::env::temp_dir().join(format!("ibf_pipeline_snapshot_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let now = Utc.with_ymd_and_hms(2025, 1, 10, 8, 30, 0).unwrap();
        snapshot_prompt(&dir, "wellington", "location", "sys", "usr", now).unwrap();

        let expected = dir.join("prompts/20250110T083000Z_location-wellington.txt");
        let contents = std::fs::read_to_string(&expected).unwrap();
        assert!(contents.contains("SYSTEM:\nsys"));
        assert!(contents.contains("USER:\nusr"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn prunes_old_snapshots_beyond_the_retention_count() {
        let dir = std::env::temp_dir().join(format!("ibf_pipeline_snapshot_prune_test_{}", std::process::id()));
        let prompts_dir = dir.join("prompts");
        std::fs::create_dir_all(&prompts_dir).unwrap();

        let stale = std::time::SystemTime::now() - Duration::from_secs(4 * 24 * 3600);
        for i in 0..12 {
            let path = prompts_dir.join(format!("stale_{i}.txt"));
            std::fs::write(&path, b"old").unwrap();
            let file = std::fs::File::open(&path).unwrap();
            let _ = file.set_modified(stale);
        }

        snapshot_prompt(&dir, "wellington", "location", "sys", "usr", Utc::now()).unwrap();

        let remaining = std::fs::read_dir(&prompts_dir).unwrap().count();
        assert_eq!(remaining, KEEP_NEWEST);

        std::fs::remove_dir_all(&dir).ok();
    }
}
