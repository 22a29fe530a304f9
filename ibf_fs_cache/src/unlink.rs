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

use std::path::Path;

use crate::errors::{FsCacheError, Result};

/// delete `path`, refusing if it does not resolve to somewhere under
/// `base_dir`. `dry_run` logs the would-be deletion without touching the
/// filesystem.
pub fn safe_unlink(path: &Path, base_dir: &Path, dry_run: bool) -> Result<bool> {
    let canonical_base = base_dir.canonicalize().unwrap_or_else(|_| base_dir.to_path_buf());
    let candidate = path.parent().unwrap_or(Path::new("."));
    let canonical_parent = candidate.canonicalize().unwrap_or_else(|_| candidate.to_path_buf());

    if !canonical_parent.starts_with(&canonical_base) {
        return Err(FsCacheError::PathEscapesBase(path.to_path_buf(), base_dir.to_path_buf()));
    }

    if dry_run {
        tracing::info!(path = %path.display(), "safe_unlink (dry run)");
        return Ok(false);
    }

    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempdir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ibf_fs_cache_unlink_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn refuses_path_outside_base() {
        let dir = tempdir();
        let outside = std::env::temp_dir().join("outside_ibf_test.json");
        std::fs::write(&outside, b"{}").unwrap();
        let result = safe_unlink(&outside, &dir, false);
        assert!(result.is_err());
        std::fs::remove_file(&outside).ok();
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn deletes_path_inside_base() {
        let dir = tempdir();
        let inside = dir.join("inside.json");
        std::fs::write(&inside, b"{}").unwrap();
        let deleted = safe_unlink(&inside, &dir, false).unwrap();
        assert!(deleted);
        assert!(!inside.exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn dry_run_keeps_file() {
        let dir = tempdir();
        let inside = dir.join("kept.json");
        std::fs::write(&inside, b"{}").unwrap();
        let deleted = safe_unlink(&inside, &dir, true).unwrap();
        assert!(!deleted);
        assert!(inside.exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
