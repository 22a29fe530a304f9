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

//! atomic write (sibling temp file + fsync + rename) and a per-file advisory
//! lock sidecar for caches shared across entities (and, in principle, across
//! processes).

use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::errors::Result;

/// write `data` to `path` without ever exposing a partial file: write to a
/// sibling `NamedTempFile` in the same directory, fsync it, then rename into
/// place. A crash between the two steps leaves either the old file or
/// nothing at `path`, never a half-written one.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// acquire an exclusive advisory lock on `<path>.lock` for the duration of
/// `f`, then run `f`. Readers that don't modify the file may skip locking
/// entirely, per the read-modify-write contract this guards.
pub fn with_exclusive_lock<T>(path: &Path, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let lock_path = lock_sidecar_path(path);
    if let Some(dir) = lock_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)?;
    lock_file.lock_exclusive()?;
    let result = f();
    let _ = FileExt::unlock(&lock_file);
    result
}

fn lock_sidecar_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempdir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ibf_fs_cache_atomic_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn write_then_read_back() {
        let dir = tempdir();
        let path = dir.join("cache.json");
        atomic_write(&path, b"{\"a\":1}").unwrap();
        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents, b"{\"a\":1}");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn lock_allows_reentry_after_release() {
        let dir = tempdir();
        let path = dir.join("locked.json");
        with_exclusive_lock(&path, || Ok(())).unwrap();
        with_exclusive_lock(&path, || Ok(())).unwrap();
        std::fs::remove_dir_all(&dir).ok();
    }
}
