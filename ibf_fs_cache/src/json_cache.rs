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

//! JSON cache reads that treat parse/schema failures as a miss (deleting the
//! offending file) rather than propagating the error, and writes that go
//! through the atomic-write + lock primitives.

use std::path::Path;
use std::time::{Duration, SystemTime};

use serde::{de::DeserializeOwned, Serialize};

use crate::atomic::{atomic_write, with_exclusive_lock};
use crate::errors::Result;

/// load a cached JSON value if `path` exists, is no older than `max_age`,
/// and parses. Any failure short of an unreadable directory structure is
/// treated as a miss: the file is deleted and `None` is returned so the
/// caller can refetch.
pub fn read_json_cache<T: DeserializeOwned>(path: &Path, max_age: Duration) -> Result<Option<T>> {
    if !path.is_file() {
        return Ok(None);
    }
    let is_stale = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => SystemTime::now().duration_since(modified).unwrap_or(Duration::ZERO) > max_age,
        Err(_) => true,
    };
    if is_stale {
        return Ok(None);
    }

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(_) => return Ok(None),
    };
    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "deleting corrupt cache entry");
            let _ = std::fs::remove_file(path);
            Ok(None)
        }
    }
}

/// serialize `value` and atomically write it to `path`, holding the per-file
/// advisory lock for the duration of the write.
pub fn write_json_cache<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| crate::errors::op_failed(e.to_string()))?;
    with_exclusive_lock(path, || atomic_write(path, &bytes))
}
