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

//! the filesystem cache primitives every other cache-backed component builds
//! on: atomic writes, advisory per-file locks, scoped safe unlink, and
//! schema-validated JSON reads that self-heal by deleting corrupt entries.
//! aged-file sweeping is `ibf_common::fs`; this crate only adds the
//! lock/atomicity/schema layer on top of it.

pub mod atomic;
pub mod errors;
pub mod json_cache;
pub mod unlink;

pub use atomic::{atomic_write, with_exclusive_lock};
pub use errors::{op_failed, FsCacheError, Result};
pub use json_cache::{read_json_cache, write_json_cache};
pub use unlink::safe_unlink;

pub use ibf_common::fs::{ensure_dir, prune_snapshots, remove_old_files};
