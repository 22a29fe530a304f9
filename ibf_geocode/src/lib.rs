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

//! place-name geocoding and reverse country-code lookup, backed by a
//! permanent on-disk cache (schema-validated, self-healing on corruption).

pub mod cache;
pub mod client;
pub mod errors;

pub use cache::{coordinate_cache_key, country_cache_path, normalize_query, search_cache_path, CacheEntry};
pub use client::GeocodeClient;
pub use errors::{op_failed, GeocodeError, Result};
