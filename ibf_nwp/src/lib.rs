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

//! Open-Meteo ensemble/forecast client with a TTL'd, schema-validated cache.

pub mod cache;
pub mod client;
pub mod errors;
pub mod fields;

pub use cache::{cache_key, cache_path};
pub use client::{NwpClient, NwpRequest};
pub use errors::{op_failed, NwpError, Result};
pub use fields::{hourly_fields_for, pressure_profile_fields, PRESSURE_LEVELS_SNOW_HPA};
