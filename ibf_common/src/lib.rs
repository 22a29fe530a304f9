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

//! shared, dependency-light helpers used across every `ibf_*` crate: angle and
//! compass math, unit conversion, WMO weather codes, timezone/day labeling,
//! slug generation, and a small generic filesystem sweep.

pub mod angle;
pub mod datetime;
pub mod errors;
pub mod fs;
pub mod slug;
pub mod units;
pub mod wmo;

pub use errors::{op_failed, IbfCommonError, Result};
