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

//! turns a raw NWP response into the normalized [`ibf_model::ProcessedDataset`]
//! the rest of the pipeline operates on: member detection, unit normalization,
//! local-day grouping and labeling, and (optionally) snow-level diagnostics.

pub mod errors;
pub mod snow;
pub mod transform;

pub use errors::{op_failed, DatasetError, Result};
pub use snow::{
    compute_hourly_snow_level_from_profile, estimate_snow_level_from_freezing_level, estimate_snow_level_from_profile,
    rh_from_t_td, should_check_snow_level, wet_bulb_dj, PressureProfile,
};
pub use transform::{transform, TransformOptions};
