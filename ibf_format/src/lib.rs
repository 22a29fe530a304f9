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

//! turns a [`ibf_model::ProcessedDataset`] plus active alerts into the plain
//! text handed to the narrative LLM: per-day, per-member scenario blocks, a
//! RANGE SUMMARY for true ensembles, and the area-level wrapper that stitches
//! several locations' texts into one prompt.

pub mod alerts;
pub mod convert;
pub mod dataset;
pub mod numfmt;
pub mod precip;
pub mod range;
pub mod season;
pub mod wind;

pub use alerts::format_alerts;
pub use convert::{display_precipitation, display_snow_level, display_snowfall, display_temperature, display_wind, snow_level_unit_label, DisplayUnits};
pub use dataset::{format_area_dataset, format_location_dataset, LocationEntry};
pub use range::{calculate_range_summary, estimate_percentiles, jeffreys_probability, precipitation_exceedance_probability, precipitation_or_snowfall_likely};
pub use season::determine_current_season;
pub use wind::{format_wind, round_windspeed};
