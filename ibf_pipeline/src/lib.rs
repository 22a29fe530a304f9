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

//! wires the other `ibf_*` crates together into the runnable forecast
//! pipeline: resolves display names, gathers and formats each location and
//! area, drives the narrative and translation LLM calls, snapshots prompts,
//! renders the static site, and accounts for LLM cost along the way.

pub mod area;
pub mod context;
pub mod errors;
pub mod executor;
pub mod location;
pub mod location_data;
pub mod naming;
pub mod prompt;
pub mod skip;
pub mod snapshot;

pub use context::PipelineContext;
pub use errors::{op_failed, PipelineError, Result};
pub use executor::run;
pub use naming::compute_location_display_names;
