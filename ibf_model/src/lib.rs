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

//! shared data model: configuration records, the model catalog, geocode and
//! alert types, and the normalized dataset shape passed between every other
//! `ibf_*` crate. Plain immutable structs -- no parsing, no I/O.

pub mod catalog;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod geocode;

pub use catalog::{resolve_model_spec, ModelCatalog, ModelKind, ModelSpec, DEFAULT_ENSEMBLE_MODEL};
pub use config::{Area, AreaMode, ForecastConfig, Location, ReasoningLevel, UnitOverrides, UnitSystem, Wordiness};
pub use dataset::{Day, ForecastResponse, Hour, MemberRecord, ProcessedDataset, CANONICAL_MEMBER};
pub use errors::{op_failed, ModelError, Result};
pub use geocode::{AlertSummary, GeocodeResult};
