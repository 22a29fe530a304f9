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

use thiserror::Error;

/// everything that can cause a single entity (location or area) to be
/// skipped. The executor never lets one of these abort the whole run --
/// see `ibf_pipeline::executor`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("cache error: {0}")]
    CacheError(#[from] ibf_fs_cache::FsCacheError),

    #[error("geocode error: {0}")]
    GeocodeError(#[from] ibf_geocode::GeocodeError),

    #[error("alerts error: {0}")]
    AlertsError(#[from] ibf_alerts::AlertsError),

    #[error("NWP error: {0}")]
    NwpError(#[from] ibf_nwp::NwpError),

    #[error("dataset error: {0}")]
    DatasetError(#[from] ibf_dataset::DatasetError),

    #[error("LLM error: {0}")]
    LlmError(#[from] ibf_llm::LlmError),

    #[error("render error: {0}")]
    RenderError(#[from] ibf_render::RenderError),

    #[error("no geocode result for '{0}'")]
    NoGeocodeResult(String),

    #[error("operation failed: {0}")]
    OpFailed(String),
}

pub fn op_failed(msg: impl ToString) -> PipelineError {
    PipelineError::OpFailed(msg.to_string())
}

pub type Result<T> = std::result::Result<T, PipelineError>;
