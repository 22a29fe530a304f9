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

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("IO error {0}")]
    IOError(#[from] std::io::Error),

    #[error("http error {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("cache error {0}")]
    CacheError(#[from] ibf_fs_cache::FsCacheError),

    #[error("operation failed: {0}")]
    OpFailed(String),
}

pub fn op_failed(msg: impl ToString) -> GeocodeError {
    GeocodeError::OpFailed(msg.to_string())
}

pub type Result<T> = std::result::Result<T, GeocodeError>;
