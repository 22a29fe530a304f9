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

//! provider-routed LLM dispatcher: resolves a model reference string to
//! credentials, calls Gemini or an OpenAI-compatible endpoint over plain
//! `reqwest`, cleans "thinking" artifacts out of the response, and tracks
//! estimated USD cost per entity.

pub mod clean;
pub mod client;
pub mod cost_ledger;
pub mod costs;
pub mod errors;
pub mod settings;
pub mod usage;

pub use clean::clean_llm_output;
pub use client::{LlmClient, LlmOutput};
pub use cost_ledger::{CostKind, CostLedger, EntityCost};
pub use costs::{get_model_cost, ModelCost};
pub use errors::{op_failed, LlmError, Result};
pub use settings::{resolve_llm_settings, supports_reasoning, LlmSettings, Provider};
pub use usage::{log_usage_and_cost, normalize_gemini_usage, normalize_openai_usage, Usage};
