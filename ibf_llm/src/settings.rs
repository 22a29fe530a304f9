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

//! resolves a model reference string (e.g. `"gemini-3-flash-preview"`,
//! `"or:deepseek/deepseek-v3.2"`) plus environment credentials into a fully
//! specified [`LlmSettings`].

use std::env;

use crate::errors::{LlmError, Result};

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    OpenRouter,
    Gemini,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub api_key: String,
    pub provider: Provider,
    pub base_url: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// `override_choice` wins over a config-level `llm` field, which wins over
/// `IBF_DEFAULT_LLM`, which falls back to [`DEFAULT_MODEL`].
pub fn resolve_llm_settings(override_choice: Option<&str>, config_llm: Option<&str>) -> Result<LlmSettings> {
    let base_choice = override_choice
        .or(config_llm)
        .map(str::to_string)
        .or_else(|| env::var("IBF_DEFAULT_LLM").ok())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let choice = base_choice.trim().to_string();
    let lower = choice.to_lowercase();

    if lower.starts_with("gemini-") || lower.starts_with("google/gemini-") {
        let model = if lower.starts_with("google/gemini-") {
            choice.splitn(2, '/').nth(1).unwrap_or(&choice).to_string()
        } else {
            choice.clone()
        };
        return Ok(LlmSettings {
            model,
            api_key: require_env("GEMINI_API_KEY")?,
            provider: Provider::Gemini,
            base_url: None,
            temperature: 0.2,
            max_tokens: 10_000,
        });
    }

    if lower == "gpt-4o-mini" {
        return Ok(LlmSettings {
            model: "gpt-4o-mini".to_string(),
            api_key: require_env("OPENAI_API_KEY")?,
            provider: Provider::OpenAi,
            base_url: None,
            temperature: 0.2,
            max_tokens: 6_000,
        });
    }

    if lower.starts_with("or:") {
        let model = choice[3..].to_string();
        return Ok(LlmSettings {
            model,
            api_key: require_env("OPENROUTER_API_KEY")?,
            provider: Provider::OpenRouter,
            base_url: Some("https://openrouter.ai/api/v1".to_string()),
            temperature: 0.2,
            max_tokens: 8_000,
        });
    }

    if lower == "gpt-4o-latest" {
        return Ok(LlmSettings {
            model: "gpt-4o-latest".to_string(),
            api_key: require_env("OPENAI_API_KEY")?,
            provider: Provider::OpenAi,
            base_url: None,
            temperature: 0.2,
            max_tokens: 8_000,
        });
    }

    let looks_like_reasoning_id = lower.starts_with('o')
        && lower.len() > 1
        && lower.as_bytes()[1].is_ascii_digit();
    if lower.starts_with("gpt-") || looks_like_reasoning_id {
        return Ok(LlmSettings {
            model: choice,
            api_key: require_env("OPENAI_API_KEY")?,
            provider: Provider::OpenAi,
            base_url: None,
            temperature: 0.2,
            max_tokens: 8_000,
        });
    }

    Err(LlmError::UnknownModel(choice))
}

/// models whose reasoning effort can be tuned via an `extra_body` parameter.
/// Matched by substring per §4.7 rather than an exact model list, since
/// OpenAI ships dated suffixes (`o1-preview`, `gpt-5-mini`, ...).
pub fn supports_reasoning(model: &str) -> bool {
    const REASONING_MARKERS: &[&str] = &["o1", "o3", "o4", "gpt-4.1", "gpt-5"];
    let lower = model.to_lowercase();
    REASONING_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn require_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| LlmError::MissingEnvVar(name.to_string()))
}
