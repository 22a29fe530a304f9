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

//! thin `reqwest` wrappers around the OpenAI-compatible Chat Completions API
//! and Gemini's `generateContent` REST endpoint. No vendor SDK is linked;
//! both providers are plain typed HTTP calls, same as every other external
//! service this workspace talks to.

use std::env;
use std::time::Duration;

use ibf_model::config::ReasoningLevel;
use serde_json::{json, Value};

use crate::clean::clean_llm_output;
use crate::errors::{LlmError, Result};
use crate::settings::{supports_reasoning, LlmSettings, Provider};
use crate::usage::{log_usage_and_cost, normalize_gemini_usage, normalize_openai_usage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const GEMINI_API_ROOT: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_GEMINI_CONTINUATIONS: u32 = 2;

/// finish-reason variants Gemini uses to report the response was cut off by
/// the output-token budget rather than a natural stop.
const TRUNCATION_FINISH_REASONS: &[&str] = &["MAX_TOKENS", "LENGTH", "TOKEN_LIMIT", "MAX_TOKEN"];

pub struct LlmClient {
    http: reqwest::Client,
}

/// outcome of a single [`LlmClient::generate_forecast_text`] call: the
/// cleaned narrative plus the estimated USD cents spent producing it.
pub struct LlmOutput {
    pub text: String,
    pub cost_cents: f64,
}

impl LlmClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn generate_forecast_text(
        &self,
        prompt: &str,
        system_prompt: &str,
        settings: &LlmSettings,
        reasoning: ReasoningLevel,
        reasoning_max_output_tokens: Option<u32>,
        cost_label: &str,
    ) -> Result<LlmOutput> {
        match settings.provider {
            Provider::Gemini => self.call_gemini(prompt, system_prompt, settings, cost_label).await,
            Provider::OpenAi | Provider::OpenRouter => {
                self.call_openai_compatible(prompt, system_prompt, settings, reasoning, reasoning_max_output_tokens, cost_label).await
            }
        }
    }

    async fn call_openai_compatible(
        &self,
        prompt: &str,
        system_prompt: &str,
        settings: &LlmSettings,
        reasoning: ReasoningLevel,
        reasoning_max_output_tokens: Option<u32>,
        cost_label: &str,
    ) -> Result<LlmOutput> {
        let base_url = settings.base_url.as_deref().unwrap_or("https://api.openai.com/v1");
        let mut body = json!({
            "model": settings.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": prompt},
            ],
            "temperature": settings.temperature,
            "max_tokens": settings.max_tokens,
            "stream": false,
        });

        if reasoning != ReasoningLevel::Off && supports_reasoning(&settings.model) {
            let effort = match reasoning {
                ReasoningLevel::Low => "low",
                ReasoningLevel::Medium => "medium",
                ReasoningLevel::High => "high",
                ReasoningLevel::Auto => "auto",
                ReasoningLevel::Off => unreachable!(),
            };
            let mut reasoning_body = json!({"effort": effort});
            if let Some(max_tokens) = reasoning_max_output_tokens {
                body["max_output_tokens"] = json!(max_tokens);
                reasoning_body = json!({"effort": effort, "max_output_tokens": max_tokens});
            }
            body["reasoning"] = reasoning_body;
        }

        let response = self
            .http
            .post(format!("{base_url}/chat/completions"))
            .bearer_auth(&settings.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let usage = response.get("usage").and_then(normalize_openai_usage);
        let cost_cents = log_usage_and_cost(cost_label, &settings.model, usage);

        let choice = response.get("choices").and_then(|c| c.as_array()).and_then(|c| c.first());
        let message = choice.and_then(|c| c.get("message"));
        let mut raw_text = message.and_then(|m| m.get("content")).and_then(coerce_message_content).unwrap_or_default();

        if raw_text.trim().is_empty() {
            tracing::warn!(model = %settings.model, "LLM empty content payload");
            if let Some(reasoning_text) = message.and_then(|m| m.get("reasoning")).and_then(|r| r.get("content")).and_then(coerce_message_content) {
                tracing::warn!(model = %settings.model, "using reasoning content as fallback output");
                raw_text = reasoning_text;
            }
        }

        let cleaned = clean_llm_output(&raw_text);
        let text = if cleaned.is_empty() && !raw_text.is_empty() {
            tracing::warn!(model = %settings.model, "cleaned LLM output was empty; returning raw text");
            raw_text.trim().to_string()
        } else {
            cleaned
        };

        if text.is_empty() {
            let finish_reason = choice.and_then(|c| c.get("finish_reason")).and_then(Value::as_str).unwrap_or("unknown");
            tracing::warn!(model = %settings.model, finish_reason, "LLM response contained no usable text");
        }

        Ok(LlmOutput { text, cost_cents })
    }

    async fn call_gemini(&self, prompt: &str, system_prompt: &str, settings: &LlmSettings, cost_label: &str) -> Result<LlmOutput> {
        let _guard = HiddenEnvVar::hide("GOOGLE_API_KEY");

        let url = format!("{GEMINI_API_ROOT}/models/{}:generateContent?key={}", settings.model, settings.api_key);

        let mut contents = vec![json!({"role": "user", "parts": [{"text": prompt}]})];
        let mut text = String::new();
        let mut cost_cents = 0.0;

        for attempt in 0..=MAX_GEMINI_CONTINUATIONS {
            let body = json!({
                "contents": contents,
                "systemInstruction": {"parts": [{"text": system_prompt}]},
                "generationConfig": {
                    "temperature": settings.temperature,
                    "maxOutputTokens": settings.max_tokens,
                },
            });

            let response = self.http.post(&url).timeout(REQUEST_TIMEOUT).json(&body).send().await?.error_for_status()?.json::<Value>().await?;

            let usage = response.get("usageMetadata").and_then(normalize_gemini_usage);
            cost_cents += log_usage_and_cost(cost_label, &settings.model, usage);

            let candidate = response.get("candidates").and_then(|c| c.as_array()).and_then(|c| c.first());
            let chunk = candidate
                .and_then(|c| c.get("content"))
                .and_then(|c| c.get("parts"))
                .and_then(|p| p.as_array())
                .and_then(|p| p.first())
                .and_then(|p| p.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("");

            if chunk.is_empty() && text.is_empty() {
                return Err(LlmError::EmptyResponse(format!("{:?}", response.get("promptFeedback"))));
            }
            text.push_str(chunk);

            let finish_reason = candidate.and_then(|c| c.get("finishReason")).and_then(Value::as_str).unwrap_or("STOP");
            if attempt == MAX_GEMINI_CONTINUATIONS || !TRUNCATION_FINISH_REASONS.contains(&finish_reason) {
                break;
            }

            tracing::info!(model = %settings.model, attempt, "Gemini response truncated; requesting continuation");
            contents.push(json!({"role": "model", "parts": [{"text": chunk}]}));
            contents.push(json!({"role": "user", "parts": [{"text": "Continue the previous answer from exactly where it left off. Do not repeat any earlier text."}]}));
        }

        Ok(LlmOutput { text: clean_llm_output(&text), cost_cents })
    }
}

/// normalizes the various content payloads OpenAI-compatible endpoints
/// return: plain strings, structured content-part arrays, or nested `.text`.
fn coerce_message_content(content: &Value) -> Option<String> {
    match content {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string).or_else(|| item.get("text").and_then(Value::as_str).map(str::to_string)))
                .collect();
            if parts.is_empty() { None } else { Some(parts.join("\n")) }
        }
        _ => None,
    }
}

/// temporarily removes an environment variable for the duration of a call,
/// restoring it afterward. Guards against the Gemini SDK's historical habit
/// of picking up `GOOGLE_API_KEY` ambiently and colliding with a
/// Google-Maps key set under the same name.
struct HiddenEnvVar {
    name: &'static str,
    previous: Option<String>,
}

impl HiddenEnvVar {
    fn hide(name: &'static str) -> Self {
        let previous = env::var(name).ok();
        if previous.is_some() {
            unsafe { env::remove_var(name) };
        }
        Self { name, previous }
    }
}

impl Drop for HiddenEnvVar {
    fn drop(&mut self) {
        if let Some(value) = &self.previous {
            unsafe { env::set_var(self.name, value) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_plain_string_content() {
        assert_eq!(coerce_message_content(&json!("hello")), Some("hello".to_string()));
    }

    #[test]
    fn coerces_structured_content_parts() {
        let content = json!([{"type": "text", "text": "part one"}, {"type": "text", "text": "part two"}]);
        assert_eq!(coerce_message_content(&content), Some("part one\npart two".to_string()));
    }

    #[test]
    fn empty_string_content_is_none() {
        assert_eq!(coerce_message_content(&json!("")), None);
    }

    #[test]
    fn hidden_env_var_restores_previous_value() {
        unsafe { env::set_var("IBF_TEST_HIDDEN_VAR", "original") };
        {
            let _guard = HiddenEnvVar::hide("IBF_TEST_HIDDEN_VAR");
            assert!(env::var("IBF_TEST_HIDDEN_VAR").is_err());
        }
        assert_eq!(env::var("IBF_TEST_HIDDEN_VAR").unwrap(), "original");
        unsafe { env::remove_var("IBF_TEST_HIDDEN_VAR") };
    }

    #[test]
    fn truncation_reasons_are_recognized() {
        assert!(TRUNCATION_FINISH_REASONS.contains(&"MAX_TOKENS"));
        assert!(!TRUNCATION_FINISH_REASONS.contains(&"STOP"));
    }
}
