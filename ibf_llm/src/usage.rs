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

//! token accounting shared by the OpenAI-compatible and Gemini call paths.

use serde_json::Value;

use crate::costs::get_model_cost;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub cached_prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// the Chat Completions and Responses APIs disagree on field names
/// (`prompt_tokens`/`completion_tokens` vs `input_tokens`/`output_tokens`);
/// try the newer shape first, then the legacy one.
pub fn normalize_openai_usage(usage: &Value) -> Option<Usage> {
    if let Some(input) = usage.get("input_tokens").and_then(Value::as_u64) {
        let cached = usage
            .get("input_tokens_details")
            .and_then(|d| d.get("cached_tokens"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let output = usage.get("output_tokens").and_then(Value::as_u64).unwrap_or(0);
        let total = usage.get("total_tokens").and_then(Value::as_u64).unwrap_or(input + output);
        return Some(Usage { prompt_tokens: input, cached_prompt_tokens: cached, completion_tokens: output, total_tokens: total });
    }

    let prompt = usage.get("prompt_tokens").and_then(Value::as_u64)?;
    let cached = usage
        .get("prompt_tokens_details")
        .and_then(|d| d.get("cached_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let completion = usage.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0);
    let total = usage.get("total_tokens").and_then(Value::as_u64).unwrap_or(prompt + completion);
    Some(Usage { prompt_tokens: prompt, cached_prompt_tokens: cached, completion_tokens: completion, total_tokens: total })
}

/// Gemini's `usageMetadata` never reports a cached-token split.
pub fn normalize_gemini_usage(usage_metadata: &Value) -> Option<Usage> {
    let prompt = usage_metadata.get("promptTokenCount").and_then(Value::as_u64)?;
    let completion = usage_metadata.get("candidatesTokenCount").and_then(Value::as_u64).unwrap_or(0);
    let total = usage_metadata.get("totalTokenCount").and_then(Value::as_u64).unwrap_or(prompt + completion);
    Some(Usage { prompt_tokens: prompt, cached_prompt_tokens: 0, completion_tokens: completion, total_tokens: total })
}

/// logs a single structured usage line and returns the estimated cost in USD
/// cents (0.0 if the model has no pricing entry or usage was absent).
pub fn log_usage_and_cost(label: &str, model_name: &str, usage: Option<Usage>) -> f64 {
    let Some(usage) = usage else {
        tracing::info!(%label, model = model_name, "LLM usage unavailable");
        return 0.0;
    };

    let cost_cents = get_model_cost(model_name)
        .map(|cost| cost.cost_for_usage(usage.prompt_tokens, usage.completion_tokens, usage.cached_prompt_tokens) * 100.0)
        .unwrap_or(0.0);

    tracing::info!(
        %label,
        model = model_name,
        prompt_tokens = usage.prompt_tokens,
        cached_prompt_tokens = usage.cached_prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        cost_usd_cents = format!("{cost_cents:.2}"),
        "LLM usage"
    );
    cost_cents
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_legacy_chat_completions_usage() {
        let usage = json!({"prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150, "prompt_tokens_details": {"cached_tokens": 20}});
        let normalized = normalize_openai_usage(&usage).unwrap();
        assert_eq!(normalized, Usage { prompt_tokens: 100, cached_prompt_tokens: 20, completion_tokens: 50, total_tokens: 150 });
    }

    #[test]
    fn normalizes_responses_api_usage() {
        let usage = json!({"input_tokens": 200, "output_tokens": 10, "input_tokens_details": {"cached_tokens": 0}});
        let normalized = normalize_openai_usage(&usage).unwrap();
        assert_eq!(normalized.prompt_tokens, 200);
        assert_eq!(normalized.total_tokens, 210);
    }

    #[test]
    fn normalizes_gemini_usage_metadata() {
        let usage = json!({"promptTokenCount": 80, "candidatesTokenCount": 40, "totalTokenCount": 120});
        let normalized = normalize_gemini_usage(&usage).unwrap();
        assert_eq!(normalized.completion_tokens, 40);
        assert_eq!(normalized.cached_prompt_tokens, 0);
    }

    #[test]
    fn cost_is_zero_for_unpriced_model() {
        let usage = Usage { prompt_tokens: 10, cached_prompt_tokens: 0, completion_tokens: 10, total_tokens: 20 };
        assert_eq!(log_usage_and_cost("test", "no-such-model", Some(usage)), 0.0);
    }
}
