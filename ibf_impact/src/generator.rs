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

//! web-search-grounded impact-context generation. Unlike the forecast
//! narrative dispatcher in `ibf_llm`, a missing credential or a provider
//! error here degrades to an empty context at zero cost rather than failing
//! the whole run -- impact context is an enrichment, not a required input.

use std::env;
use std::time::Duration;

use ibf_llm::{get_model_cost, log_usage_and_cost, normalize_gemini_usage, normalize_openai_usage};
use serde_json::{json, Value};

use crate::clean::{clean_context_text, standardize_context_headings};
use crate::prompt::{continuation_prompt, CONTEXT_SECTION_HEADINGS};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const GEMINI_API_ROOT: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_CONTINUATIONS: u32 = 2;
const TRUNCATION_FINISH_REASONS: &[&str] = &["MAX_TOKENS", "LENGTH", "TOKEN_LIMIT", "MAX_TOKEN"];

pub fn is_gemini_model(model: &str) -> bool {
    let lower = model.to_lowercase();
    lower.starts_with("gemini-") || lower.starts_with("google/gemini-")
}

pub fn normalize_gemini_model_name(model: &str) -> String {
    if model.to_lowercase().starts_with("google/") {
        model.splitn(2, '/').nth(1).unwrap_or(model).to_string()
    } else {
        model.to_string()
    }
}

/// dispatches on the model reference and returns the cleaned context text
/// plus the estimated USD cost in cents. Returns `("", 0.0)` on any missing
/// credential or provider failure.
pub async fn generate_context(http: &reqwest::Client, prompt: &str, context_llm: &str, cost_label: &str) -> (String, f64) {
    if is_gemini_model(context_llm) {
        let model = normalize_gemini_model_name(context_llm);
        match env::var("GEMINI_API_KEY") {
            Ok(key) => generate_context_gemini_search(http, prompt, &model, &key, cost_label).await,
            Err(_) => {
                tracing::warn!(%cost_label, "GEMINI_API_KEY not set; skipping impact context generation");
                (String::new(), 0.0)
            }
        }
    } else {
        match env::var("OPENAI_API_KEY") {
            Ok(key) => generate_context_openai_web_search(http, prompt, context_llm, &key, cost_label).await,
            Err(_) => {
                tracing::warn!(%cost_label, "OPENAI_API_KEY not set; skipping impact context generation");
                (String::new(), 0.0)
            }
        }
    }
}

async fn generate_context_openai_web_search(http: &reqwest::Client, prompt: &str, model: &str, api_key: &str, cost_label: &str) -> (String, f64) {
    let body = json!({
        "model": model,
        "input": prompt,
        "tools": [{"type": "web_search"}],
    });

    let response = http
        .post("https://api.openai.com/v1/responses")
        .bearer_auth(api_key)
        .timeout(REQUEST_TIMEOUT)
        .json(&body)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status);

    let payload = match response {
        Ok(resp) => match resp.json::<Value>().await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%cost_label, error = %err, "failed to parse web-search response; falling back");
                return generate_context_chat_completions(http, prompt, model, api_key, cost_label).await;
            }
        },
        Err(err) => {
            tracing::warn!(%cost_label, error = %err, model, "web-search context call failed; falling back to chat completions");
            return generate_context_chat_completions(http, prompt, model, api_key, cost_label).await;
        }
    };

    let usage = payload.get("usage").and_then(normalize_openai_usage);
    let cost_cents = log_usage_and_cost(cost_label, model, usage);
    let text = extract_response_text(&payload).unwrap_or_default();
    (clean_context_text(&text), cost_cents)
}

/// Responses API fallback used when the model or account doesn't support
/// the `web_search` tool: a plain chat-completions call with no grounding.
async fn generate_context_chat_completions(http: &reqwest::Client, prompt: &str, model: &str, api_key: &str, cost_label: &str) -> (String, f64) {
    let body = json!({
        "model": model,
        "messages": [{"role": "user", "content": prompt}],
        "temperature": 0.2,
        "max_tokens": 4_000,
    });

    let response = http.post("https://api.openai.com/v1/chat/completions").bearer_auth(api_key).timeout(REQUEST_TIMEOUT).json(&body).send().await;

    let payload = match response.and_then(reqwest::Response::error_for_status) {
        Ok(resp) => match resp.json::<Value>().await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%cost_label, error = %err, "chat-completions fallback returned unparseable body");
                return (String::new(), 0.0);
            }
        },
        Err(err) => {
            tracing::warn!(%cost_label, error = %err, "chat-completions fallback failed");
            return (String::new(), 0.0);
        }
    };

    let usage = payload.get("usage").and_then(normalize_openai_usage);
    let cost_cents = log_usage_and_cost(cost_label, model, usage);
    let text = payload
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or("");
    (clean_context_text(text), cost_cents)
}

/// pulls the generated text out of a Responses API payload, trying the
/// convenience `output_text` field some client libraries add before falling
/// back to walking the raw `output` array.
fn extract_response_text(payload: &Value) -> Option<String> {
    if let Some(text) = payload.get("output_text").and_then(Value::as_str) {
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    let output = payload.get("output").and_then(Value::as_array)?;
    let mut pieces = Vec::new();
    for item in output {
        let Some(content) = item.get("content").and_then(Value::as_array) else { continue };
        for part in content {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                pieces.push(text.to_string());
            }
        }
    }
    if pieces.is_empty() {
        None
    } else {
        Some(pieces.join(""))
    }
}

async fn generate_context_gemini_search(http: &reqwest::Client, prompt: &str, model: &str, api_key: &str, cost_label: &str) -> (String, f64) {
    let _guard = HiddenEnvVar::hide("GOOGLE_API_KEY");
    let url = format!("{GEMINI_API_ROOT}/models/{model}:generateContent?key={api_key}");

    let mut contents = vec![json!({"role": "user", "parts": [{"text": prompt}]})];
    let mut text = String::new();
    let mut cost_cents = 0.0;

    for attempt in 0..=MAX_CONTINUATIONS {
        let body = json!({
            "contents": contents,
            "tools": [{"google_search": {}}],
            "generationConfig": {"temperature": 0.2, "maxOutputTokens": 4_000},
        });

        let response = match http.post(&url).timeout(REQUEST_TIMEOUT).json(&body).send().await.and_then(reqwest::Response::error_for_status) {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(%cost_label, error = %err, model, "Gemini search-grounded context call failed");
                break;
            }
        };
        let payload: Value = match response.json().await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%cost_label, error = %err, "Gemini context response body unparseable");
                break;
            }
        };

        let usage = payload.get("usageMetadata").and_then(normalize_gemini_usage);
        cost_cents += log_usage_and_cost(cost_label, model, usage);

        let candidate = payload.get("candidates").and_then(Value::as_array).and_then(|c| c.first());
        let chunk = candidate
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
            .and_then(|p| p.first())
            .and_then(|p| p.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("");

        text = merge_context_chunks(&text, chunk);

        let finish_reason = candidate.and_then(|c| c.get("finishReason")).and_then(Value::as_str).unwrap_or("STOP");
        let canonical = standardize_context_headings(&text);
        let missing_heading = first_missing_heading(&canonical);
        let truncated = TRUNCATION_FINISH_REASONS.contains(&finish_reason) || looks_truncated(&text);

        let should_continue = missing_heading.is_some() || truncated;
        if attempt == MAX_CONTINUATIONS || !should_continue {
            break;
        }

        match missing_heading {
            Some(missing) => tracing::info!(%cost_label, attempt, missing, "impact context missing a heading; requesting continuation"),
            None => tracing::info!(%cost_label, attempt, "impact context looks truncated mid-sentence; requesting continuation"),
        }
        contents.push(json!({"role": "model", "parts": [{"text": chunk}]}));
        contents.push(json!({"role": "user", "parts": [{"text": continuation_prompt(missing_heading)}]}));
    }

    (clean_context_text(&text), cost_cents)
}

/// true once every required heading has appeared in the accumulated text.
fn is_complete(text: &str) -> bool {
    first_missing_heading(text).is_none()
}

/// first heading (in canonical order) not yet present in `text`, or `None`
/// once all four have appeared.
fn first_missing_heading(text: &str) -> Option<&'static str> {
    CONTEXT_SECTION_HEADINGS.iter().find(|heading| !text.contains(&format!("### {heading}"))).copied()
}

/// true when `text` ends on a word character with no terminal punctuation,
/// i.e. the model hit an internal stop mid-sentence rather than finishing
/// cleanly -- catches the case Gemini reports `finishReason: STOP` for even
/// though the output was cut off.
fn looks_truncated(text: &str) -> bool {
    match text.trim_end().chars().next_back() {
        Some(c) => c.is_alphanumeric(),
        None => false,
    }
}

/// appends `chunk` to `acc`, inserting a single space when the join point
/// would otherwise fuse two words together (the previous chunk ending and
/// the next one starting on a word character with no separating whitespace).
fn merge_context_chunks(acc: &str, chunk: &str) -> String {
    if acc.is_empty() {
        return chunk.to_string();
    }
    if chunk.is_empty() {
        return acc.to_string();
    }
    let needs_space = acc.chars().next_back().is_some_and(|c| c.is_alphanumeric()) && chunk.chars().next().is_some_and(|c| c.is_alphanumeric());
    if needs_space {
        format!("{acc} {chunk}")
    } else {
        format!("{acc}{chunk}")
    }
}

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

// silence an unused-function warning: `get_model_cost` is re-exported from
// `ibf_llm` purely for callers of this crate who want to estimate cost
// ahead of a call (see `ibf_pipeline`'s cost-preview path).
#[allow(dead_code)]
fn _uses_get_model_cost() -> Option<ibf_llm::ModelCost> {
    get_model_cost("gemini-3-flash-preview")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_gemini_models_with_and_without_alias() {
        assert!(is_gemini_model("gemini-3-flash-preview"));
        assert!(is_gemini_model("google/gemini-2.5-flash"));
        assert!(!is_gemini_model("gpt-4o-mini"));
    }

    #[test]
    fn strips_google_alias_prefix() {
        assert_eq!(normalize_gemini_model_name("google/gemini-2.5-flash"), "gemini-2.5-flash");
        assert_eq!(normalize_gemini_model_name("gemini-3-flash-preview"), "gemini-3-flash-preview");
    }

    #[test]
    fn missing_heading_detection_walks_in_order() {
        let partial = "### Existing Vulnerabilities\n- one\n\n### Weather Impact Thresholds\n- two";
        assert_eq!(first_missing_heading(partial), Some("Exposed Populations and Assets"));
    }

    #[test]
    fn complete_text_has_no_missing_heading() {
        let full = CONTEXT_SECTION_HEADINGS.iter().map(|h| format!("### {h}\n- item")).collect::<Vec<_>>().join("\n\n");
        assert!(is_complete(&full));
    }

    #[test]
    fn merge_inserts_space_only_at_word_boundaries() {
        assert_eq!(merge_context_chunks("...flood ris", "k remains high"), "...flood risk remains high");
        assert_eq!(merge_context_chunks("- bullet one\n", "- bullet two"), "- bullet one\n- bullet two");
    }

    #[test]
    fn merge_handles_empty_sides() {
        assert_eq!(merge_context_chunks("", "chunk"), "chunk");
        assert_eq!(merge_context_chunks("chunk", ""), "chunk");
    }

    #[test]
    fn detects_mid_sentence_cutoff() {
        assert!(looks_truncated("the river crested at 4 meters and flooded the low"));
        assert!(looks_truncated("a reading of 12"));
    }

    #[test]
    fn does_not_flag_sentences_ending_on_punctuation() {
        assert!(!looks_truncated("the river crested at 4 meters."));
        assert!(!looks_truncated("- a bullet point ending in a list)"));
        assert!(!looks_truncated(""));
    }
}
