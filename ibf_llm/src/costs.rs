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

//! per-model USD pricing table. Edit [`MODEL_COSTS`] directly to add a model;
//! an optional `llm_costs.json` sitting next to the process working
//! directory overrides/extends it without a rebuild.

use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelCost {
    pub input_per_million: f64,
    pub cached_input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelCost {
    /// USD cost of a single call. `cached_input_tokens` is a subset of
    /// `input_tokens`, billed at the cached rate instead of the standard one.
    pub fn cost_for_usage(&self, input_tokens: u64, output_tokens: u64, cached_input_tokens: u64) -> f64 {
        let standard_input = input_tokens.saturating_sub(cached_input_tokens);
        (standard_input as f64 / 1_000_000.0) * self.input_per_million
            + (cached_input_tokens as f64 / 1_000_000.0) * self.cached_input_per_million
            + (output_tokens as f64 / 1_000_000.0) * self.output_per_million
    }
}

/// pricing reference: https://platform.openai.com/docs/pricing (December 2025).
fn builtin_costs() -> &'static HashMap<&'static str, ModelCost> {
    static TABLE: OnceLock<HashMap<&'static str, ModelCost>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("gpt-4o-mini", ModelCost { input_per_million: 0.15, cached_input_per_million: 0.075, output_per_million: 0.60 }),
            ("gpt-4.1-mini", ModelCost { input_per_million: 0.15, cached_input_per_million: 0.075, output_per_million: 0.60 }),
            ("gpt-4o", ModelCost { input_per_million: 2.50, cached_input_per_million: 1.25, output_per_million: 10.00 }),
            ("openai/gpt-5.1", ModelCost { input_per_million: 1.25, cached_input_per_million: 0.125, output_per_million: 10.00 }),
            ("openai/gpt-5-mini", ModelCost { input_per_million: 0.25, cached_input_per_million: 0.025, output_per_million: 2.00 }),
            ("gemini-2.5-flash", ModelCost { input_per_million: 0.30, cached_input_per_million: 0.03, output_per_million: 2.50 }),
            ("google/gemini-2.5-flash", ModelCost { input_per_million: 0.30, cached_input_per_million: 0.03, output_per_million: 2.50 }),
            ("gemini-3-flash-preview", ModelCost { input_per_million: 0.50, cached_input_per_million: 0.35, output_per_million: 3.00 }),
            ("google/gemini-3-flash-preview", ModelCost { input_per_million: 0.50, cached_input_per_million: 0.35, output_per_million: 3.00 }),
            ("or:deepseek/deepseek-v3.2", ModelCost { input_per_million: 0.27, cached_input_per_million: 0.22, output_per_million: 0.40 }),
        ])
    })
}

fn external_costs() -> &'static Option<HashMap<String, ModelCost>> {
    static EXTERNAL: OnceLock<Option<HashMap<String, ModelCost>>> = OnceLock::new();
    EXTERNAL.get_or_init(|| load_external_costs("llm_costs.json"))
}

fn load_external_costs(path: &str) -> Option<HashMap<String, ModelCost>> {
    let text = std::fs::read_to_string(path).ok()?;
    let payload: serde_json::Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, path, "failed to parse llm_costs.json; ignoring override");
            return None;
        }
    };
    let models = payload.get("models").unwrap_or(&payload);
    let object = models.as_object()?;

    let mut parsed = HashMap::new();
    for (name, value) in object {
        let Some(entry) = value.as_object() else { continue };
        let Some(input) = entry.get("input_per_million").and_then(|v| v.as_f64()) else { continue };
        let Some(output) = entry.get("output_per_million").and_then(|v| v.as_f64()) else { continue };
        let cached = entry.get("cached_input_per_million").and_then(|v| v.as_f64()).unwrap_or(input);
        parsed.insert(name.clone(), ModelCost { input_per_million: input, cached_input_per_million: cached, output_per_million: output });
    }
    if parsed.is_empty() { None } else { Some(parsed) }
}

/// external `llm_costs.json` entries win over the built-in table.
pub fn get_model_cost(model_name: &str) -> Option<ModelCost> {
    if let Some(external) = external_costs() {
        if let Some(cost) = external.get(model_name) {
            return Some(*cost);
        }
    }
    builtin_costs().get(model_name).copied()
}
