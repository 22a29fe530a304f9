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

//! web-search-grounded impact context: a slug-keyed, 3-day-fresh JSON cache
//! in front of a Gemini/OpenAI call that produces the four-H3-section
//! Markdown briefing consumed by the narrative prompt builders.

pub mod cache;
pub mod clean;
pub mod errors;
pub mod generator;
pub mod prompt;

pub use cache::{cache_dir, cleanup_impact_cache, load_recent_cache, store_impact_context, CachedContext, ContextType, DEFAULT_CONTEXT_LLM, MAX_CONTEXT_AGE_DAYS};
pub use clean::{clean_context_text, standardize_context_headings};
pub use errors::{op_failed, ImpactError, Result};
pub use generator::generate_context;
pub use prompt::{build_context_prompt, continuation_prompt, CONTEXT_SECTION_HEADINGS, EVENT_LOOKAHEAD_DAYS};

use std::path::Path;

use chrono::NaiveDate;

/// full fetch-or-generate round trip for one entity: checks the recent-cache
/// window, calls the context LLM on a miss, and persists a fresh hit under
/// today's cache path. Returns the (possibly empty) context text and the USD
/// cents spent generating it -- zero when served from cache or when
/// generation failed.
pub async fn fetch_impact_context(
    http: &reqwest::Client,
    cache_root: &Path,
    context_type: ContextType,
    name: &str,
    context_llm: &str,
    today: NaiveDate,
    extra_context: Option<&str>,
    cost_label: &str,
) -> (String, f64) {
    let dir = cache_dir_under(cache_root);
    cleanup_impact_cache(&dir);

    let (cached, path) = load_recent_cache(&dir, context_type, name, context_llm, extra_context, today);
    if let Some(context) = cached {
        return (context, 0.0);
    }

    let prompt = build_context_prompt(name, context_type, today, extra_context);
    let (context, cost_cents) = generate_context(http, &prompt, context_llm, cost_label).await;

    if !context.is_empty() {
        let timestamp = format!("{today}T00:00:00Z");
        if let Err(err) = store_impact_context(&path, name, &context, context_type, EVENT_LOOKAHEAD_DAYS as u32, context_llm, extra_context, timestamp) {
            tracing::warn!(error = %err, path = %path.display(), "failed to persist impact context cache entry");
        }
    }

    (context, cost_cents)
}

fn cache_dir_under(cache_root: &Path) -> std::path::PathBuf {
    cache_root.join("impact")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_empty_context_without_provider_credentials() {
        unsafe {
            std::env::remove_var("GEMINI_API_KEY");
            std::env::remove_var("OPENAI_API_KEY");
        }
        let dir = std::env::temp_dir().join(format!("ibf_impact_lib_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let http = reqwest::Client::new();
        let today = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        let (context, cost) = fetch_impact_context(&http, &dir, ContextType::Location, "Nowhere", DEFAULT_CONTEXT_LLM, today, None, "Nowhere").await;
        assert!(context.is_empty());
        assert_eq!(cost, 0.0);
        std::fs::remove_dir_all(&dir).ok();
    }
}
