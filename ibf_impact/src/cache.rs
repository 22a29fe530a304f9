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

//! cache layout for generated impact context: one JSON file per
//! (day, context type, slugified name, optional non-default model,
//! optional extra-context hash), read with a 3-day freshness window and
//! swept on every fetch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::Result;

pub const MAX_CONTEXT_AGE_DAYS: i64 = 3;
pub const DEFAULT_CONTEXT_LLM: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextType {
    Location,
    Area,
    Regional,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::Location => "location",
            ContextType::Area => "area",
            ContextType::Regional => "regional",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedContext {
    pub context: String,
    pub timestamp: String,
    pub context_type: String,
    pub name: String,
    pub forecast_days: u32,
    pub context_llm: String,
    pub extra_context: Option<String>,
}

pub fn cache_dir() -> PathBuf {
    PathBuf::from("ibf_cache/impact")
}

/// first 8 hex characters of the sha-256 digest of the (whitespace-collapsed)
/// extra context, standing in for the source's sha1 fingerprint -- this is a
/// cache key, not a security boundary, so any stable short digest will do.
fn extra_context_key(extra_context: Option<&str>) -> Option<String> {
    let trimmed = extra_context?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let collapsed: String = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    let digest = Sha256::digest(collapsed.as_bytes());
    Some(format!("{digest:x}")[..8].to_string())
}

/// canonical `impact/<YYYYMMDD>_<type>_<slug>[__<model-slug>][__ctx<hash>].json`
/// path shape. The default context model is omitted from the filename so the
/// common case stays short; any other model is appended as a slug suffix.
pub fn cache_path(dir: &Path, context_type: ContextType, name: &str, context_llm: &str, extra_context: Option<&str>, date: NaiveDate) -> PathBuf {
    let safe_name = ibf_common::slug::slugify(name);
    let mut filename = format!("{}_{}_{}", date.format("%Y%m%d"), context_type.as_str(), safe_name);
    if !context_llm.eq_ignore_ascii_case(DEFAULT_CONTEXT_LLM) {
        filename.push_str(&format!("__{}", ibf_common::slug::slugify(context_llm)));
    }
    if let Some(key) = extra_context_key(extra_context) {
        filename.push_str(&format!("__ctx{key}"));
    }
    filename.push_str(".json");
    dir.join(filename)
}

/// checks today's and the previous `MAX_CONTEXT_AGE_DAYS - 1` days' cache
/// entries for a fresh hit, returning the content plus the path a fresh
/// generation should be written to (always today's path).
pub fn load_recent_cache(dir: &Path, context_type: ContextType, name: &str, context_llm: &str, extra_context: Option<&str>, today: NaiveDate) -> (Option<String>, PathBuf) {
    let today_path = cache_path(dir, context_type, name, context_llm, extra_context, today);
    let max_age = Duration::from_secs(MAX_CONTEXT_AGE_DAYS as u64 * 86_400);

    for offset in 0..MAX_CONTEXT_AGE_DAYS {
        let Some(candidate_date) = today.checked_sub_signed(chrono::Duration::days(offset)) else { continue };
        let path = cache_path(dir, context_type, name, context_llm, extra_context, candidate_date);
        if let Ok(Some(cached)) = ibf_fs_cache::read_json_cache::<CachedContext>(&path, max_age) {
            if !cached.context.is_empty() {
                return (Some(cached.context), path);
            }
        }
    }
    (None, today_path)
}

pub fn store_impact_context(
    path: &Path,
    name: &str,
    content: &str,
    context_type: ContextType,
    forecast_days: u32,
    context_llm: &str,
    extra_context: Option<&str>,
    timestamp: String,
) -> Result<()> {
    let payload = CachedContext {
        context: content.to_string(),
        timestamp,
        context_type: context_type.as_str().to_string(),
        name: name.to_string(),
        forecast_days,
        context_llm: context_llm.to_string(),
        extra_context: extra_context.map(str::to_string),
    };
    ibf_fs_cache::write_json_cache(path, &payload)?;
    Ok(())
}

pub fn cleanup_impact_cache(dir: &Path) {
    let max_age = Duration::from_secs(MAX_CONTEXT_AGE_DAYS as u64 * 86_400);
    if let Err(err) = ibf_common::fs::remove_old_files(dir, max_age) {
        tracing::warn!(error = %err, path = %dir.display(), "failed to sweep impact context cache");
    }
}
