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

//! standalone location entity processing: §4.8 steps 1-9 for a single
//! `[[locations]]` entry.

use chrono::Utc;

use ibf_impact::{fetch_impact_context, ContextType};
use ibf_llm::{resolve_llm_settings, CostKind};
use ibf_model::config::{Location, ReasoningLevel};
use ibf_model::{resolve_model_spec, ModelKind};
use ibf_render::ForecastPage;

use crate::context::PipelineContext;
use crate::errors::Result;
use crate::location_data::{gather_location_data, LocationParams};
use crate::prompt::{build_location_system_prompt, build_location_user_prompt, build_translation_system_prompt};
use crate::skip::should_skip_entity;
use crate::snapshot::snapshot_prompt;

pub async fn process_location_entity(ctx: &PipelineContext, location: &Location, display_name: &str) -> Result<()> {
    let slug = ibf_common::slug::slugify(display_name);
    ibf_render::ensure_site_scaffold(&ctx.config.web_root, &slug, display_name)?;

    let refresh_minutes = location.refresh_interval_minutes.unwrap_or(ctx.config.recent_overwrite_minutes);
    if should_skip_entity(&ctx.config.web_root, &slug, refresh_minutes) {
        tracing::info!(location = display_name, "skipping: rendered page is within the refresh interval");
        return Ok(());
    }

    let model_spec = resolve_model_spec(location.model.as_deref().or(Some(ctx.config.model.as_str())));
    let snow_levels = location.snow_levels.unwrap_or(ctx.config.snow_levels) && model_spec.kind == ModelKind::Deterministic;
    let altitude_override = location.units.get("altitude_m").and_then(|s| s.parse::<f64>().ok());

    let params = LocationParams {
        name: &location.name,
        display_name,
        model_ref: location.model.as_deref(),
        forecast_days: ctx.config.location_forecast_days,
        units: &location.units,
        altitude_override,
        snow_levels,
        thin_select: ctx.config.location_thin_select,
    };
    let data = gather_location_data(ctx, &params).await?;

    let (impact_context, context_cost) = if ctx.config.location_impact_based {
        fetch_impact_context(
            &ctx.http,
            &ctx.cache_root,
            ContextType::Location,
            display_name,
            &ctx.config.context_llm,
            Utc::now().date_naive(),
            location.extra_context.as_deref(),
            display_name,
        )
        .await
    } else {
        (String::new(), 0.0)
    };
    ctx.cost_ledger.record(display_name, CostKind::Context, context_cost);

    let system_prompt = build_location_system_prompt(ctx.config.location_wordiness, ctx.config.location_impact_based);
    let user_prompt = build_location_user_prompt(&data.formatted_text, &impact_context);
    snapshot_prompt(&ctx.cache_root, &slug, "location", &system_prompt, &user_prompt, Utc::now())?;

    let llm_settings = resolve_llm_settings(None, Some(ctx.config.llm.as_str()))?;
    let reasoning = if ctx.config.enable_reasoning { ctx.config.location_reasoning } else { ReasoningLevel::Off };

    let narrative = match ctx.llm.generate_forecast_text(&user_prompt, &system_prompt, &llm_settings, reasoning, None, display_name).await {
        Ok(output) if !output.text.trim().is_empty() => {
            ctx.cost_ledger.record(display_name, CostKind::Forecast, output.cost_cents);
            output.text
        }
        Ok(_) => {
            tracing::warn!(location = display_name, "forecast LLM returned empty output; falling back to the dataset summary");
            data.formatted_text.clone()
        }
        Err(err) => {
            tracing::warn!(location = display_name, error = %err, "forecast LLM call failed; falling back to the dataset summary");
            data.formatted_text.clone()
        }
    };

    let translation = resolve_translation(ctx, location.translation_language.as_deref(), display_name, &narrative).await;

    let page = ForecastPage {
        display_name,
        issued_at: Utc::now(),
        body: &narrative,
        translation: translation.as_ref().map(|(lang, text)| (lang.as_str(), text.as_str())),
    };
    ibf_render::write_forecast_page(&ctx.config.web_root, &slug, &page)?;

    Ok(())
}

/// `None` when no target language is configured or it resolves to English
/// (the source language already).
pub async fn resolve_translation(ctx: &PipelineContext, target_language: Option<&str>, cost_label: &str, narrative: &str) -> Option<(String, String)> {
    let language = target_language.or(ctx.config.translation_language.as_deref())?;
    if language.trim().eq_ignore_ascii_case("english") || language.trim().eq_ignore_ascii_case("en") {
        return None;
    }

    let settings = match resolve_llm_settings(ctx.config.translation_llm.as_deref(), Some(ctx.config.llm.as_str())) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(error = %err, "could not resolve translation LLM settings; skipping translation");
            return None;
        }
    };
    let system_prompt = build_translation_system_prompt(language);

    match ctx.llm.generate_forecast_text(narrative, &system_prompt, &settings, ReasoningLevel::Off, None, cost_label).await {
        Ok(output) if !output.text.trim().is_empty() => {
            ctx.cost_ledger.record(cost_label, CostKind::Translation, output.cost_cents);
            Some((language.to_string(), output.text))
        }
        Ok(_) => {
            tracing::warn!(cost_label, "translation LLM returned empty output; skipping translation");
            None
        }
        Err(err) => {
            tracing::warn!(cost_label, error = %err, "translation LLM call failed; skipping translation");
            None
        }
    }
}
