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

//! area and regional entity processing (§4.8): gathers every member location
//! fresh, regardless of the area's own skip state, then narrates the
//! combined dataset as one entity.

use chrono::Utc;

use ibf_format::{format_area_dataset, LocationEntry};
use ibf_impact::{fetch_impact_context, ContextType};
use ibf_llm::{resolve_llm_settings, CostKind};
use ibf_model::config::{Area, AreaMode, ReasoningLevel};
use ibf_model::{resolve_model_spec, ModelKind};
use ibf_render::ForecastPage;

use crate::context::PipelineContext;
use crate::errors::Result;
use crate::location::resolve_translation;
use crate::location_data::{gather_location_data, LocationParams};
use crate::prompt::{build_area_system_prompt, build_area_user_prompt};
use crate::skip::should_skip_entity;
use crate::snapshot::snapshot_prompt;

pub async fn process_area_entity(ctx: &PipelineContext, area: &Area, display_name: &str) -> Result<()> {
    let slug = ibf_common::slug::slugify(display_name);
    ibf_render::ensure_site_scaffold(&ctx.config.web_root, &slug, display_name)?;
    ibf_render::record_area_hash(&ctx.config.web_root, &slug, &area.name, &area.locations)?;

    let refresh_minutes = area.refresh_interval_minutes.unwrap_or(ctx.config.recent_overwrite_minutes);
    if should_skip_entity(&ctx.config.web_root, &slug, refresh_minutes) {
        tracing::info!(area = display_name, "skipping: rendered page is within the refresh interval");
        return Ok(());
    }

    let model_spec = resolve_model_spec(area.model.as_deref().or(Some(ctx.config.model.as_str())));
    let snow_levels = area.snow_levels.unwrap_or(ctx.config.snow_levels) && model_spec.kind == ModelKind::Deterministic;

    let mut entries = Vec::with_capacity(area.locations.len());
    for member_name in &area.locations {
        let units = ctx.config.resolve_member_units(area, member_name);
        let altitude_override = ctx.config.resolve_member_altitude(member_name);

        let params = LocationParams {
            name: member_name,
            display_name: member_name,
            model_ref: area.model.as_deref(),
            forecast_days: ctx.config.area_forecast_days,
            units: &units,
            altitude_override,
            snow_levels,
            thin_select: ctx.config.area_thin_select,
        };

        match gather_location_data(ctx, &params).await {
            Ok(data) => entries.push(LocationEntry {
                name: member_name.clone(),
                latitude: Some(data.latitude),
                longitude: Some(data.longitude),
                timezone: data.timezone,
                text: data.formatted_text,
            }),
            Err(err) => {
                tracing::warn!(area = display_name, member = member_name, error = %err, "member location failed; omitting it from the area narrative");
            }
        }
    }

    let formatted_area = format_area_dataset(display_name, &entries);

    let (impact_context, context_cost) = if ctx.config.area_impact_based {
        let context_type = match area.mode {
            AreaMode::Area => ContextType::Area,
            AreaMode::Regional => ContextType::Regional,
        };
        fetch_impact_context(
            &ctx.http,
            &ctx.cache_root,
            context_type,
            display_name,
            &ctx.config.context_llm,
            Utc::now().date_naive(),
            area.extra_context.as_deref(),
            display_name,
        )
        .await
    } else {
        (String::new(), 0.0)
    };
    ctx.cost_ledger.record(display_name, CostKind::Context, context_cost);

    let system_prompt = build_area_system_prompt(ctx.config.area_wordiness, ctx.config.area_impact_based, area.mode);
    let user_prompt = build_area_user_prompt(display_name, &formatted_area, &impact_context);
    snapshot_prompt(&ctx.cache_root, &slug, "area", &system_prompt, &user_prompt, Utc::now())?;

    let llm_settings = resolve_llm_settings(None, Some(ctx.config.llm.as_str()))?;
    let reasoning = if ctx.config.enable_reasoning { ctx.config.area_reasoning } else { ReasoningLevel::Off };

    let narrative = match ctx.llm.generate_forecast_text(&user_prompt, &system_prompt, &llm_settings, reasoning, None, display_name).await {
        Ok(output) if !output.text.trim().is_empty() => {
            ctx.cost_ledger.record(display_name, CostKind::Forecast, output.cost_cents);
            output.text
        }
        Ok(_) => {
            tracing::warn!(area = display_name, "forecast LLM returned empty output; falling back to the dataset summary");
            formatted_area.clone()
        }
        Err(err) => {
            tracing::warn!(area = display_name, error = %err, "forecast LLM call failed; falling back to the dataset summary");
            formatted_area.clone()
        }
    };

    let translation = resolve_translation(ctx, area.translation_language.as_deref(), display_name, &narrative).await;

    let page = ForecastPage {
        display_name,
        issued_at: Utc::now(),
        body: &narrative,
        translation: translation.as_ref().map(|(lang, text)| (lang.as_str(), text.as_str())),
    };
    ibf_render::write_forecast_page(&ctx.config.web_root, &slug, &page)?;

    Ok(())
}
