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

//! top-level run orchestration (§5): locations are fanned out over a
//! bounded `JoinSet`, areas are scheduled only once every location has
//! finished, and the run closes with the site menu and cost summary table.
//! A single entity's failure is logged and skipped; it never aborts the run.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use ibf_render::MenuEntry;

use crate::area::process_area_entity;
use crate::context::PipelineContext;
use crate::errors::Result;
use crate::location::process_location_entity;
use crate::naming::compute_location_display_names;

const DEFAULT_LOCATION_CONCURRENCY: usize = 4;

pub async fn run(ctx: Arc<PipelineContext>) -> Result<String> {
    let display_names = compute_location_display_names(&ctx.config.locations, &ctx.config.model);

    let semaphore = Arc::new(Semaphore::new(DEFAULT_LOCATION_CONCURRENCY));
    let mut locations = JoinSet::new();
    for (location, display_name) in ctx.config.locations.iter().cloned().zip(display_names.iter().cloned()) {
        let ctx = Arc::clone(&ctx);
        let semaphore = Arc::clone(&semaphore);
        locations.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else { return };
            if ctx.cancellation.is_cancelled() {
                tracing::info!(location = %display_name, "run cancelled; skipping remaining location");
                return;
            }
            if let Err(err) = process_location_entity(&ctx, &location, &display_name).await {
                tracing::warn!(location = %display_name, error = %err, "location processing failed; skipping");
            }
        });
    }
    while locations.join_next().await.is_some() {}

    // areas are only scheduled once every location task above has resolved,
    // so a member's freshly gathered data is never raced against its own area.
    let mut areas = JoinSet::new();
    for area in ctx.config.areas.iter().cloned() {
        let ctx = Arc::clone(&ctx);
        let display_name = area.name.clone();
        areas.spawn(async move {
            if ctx.cancellation.is_cancelled() {
                tracing::info!(area = %display_name, "run cancelled; skipping remaining area");
                return;
            }
            if let Err(err) = process_area_entity(&ctx, &area, &display_name).await {
                tracing::warn!(area = %display_name, error = %err, "area processing failed; skipping");
            }
        });
    }
    while areas.join_next().await.is_some() {}

    write_site_menu(&ctx, &display_names)?;

    Ok(ctx.cost_ledger.summary_table())
}

fn write_site_menu(ctx: &PipelineContext, location_display_names: &[String]) -> Result<()> {
    let area_names: Vec<String> = ctx.config.areas.iter().map(|area| area.name.clone()).collect();

    let labeled: Vec<(String, String)> = location_display_names
        .iter()
        .chain(area_names.iter())
        .map(|name| (name.clone(), ibf_common::slug::slugify(name)))
        .collect();

    let entries: Vec<MenuEntry> = labeled.iter().map(|(label, slug)| MenuEntry { label, slug }).collect();
    ibf_render::write_menu_page(&ctx.config.web_root, &entries)?;
    Ok(())
}
