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

//! the static-site half of the pipeline's output: turns a rendered forecast
//! body into a page under `web_root`, keeps the site menu in sync, and
//! scaffolds the favicon/placeholder pages and `.ibf_maps_hash` state a
//! fresh `web_root` needs before anything has run.

pub mod errors;
pub mod html;
pub mod scaffold;

pub use errors::{op_failed, RenderError, Result};
pub use html::{escape_html, is_placeholder_page, render_forecast_page, render_menu, render_placeholder_page, ForecastPage, MenuEntry, FAVICON_SVG, PLACEHOLDER_MARKER};
pub use scaffold::{compute_area_hash, ensure_site_scaffold, load_maps_hash_state, record_area_hash, store_maps_hash_state, MapsHashState};

use std::path::Path;

/// writes a rendered forecast page to `<web_root>/<slug>/index.html`,
/// creating the directory if needed.
pub fn write_forecast_page(web_root: &Path, slug: &str, page: &ForecastPage) -> Result<()> {
    let dir = web_root.join(slug);
    ibf_fs_cache::ensure_dir(&dir)?;
    let html = render_forecast_page(page);
    ibf_fs_cache::atomic_write(&dir.join("index.html"), html.as_bytes())?;
    Ok(())
}

/// writes `<web_root>/index.html`, the flat site menu.
pub fn write_menu_page(web_root: &Path, entries: &[MenuEntry]) -> Result<()> {
    ibf_fs_cache::ensure_dir(web_root)?;
    let html = render_menu(entries);
    ibf_fs_cache::atomic_write(&web_root.join("index.html"), html.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn write_forecast_page_then_menu_round_trips_to_disk() {
        let dir = std::env::temp_dir().join(format!("ibf_render_lib_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let issued = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let page = ForecastPage { display_name: "Test City", issued_at: issued, body: "Sunny.", translation: None };
        write_forecast_page(&dir, "test-city", &page).unwrap();

        let written = std::fs::read_to_string(dir.join("test-city/index.html")).unwrap();
        assert!(written.contains("Forecast for Test City"));

        write_menu_page(&dir, &[MenuEntry { label: "Test City", slug: "test-city" }]).unwrap();
        let menu = std::fs::read_to_string(dir.join("index.html")).unwrap();
        assert!(menu.contains("test-city/index.html"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
