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

//! the skip policy (§4.8 step 2): an entity's rendered page is left alone
//! when it already exists, is newer than the configured refresh interval,
//! and isn't still the scaffolder's placeholder.

use std::path::Path;
use std::time::{Duration, SystemTime};

use ibf_render::is_placeholder_page;

pub fn should_skip_entity(web_root: &Path, slug: &str, refresh_interval_minutes: u32) -> bool {
    let path = web_root.join(slug).join("index.html");
    let Ok(contents) = std::fs::read_to_string(&path) else { return false };
    if is_placeholder_page(&contents) {
        return false;
    }

    let Ok(metadata) = std::fs::metadata(&path) else { return false };
    let Ok(modified) = metadata.modified() else { return false };
    let Ok(age) = SystemTime::now().duration_since(modified) else { return false };

    age < Duration::from_secs(u64::from(refresh_interval_minutes) * 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempdir(label: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ibf_pipeline_skip_test_{label}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn no_existing_page_is_never_skipped() {
        let dir = tempdir("missing");
        assert!(!should_skip_entity(&dir, "wellington", 60));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn placeholder_page_is_never_skipped() {
        let dir = tempdir("placeholder");
        let page_dir = dir.join("wellington");
        std::fs::create_dir_all(&page_dir).unwrap();
        ibf_render::ensure_site_scaffold(&dir, "wellington", "Wellington").unwrap();
        assert!(!should_skip_entity(&dir, "wellington", 60));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn fresh_rendered_page_within_interval_is_skipped() {
        let dir = tempdir("fresh");
        let page_dir = dir.join("wellington");
        std::fs::create_dir_all(&page_dir).unwrap();
        std::fs::write(page_dir.join("index.html"), "<html>Forecast for Wellington</html>").unwrap();
        assert!(should_skip_entity(&dir, "wellington", 60));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn stale_rendered_page_beyond_interval_is_not_skipped() {
        let dir = tempdir("stale");
        let page_dir = dir.join("wellington");
        std::fs::create_dir_all(&page_dir).unwrap();
        let path = page_dir.join("index.html");
        std::fs::write(&path, "<html>Forecast for Wellington</html>").unwrap();
        let stale = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::open(&path).unwrap().set_modified(stale).unwrap();
        assert!(!should_skip_entity(&dir, "wellington", 30));
        std::fs::remove_dir_all(&dir).ok();
    }
}
