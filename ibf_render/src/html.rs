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

//! static-site HTML rendering. Deliberately plain: a page is a heading, an
//! "Issued:" timestamp, a preformatted forecast body, and (optionally) a
//! translated block underneath -- no client-side script, no templating
//! engine, just escaped strings written directly into a handful of `<div>`s.
//! The difficulty this system carries is in what it consumes (§1); the
//! renderer only needs to not mangle it.

use chrono::{DateTime, Utc};

/// HTML comment marker the scaffolder writes into placeholder pages so the
/// pipeline's skip policy can tell a never-rendered page from a stale one
/// even though both may satisfy the refresh-interval age check.
pub const PLACEHOLDER_MARKER: &str = "<!-- ibf:placeholder -->";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// escape then turn blank-line-separated paragraphs into `<p>` blocks,
/// preserving single newlines within a paragraph as `<br>`.
fn render_body_html(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>\n")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// one rendered forecast page: a location or an area/regional entity.
pub struct ForecastPage<'a> {
    pub display_name: &'a str,
    pub issued_at: DateTime<Utc>,
    pub body: &'a str,
    pub translation: Option<(&'a str, &'a str)>,
}

/// renders a single `<web_root>/<slug>/index.html` forecast page. Always
/// contains the literal `Forecast for <display_name>` heading and an
/// `Issued:` timestamp header per §8 scenario S1.
pub fn render_forecast_page(page: &ForecastPage) -> String {
    let title = escape_html(page.display_name);
    let issued = page.issued_at.format("%Y-%m-%d %H:%M UTC");
    let body_html = render_body_html(page.body);

    let translation_html = match page.translation {
        Some((lang, text)) if !text.trim().is_empty() => format!(
            "<section class=\"translation\">\n<h2>Translation ({})</h2>\n{}\n</section>\n",
            escape_html(lang),
            render_body_html(text)
        ),
        _ => String::new(),
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Forecast for {title}</title>\n<link rel=\"icon\" href=\"/favicon.svg\">\n</head>\n<body>\n<h1>Forecast for {title}</h1>\n<p class=\"issued\">Issued: {issued}</p>\n<section class=\"forecast\">\n{body_html}\n</section>\n{translation_html}</body>\n</html>\n"
    )
}

/// one row of the site index/menu.
pub struct MenuEntry<'a> {
    pub label: &'a str,
    pub slug: &'a str,
}

/// renders `<web_root>/index.html`, a flat list of links to every
/// location/area page, grouped under a single heading per §8 scenario S2
/// ("the menu HTML contains both labels").
pub fn render_menu(entries: &[MenuEntry]) -> String {
    let items: String = entries
        .iter()
        .map(|entry| format!("<li><a href=\"/{}/index.html\">{}</a></li>", escape_html(entry.slug), escape_html(entry.label)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Forecasts</title>\n<link rel=\"icon\" href=\"/favicon.svg\">\n</head>\n<body>\n<h1>Forecasts</h1>\n<ul>\n{items}\n</ul>\n</body>\n</html>\n"
    )
}

/// a never-rendered placeholder page written by the scaffolder ahead of the
/// first real run, so a menu link never 404s mid-run. Carries
/// [`PLACEHOLDER_MARKER`] so the skip policy (§4.8) never mistakes it for a
/// fresh-enough real forecast.
pub fn render_placeholder_page(display_name: &str) -> String {
    let title = escape_html(display_name);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Forecast for {title}</title>\n</head>\n<body>\n{PLACEHOLDER_MARKER}\n<h1>Forecast for {title}</h1>\n<p>Forecast not generated yet.</p>\n</body>\n</html>\n"
    )
}

pub fn is_placeholder_page(html: &str) -> bool {
    html.contains(PLACEHOLDER_MARKER)
}

pub const FAVICON_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 16 16\"><circle cx=\"8\" cy=\"8\" r=\"7\" fill=\"#3a7bd5\"/></svg>";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_html("<b>A & B</b>"), "&lt;b&gt;A &amp; B&lt;/b&gt;");
    }

    #[test]
    fn forecast_page_contains_required_markers() {
        let issued = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let page = ForecastPage { display_name: "Test City", issued_at: issued, body: "Date: TODAY 10 JANUARY\nSunny all day.", translation: None };
        let html = render_forecast_page(&page);
        assert!(html.contains("Forecast for Test City"));
        assert!(html.contains("Issued:"));
        assert!(!html.trim_start().starts_with("Error"));
    }

    #[test]
    fn forecast_page_includes_translation_block_when_present() {
        let issued = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let page = ForecastPage { display_name: "Wellington", issued_at: issued, body: "Sunny.", translation: Some(("es", "Soleado.")) };
        let html = render_forecast_page(&page);
        assert!(html.contains("Translation (es)"));
        assert!(html.contains("Soleado."));
    }

    #[test]
    fn menu_contains_both_duplicate_labels() {
        let entries = vec![
            MenuEntry { label: "Duplicate City (Ensemble)", slug: "duplicate-city-ensemble" },
            MenuEntry { label: "Duplicate City (Deterministic)", slug: "duplicate-city-deterministic" },
        ];
        let html = render_menu(&entries);
        assert!(html.contains("Duplicate City (Ensemble)"));
        assert!(html.contains("Duplicate City (Deterministic)"));
        assert!(html.contains("duplicate-city-ensemble/index.html"));
        assert!(html.contains("duplicate-city-deterministic/index.html"));
    }

    #[test]
    fn placeholder_page_is_detected() {
        let html = render_placeholder_page("Test City");
        assert!(is_placeholder_page(&html));
        let issued = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let real = render_forecast_page(&ForecastPage { display_name: "Test City", issued_at: issued, body: "Sunny.", translation: None });
        assert!(!is_placeholder_page(&real));
    }
}
