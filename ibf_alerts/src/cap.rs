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

//! minimal CAP (Common Alerting Protocol) XML parsing: RSS item links, and
//! per-alert polygon/severity/onset/expires extraction. Namespace prefixes
//! (`cap:`) are stripped rather than resolved, matching how the grounding
//! source falls back to "any namespace" when the expected prefix is absent.

use geo::{Coord, LineString, Polygon};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

pub struct RssItem {
    pub title: Option<String>,
    pub link: String,
}

/// pull `<item><link>…</link><title>…</title></item>` entries out of an RSS
/// feed. Malformed XML yields an empty list rather than an error -- the
/// caller treats "no entries" the same as "feed unavailable".
pub fn parse_rss_items(xml: &[u8]) -> Vec<RssItem> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut in_item = false;
    let mut current_tag = String::new();
    let mut link: Option<String> = None;
    let mut title: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref());
                if name == "item" {
                    in_item = true;
                    link = None;
                    title = None;
                }
                current_tag = name;
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().trim().to_string();
                    if !text.is_empty() {
                        match current_tag.as_str() {
                            "link" => link = Some(text),
                            "title" => title = Some(text),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if local_name(e.name().as_ref()) == "item" && in_item {
                    if let Some(link) = link.take() {
                        items.push(RssItem { title: title.take(), link });
                    }
                    in_item = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    items
}

#[derive(Default)]
pub struct CapInfo {
    pub polygons: Vec<Polygon<f64>>,
    pub severity: Option<String>,
    pub onset: Option<String>,
    pub expires: Option<String>,
}

/// extract polygons and the severity/onset/expires fields from a single CAP
/// alert XML document.
pub fn parse_cap_info(xml: &[u8]) -> CapInfo {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut info = CapInfo::default();
    let mut current_tag = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                current_tag = local_name(e.name().as_ref());
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().trim().to_string();
                if text.is_empty() {
                    buf.clear();
                    continue;
                }
                match current_tag.as_str() {
                    "polygon" => {
                        if let Some(poly) = cap_polygon_to_shape(&text) {
                            info.polygons.push(poly);
                        }
                    }
                    "severity" => info.severity.get_or_insert(text),
                    "onset" => info.onset.get_or_insert(text),
                    "expires" => info.expires.get_or_insert(text),
                    _ => None,
                };
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    info
}

fn local_name(qualified: &[u8]) -> String {
    let s = String::from_utf8_lossy(qualified);
    match s.split_once(':') {
        Some((_, local)) => local.to_string(),
        None => s.to_string(),
    }
}

/// a CAP polygon is whitespace-separated `lat,lon` pairs; at least 3 points
/// are required to form a polygon.
fn cap_polygon_to_shape(text: &str) -> Option<Polygon<f64>> {
    let mut coords = Vec::new();
    for pair in text.split_whitespace() {
        let mut parts = pair.split(',');
        let lat: f64 = parts.next()?.parse().ok()?;
        let lon: f64 = parts.next()?.parse().ok()?;
        coords.push(Coord { x: lon, y: lat });
    }
    if coords.len() < 3 {
        return None;
    }
    Some(Polygon::new(LineString(coords), vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;
    use geo::Point;

    #[test]
    fn parses_rss_items() {
        let xml = br#"<rss><channel>
            <item><title>Severe Thunderstorm</title><link>https://example.com/cap/1</link></item>
            <item><title>Flood Watch</title><link>https://example.com/cap/2</link></item>
        </channel></rss>"#;
        let items = parse_rss_items(xml);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link, "https://example.com/cap/1");
        assert_eq!(items[1].title.as_deref(), Some("Flood Watch"));
    }

    #[test]
    fn parses_cap_polygon_and_fields() {
        let xml = br#"<alert xmlns:cap="urn:oasis:names:tc:emergency:cap:1.2">
            <cap:info>
                <cap:severity>Severe</cap:severity>
                <cap:onset>2025-01-10T00:00:00+13:00</cap:onset>
                <cap:expires>2025-01-11T00:00:00+13:00</cap:expires>
                <cap:area>
                    <cap:polygon>-41.0,174.0 -41.0,175.0 -40.0,175.0 -40.0,174.0 -41.0,174.0</cap:polygon>
                </cap:area>
            </cap:info>
        </alert>"#;
        let info = parse_cap_info(xml);
        assert_eq!(info.severity.as_deref(), Some("Severe"));
        assert_eq!(info.polygons.len(), 1);
        assert!(info.polygons[0].contains(&Point::new(174.5, -40.5)));
    }
}
