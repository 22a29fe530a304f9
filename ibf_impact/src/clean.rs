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

//! post-processing for web-search-grounded impact context text: strip
//! citation links the model insists on adding despite being told not to,
//! collapse run-on whitespace, and trim chatter before the first heading or
//! after the last bullet.

use lazy_static::lazy_static;
use regex::Regex;

use crate::prompt::CONTEXT_SECTION_HEADINGS;

lazy_static! {
    static ref MARKDOWN_LINK: Regex = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
    static ref BARE_URL: Regex = Regex::new(r"https?://\S+").unwrap();
    static ref BLANK_RUN: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref TRAILING_SPACE: Regex = Regex::new(r"[ \t]+\n").unwrap();
    static ref HEADING_LINE: Regex = Regex::new(r"(?m)^#{1,3}\s*(.+?)\s*$").unwrap();
    static ref TRAILING_CHATTER: Regex =
        Regex::new(r"(?is)\n+(?:if you'?d like|let me know|would you like|i can also|each of these items).*$").unwrap();
}

/// strips markdown links down to their anchor text, drops any bare URL
/// entirely, collapses blank-line runs and trailing whitespace, normalizes
/// `###` headings to a canonical form, and trims any trailing "would you
/// like me to..." offer the model appended after the last bullet.
pub fn clean_context_text(text: &str) -> String {
    let mut cleaned = MARKDOWN_LINK.replace_all(text, "$1").into_owned();
    cleaned = BARE_URL.replace_all(&cleaned, "").into_owned();
    cleaned = TRAILING_CHATTER.replace(&cleaned, "").into_owned();
    cleaned = standardize_context_headings(&cleaned);
    cleaned = TRAILING_SPACE.replace_all(&cleaned, "\n").into_owned();
    cleaned = BLANK_RUN.replace_all(&cleaned, "\n\n").into_owned();
    trim_before_first_heading(cleaned.trim().to_string())
}

/// rewrites any heading line (`#`, `##`, or `###` followed by one of the four
/// known section titles, in any case) to the canonical `### Title` form, so
/// downstream heading-completeness checks can match on an exact string.
pub fn standardize_context_headings(text: &str) -> String {
    HEADING_LINE
        .replace_all(text, |caps: &regex::Captures| {
            let candidate = caps[1].trim();
            for heading in CONTEXT_SECTION_HEADINGS {
                if candidate.eq_ignore_ascii_case(heading) {
                    return format!("### {heading}");
                }
            }
            caps[0].to_string()
        })
        .into_owned()
}

/// drops any prose the model wrote before the first recognized heading.
pub fn trim_before_first_heading(text: String) -> String {
    match text.find("### ") {
        Some(idx) if idx > 0 => text[idx..].to_string(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_links_to_anchor_text() {
        let input = "See [NIWA](https://niwa.co.nz) for details.";
        assert_eq!(clean_context_text(input), "See NIWA for details.");
    }

    #[test]
    fn strips_bare_urls() {
        let input = "### Existing Vulnerabilities\n- Flooding, see https://example.com/flood-map for detail.";
        let cleaned = clean_context_text(input);
        assert!(!cleaned.contains("http"));
    }

    #[test]
    fn normalizes_heading_case_and_hash_count() {
        let input = "## existing vulnerabilities\n- one";
        let cleaned = standardize_context_headings(input);
        assert!(cleaned.starts_with("### Existing Vulnerabilities"));
    }

    #[test]
    fn trims_prologue_before_first_heading() {
        let input = "Sure, here's what I found.\n\n### Existing Vulnerabilities\n- one";
        let cleaned = clean_context_text(input);
        assert!(cleaned.starts_with("### Existing Vulnerabilities"));
    }

    #[test]
    fn strips_trailing_offer_to_help_further() {
        let input = "### Upcoming Events\n- one\n\nWould you like me to dig deeper into any of these?";
        let cleaned = clean_context_text(input);
        assert!(!cleaned.to_lowercase().contains("would you like"));
    }

    #[test]
    fn strips_each_of_these_items_tail() {
        let input = "### Upcoming Events\n- one\n\nEach of these items can be expanded on request, just let me know which ones interest you most.";
        let cleaned = clean_context_text(input);
        assert!(!cleaned.to_lowercase().contains("each of these items"));
    }

    #[test]
    fn collapses_excess_blank_lines() {
        let input = "### Existing Vulnerabilities\n- one\n\n\n\n- two";
        let cleaned = clean_context_text(input);
        assert!(!cleaned.contains("\n\n\n"));
    }
}
