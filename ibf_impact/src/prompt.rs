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

use chrono::NaiveDate;

use crate::cache::ContextType;

pub const EVENT_LOOKAHEAD_DAYS: i64 = 10;

pub const CONTEXT_SECTION_HEADINGS: [&str; 4] = [
    "Existing Vulnerabilities",
    "Weather Impact Thresholds",
    "Exposed Populations and Assets",
    "Upcoming Events",
];

/// builds the web-search-grounded impact-context prompt for a location or
/// area. `extra_context` is free-text the caller supplies (e.g. "hosting a
/// marathon this weekend") and is folded in as an additional instruction.
pub fn build_context_prompt(name: &str, context_type: ContextType, today: NaiveDate, extra_context: Option<&str>) -> String {
    let window_end = today + chrono::Duration::days(EVENT_LOOKAHEAD_DAYS);
    let subject = match context_type {
        ContextType::Location => format!("the location {name}"),
        ContextType::Area => format!("the area {name}"),
        ContextType::Regional => format!("the region {name}"),
    };

    let mut prompt = format!(
        "Use web search to research {subject} and produce a concise impact \
         context briefing for a weather-impact forecast reader. Today's date \
         is {today}. Only report events and advisories that fall within the \
         window {today} to {window_end} inclusive; ignore anything outside it.\n\n\
         Structure the answer as exactly these four level-3 Markdown headings, \
         in this order, each followed by 2-5 short bullet points:\n\n\
         ### {h1}\n\
         List known chronic vulnerabilities for this place: flood-prone areas, \
         landslide risk, fragile infrastructure, prior disaster history.\n\n\
         ### {h2}\n\
         List the weather thresholds (rainfall, wind, heat, cold, snow) at \
         which this place typically starts to see real impacts, citing local \
         context where possible.\n\n\
         ### {h3}\n\
         List the populations and assets most exposed to weather impacts here: \
         vulnerable neighborhoods, critical infrastructure, major employers, \
         agriculture.\n\n\
         ### {h4}\n\
         List any scheduled events, festivals, elections, or large gatherings \
         in the window above that would increase exposure to a weather impact.\n\n\
         Do not include a preamble, a conclusion, or any text before the first \
         heading or after the last bullet point. Do not include markdown links \
         or bare URLs; write plain prose citations instead.",
        subject = subject,
        today = today.format("%Y-%m-%d"),
        window_end = window_end.format("%Y-%m-%d"),
        h1 = CONTEXT_SECTION_HEADINGS[0],
        h2 = CONTEXT_SECTION_HEADINGS[1],
        h3 = CONTEXT_SECTION_HEADINGS[2],
        h4 = CONTEXT_SECTION_HEADINGS[3],
    );

    if let Some(extra) = extra_context {
        let trimmed = extra.trim();
        if !trimmed.is_empty() {
            prompt.push_str(&format!(
                "\n\nAdditional context supplied by the forecaster, fold this in \
                 wherever it's relevant: {trimmed}"
            ));
        }
    }

    prompt
}

/// the continuation instruction appended as a fresh user turn when a Gemini
/// response is truncated, either because a heading is still missing or
/// because the text was cut off mid-sentence. When `missing_heading` is
/// `None` the response already has all four headings but ended on an
/// internal stop, so the prompt only asks it to finish the sentence.
pub fn continuation_prompt(missing_heading: Option<&str>) -> String {
    match missing_heading {
        Some(missing_heading) => format!(
            "Continue the previous answer. Do not repeat any heading or bullet \
             already written. First finish the sentence you were cut off in \
             the middle of, then continue directly with the \"### {missing_heading}\" \
             section (add the heading itself if you have not written it yet)."
        ),
        None => "Continue the previous answer. Do not repeat any heading or \
                 bullet already written. Finish the sentence you were cut off \
                 in the middle of, then stop."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_all_four_headings_in_order() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        let prompt = build_context_prompt("Wellington", ContextType::Location, today, None);
        let positions: Vec<usize> = CONTEXT_SECTION_HEADINGS
            .iter()
            .map(|h| prompt.find(h).expect("heading present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn extra_context_is_appended_when_present() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        let prompt = build_context_prompt("Wellington", ContextType::Location, today, Some("hosting a marathon"));
        assert!(prompt.contains("hosting a marathon"));
    }

    #[test]
    fn blank_extra_context_is_not_appended() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        let prompt = build_context_prompt("Wellington", ContextType::Location, today, Some("   "));
        assert!(!prompt.contains("Additional context"));
    }

    #[test]
    fn window_end_is_ten_days_out() {
        let today = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        let prompt = build_context_prompt("Wellington", ContextType::Area, today, None);
        assert!(prompt.contains("2026-08-07"));
    }
}
