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

//! system/user prompt text for the narrative forecast and translation calls
//! (§4.8 step 6). The impact-context prompt itself lives in `ibf_impact`;
//! these builders only wrap its output alongside the formatted dataset.

use ibf_model::config::{AreaMode, Wordiness};

fn wordiness_instruction(wordiness: Wordiness) -> &'static str {
    match wordiness {
        Wordiness::Brief => "Keep the narrative brief: 2-3 short paragraphs, no filler.",
        Wordiness::Normal => "Write a clear, moderately detailed narrative covering each forecast day.",
        Wordiness::Detailed => "Write a thorough, detailed narrative, calling out notable hour-to-hour changes within each day.",
    }
}

fn impact_instruction(impact_based: bool) -> &'static str {
    if impact_based {
        "Frame the forecast around likely impacts: what the weather will mean for people, travel, and outdoor activity, \
         not just the raw numbers. Weave in any relevant vulnerabilities, thresholds, or upcoming events noted in the \
         supplied context."
    } else {
        "Describe the forecast conditions directly; do not speculate about impacts beyond what the data shows."
    }
}

pub fn build_location_system_prompt(wordiness: Wordiness, impact_based: bool) -> String {
    format!(
        "You are a professional meteorologist writing a public-facing forecast narrative for a single location. \
         {}\n{}\nWrite in plain prose, no bullet lists, no markdown headings.",
        wordiness_instruction(wordiness),
        impact_instruction(impact_based),
    )
}

pub fn build_location_user_prompt(formatted_dataset: &str, impact_context: &str) -> String {
    if impact_context.trim().is_empty() {
        format!("FORECAST DATA:\n{formatted_dataset}")
    } else {
        format!("FORECAST DATA:\n{formatted_dataset}\n\nIMPACT CONTEXT:\n{impact_context}")
    }
}

pub fn build_area_system_prompt(wordiness: Wordiness, impact_based: bool, mode: AreaMode) -> String {
    let scope = match mode {
        AreaMode::Area => "a defined local area made up of several representative locations",
        AreaMode::Regional => "a broad region spanning several sub-areas, summarized at a higher level than any single location",
    };
    format!(
        "You are a professional meteorologist writing a public-facing forecast narrative for {scope}. \
         Synthesize the member locations into one coherent narrative rather than repeating each one in turn; call out \
         meaningful differences between them when they matter.\n{}\n{}\nWrite in plain prose, no bullet lists, no markdown headings.",
        wordiness_instruction(wordiness),
        impact_instruction(impact_based),
    )
}

pub fn build_area_user_prompt(area_name: &str, formatted_area_dataset: &str, impact_context: &str) -> String {
    if impact_context.trim().is_empty() {
        format!("AREA: {area_name}\n\n{formatted_area_dataset}")
    } else {
        format!("AREA: {area_name}\n\n{formatted_area_dataset}\n\nIMPACT CONTEXT:\n{impact_context}")
    }
}

pub fn build_translation_system_prompt(target_language: &str) -> String {
    format!(
        "Translate the following weather forecast narrative into {target_language}. Preserve paragraph breaks and \
         all numeric values and units exactly as given. Output only the translation, with no preamble."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_user_prompt_omits_impact_section_when_empty() {
        let prompt = build_location_user_prompt("Sunny, 20C", "");
        assert!(!prompt.contains("IMPACT CONTEXT"));
        assert!(prompt.contains("Sunny, 20C"));
    }

    #[test]
    fn location_user_prompt_includes_impact_section_when_present() {
        let prompt = build_location_user_prompt("Sunny, 20C", "Flood-prone area.");
        assert!(prompt.contains("IMPACT CONTEXT:\nFlood-prone area."));
    }

    #[test]
    fn area_system_prompt_mentions_regional_scope() {
        let prompt = build_area_system_prompt(Wordiness::Normal, false, AreaMode::Regional);
        assert!(prompt.contains("broad region"));
    }

    #[test]
    fn translation_prompt_names_target_language() {
        let prompt = build_translation_system_prompt("French");
        assert!(prompt.contains("French"));
    }
}
