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

//! strips "thinking" artifacts that reasoning-capable models sometimes leave
//! in their final answer (DeepSeek R1-style `<think>` blocks, stray
//! chain-of-thought prose before the first header).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref THINK_BLOCK: Regex = Regex::new(r"(?s)<think>.*?</think>").unwrap();
    static ref FIRST_HEADER: Regex = Regex::new(r"\*\*.+?\*\*").unwrap();
    static ref LETS_LINE: Regex = Regex::new(r"(?m)^Let'?s [^\n]*\n?").unwrap();
    static ref INSTRUCTION_LINE: Regex = Regex::new(r"(?m)^The instruction says[^\n]*\n?").unwrap();
    static ref DEGREE_SPACING: Regex = Regex::new(r"(-?\d+(?:\.\d+)?)\s*°\s*([CF])").unwrap();
}

pub fn clean_llm_output(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut cleaned = THINK_BLOCK.replace_all(text, "").into_owned();

    if let Some(header) = FIRST_HEADER.find(&cleaned) {
        cleaned = cleaned[header.start()..].to_string();
    }

    cleaned = LETS_LINE.replace_all(&cleaned, "").into_owned();
    cleaned = INSTRUCTION_LINE.replace_all(&cleaned, "").into_owned();
    cleaned = DEGREE_SPACING.replace_all(&cleaned, "$1°$2").into_owned();

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_think_block() {
        let raw = "<think>pondering the forecast</think>**Forecast**\nSunny.";
        assert_eq!(clean_llm_output(raw), "**Forecast**\nSunny.");
    }

    #[test]
    fn trims_prologue_before_first_header() {
        let raw = "Let me work through the data.\n**Forecast**\nClear skies.";
        assert_eq!(clean_llm_output(raw), "**Forecast**\nClear skies.");
    }

    #[test]
    fn removes_lets_and_instruction_lines() {
        let raw = "**Forecast**\nLet's check the wind.\nThe instruction says use metric.\nIt will be windy.";
        let cleaned = clean_llm_output(raw);
        assert!(!cleaned.contains("Let's"));
        assert!(!cleaned.contains("The instruction says"));
        assert!(cleaned.contains("It will be windy."));
    }

    #[test]
    fn normalizes_degree_spacing() {
        let raw = "**Forecast**\nHigh of 20 ° C, low of -2°C.";
        assert_eq!(clean_llm_output(raw), "**Forecast**\nHigh of 20°C, low of -2°C.");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(clean_llm_output(""), "");
    }
}
