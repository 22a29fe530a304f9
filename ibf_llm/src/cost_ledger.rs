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

//! process-wide cost accumulator: every LLM call records its estimated USD
//! cents against an entity label (a location or area display name) and a
//! cost kind, so the pipeline run can print one aligned summary table.

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostKind {
    Context,
    Forecast,
    Translation,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EntityCost {
    pub context_cents: f64,
    pub forecast_cents: f64,
    pub translation_cents: f64,
}

impl EntityCost {
    pub fn total_cents(&self) -> f64 {
        self.context_cents + self.forecast_cents + self.translation_cents
    }
}

#[derive(Default)]
pub struct CostLedger {
    entries: DashMap<String, EntityCost>,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entity_label: &str, kind: CostKind, cents: f64) {
        let mut entry = self.entries.entry(entity_label.to_string()).or_default();
        match kind {
            CostKind::Context => entry.context_cents += cents,
            CostKind::Forecast => entry.forecast_cents += cents,
            CostKind::Translation => entry.translation_cents += cents,
        }
    }

    /// entity labels in first-recorded insertion order are not preserved by
    /// `DashMap`; the summary sorts alphabetically instead so output is
    /// deterministic across runs.
    pub fn summary_table(&self) -> String {
        let mut rows: Vec<(String, EntityCost)> = self.entries.iter().map(|kv| (kv.key().clone(), *kv.value())).collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0).max("Entity".len());
        let mut out = String::new();
        out.push_str(&format!(
            "{:<label_width$}  {:>10}  {:>10}  {:>11}  {:>10}\n",
            "Entity", "Context", "Forecast", "Translation", "Total",
            label_width = label_width
        ));

        let mut grand_total = 0.0;
        for (label, cost) in &rows {
            grand_total += cost.total_cents();
            out.push_str(&format!(
                "{:<label_width$}  {:>10.2}  {:>10.2}  {:>11.2}  {:>10.2}\n",
                label,
                cost.context_cents,
                cost.forecast_cents,
                cost.translation_cents,
                cost.total_cents(),
                label_width = label_width
            ));
        }
        out.push_str(&format!("{:<label_width$}  {:>10}  {:>10}  {:>11}  {:>10.2}\n", "TOTAL", "", "", "", grand_total, label_width = label_width));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_per_entity_and_kind() {
        let ledger = CostLedger::new();
        ledger.record("Wellington", CostKind::Forecast, 1.5);
        ledger.record("Wellington", CostKind::Forecast, 0.5);
        ledger.record("Wellington", CostKind::Context, 2.0);

        let entry = ledger.entries.get("Wellington").unwrap();
        assert_eq!(entry.forecast_cents, 2.0);
        assert_eq!(entry.context_cents, 2.0);
        assert_eq!(entry.total_cents(), 4.0);
    }

    #[test]
    fn summary_table_includes_grand_total() {
        let ledger = CostLedger::new();
        ledger.record("A", CostKind::Forecast, 1.0);
        ledger.record("B", CostKind::Translation, 2.0);
        let table = ledger.summary_table();
        assert!(table.contains("TOTAL"));
        assert!(table.contains("3.00"));
    }
}
