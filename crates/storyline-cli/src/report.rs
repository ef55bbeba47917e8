//! Rendering composed traces

use serde::Serialize;
use std::fmt::Write as _;
use storyline_compose::Composition;
use storyline_scenario::Scenario;

/// Serializable view of a composition
#[derive(Debug, Clone, Serialize)]
pub struct TraceReport<'a> {
    /// Seed that reproduces the run
    pub seed: Option<&'a str>,
    /// Whether scenarios had to be repeated
    pub repeated: bool,
    /// Entries in execution order
    pub trace: Vec<ReportEntry<'a>>,
}

/// One entry of a [`TraceReport`]
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry<'a> {
    /// Dotted trace id
    pub id: String,
    /// Scenario or part with resolved arguments
    pub scenario: &'a Scenario,
}

impl<'a> TraceReport<'a> {
    /// Build the report of `composition`
    #[must_use]
    pub fn new(composition: &'a Composition) -> Self {
        Self {
            seed: composition.seed.as_deref(),
            repeated: composition.repeated,
            trace: composition
                .entries
                .iter()
                .map(|e| ReportEntry {
                    id: e.id.to_string(),
                    scenario: &e.scenario,
                })
                .collect(),
        }
    }
}

/// Plain text listing: one block per entry, steps indented
#[must_use]
pub fn render_text(composition: &Composition) -> String {
    let mut out = String::new();
    if let Some(seed) = &composition.seed {
        let _ = writeln!(out, "seed: {seed}");
    }
    for (position, entry) in composition.entries.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. [{}] {}", position + 1, entry.id, entry.scenario.name);
        for step in entry.scenario.all_steps() {
            let _ = writeln!(out, "       {}", step.keyword);
        }
        if !entry.scenario.data_choices.is_empty() {
            let choices: Vec<_> = entry
                .scenario
                .data_choices
                .iter()
                .map(|(example, value)| format!("{example} -> {value}"))
                .collect();
            let _ = writeln!(out, "       ({})", choices.join(", "));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use storyline_compose::{ComposeConfig, Composer, SeedOption};
    use storyline_test_utils::plain_scenario;

    fn composition() -> Composition {
        Composer::new(ComposeConfig::default().with_seed(SeedOption::parse("1")))
            .compose(&[plain_scenario("Only")])
            .unwrap()
    }

    #[test]
    fn text_lists_entries_and_steps() {
        assert_eq!(render_text(&composition()), "seed: 1\n  1. [0] Only\n       When Only\n");
    }

    #[test]
    fn json_report_uses_dotted_ids() {
        let composition = composition();
        let value = serde_json::to_value(TraceReport::new(&composition)).unwrap();
        assert_eq!(value["seed"], "1");
        assert_eq!(value["trace"][0]["id"], "0");
        assert_eq!(value["trace"][0]["scenario"]["name"], "Only");
    }
}
