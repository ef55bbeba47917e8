//! Error types for scenario definitions

use std::fmt;

/// Scenario definition errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    /// Malformed or missing declarative metadata on one or more steps
    #[error("{} step definition issue(s):\n{}", .issues.len(), render(.issues))]
    StepDefinition {
        /// Every offending step in the pool
        issues: Vec<StepDefinitionIssue>,
    },

    /// `MOD` expression not of the form `${arg} = EXPR` or `@{arg} = EXPR`
    #[error("invalid modifier '{0}': expected '${{arg}} = EXPR' or '@{{arg}} = EXPR'")]
    InvalidModifier(String),
}

/// One step with unusable metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinitionIssue {
    /// Scenario name
    pub scenario: String,
    /// Step keyword text
    pub step: String,
    /// What is wrong
    pub reason: String,
}

impl fmt::Display for StepDefinitionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}: {}", self.scenario, self.step, self.reason)
    }
}

fn render(issues: &[StepDefinitionIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_definition_lists_every_issue() {
        let err = ScenarioError::StepDefinition {
            issues: vec![
                StepDefinitionIssue {
                    scenario: "Buy".into(),
                    step: "Given a shop".into(),
                    reason: "no model info".into(),
                },
                StepDefinitionIssue {
                    scenario: "Sell".into(),
                    step: "When selling".into(),
                    reason: "bad expression".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 step definition issue(s):\n  - Buy / Given a shop: no model info\n  - Sell / When selling: bad expression"
        );
    }
}
