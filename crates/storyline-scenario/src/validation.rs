//! Fail-fast validation of step metadata across a scenario pool

use crate::error::{ScenarioError, StepDefinitionIssue};
use crate::modifier::Modifier;
use crate::scenario::Scenario;
use storyline_model::Expression;

/// Check every step of every scenario before a search begins
///
/// Reports collaborator-supplied extraction errors, unparsable `IN`/`OUT`
/// expressions and malformed `MOD` expressions, all of them at once.
pub fn validate_pool(scenarios: &[Scenario]) -> Result<(), ScenarioError> {
    let mut issues = Vec::new();

    for scenario in scenarios {
        for step in scenario.all_steps() {
            let mut report = |reason: String| {
                issues.push(StepDefinitionIssue {
                    scenario: scenario.name.clone(),
                    step: step.keyword.clone(),
                    reason,
                });
            };

            let info = &step.model_info;
            if let Some(error) = info.error.as_deref().filter(|e| !e.trim().is_empty()) {
                report(error.to_string());
            }
            for expr in info.preconditions.iter().chain(&info.postconditions) {
                if let Err(e) = Expression::parse(expr) {
                    report(format!("'{expr}': {e}"));
                }
            }
            for expr in &info.modifiers {
                if let Err(e) = expr.parse::<Modifier>() {
                    report(e.to_string());
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ScenarioError::StepDefinition { issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Step, StepRole};

    #[test]
    fn clean_pool_passes() {
        let pool = vec![Scenario::new("A", "a").with_step(
            Step::new("When x", StepRole::When)
                .with_in("shop")
                .with_out("shop.open == True")
                .with_mod("${item} = shop.items"),
        )];
        assert!(validate_pool(&pool).is_ok());
    }

    #[test]
    fn every_offending_step_is_listed() {
        let mut broken = Step::new("Given broken", StepRole::Given);
        broken.model_info.error = Some("no model info found".into());

        let pool = vec![
            Scenario::new("A", "a").with_step(broken),
            Scenario::new("B", "b")
                .with_setup(Step::new("Setup", StepRole::None).with_in("a =="))
                .with_step(Step::new("When y", StepRole::When).with_mod("${x} == 1")),
        ];

        let Err(ScenarioError::StepDefinition { issues }) = validate_pool(&pool) else {
            panic!("expected step definition error");
        };
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].scenario, "A");
        assert_eq!(issues[0].reason, "no model info found");
        assert_eq!(issues[1].step, "Setup");
        assert_eq!(issues[2].step, "When y");
    }

    #[test]
    fn blank_error_field_is_ignored() {
        let mut step = Step::new("Given ok", StepRole::Given);
        step.model_info.error = Some("  ".into());
        assert!(validate_pool(&[Scenario::new("A", "a").with_step(step)]).is_ok());
    }
}
