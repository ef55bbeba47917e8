//! Scenario variants: concrete argument values chosen through the solver

use crate::error::VariantError;
use rand::Rng;
use storyline_model::{ArgValue, DomainModel, Outcome, Value};
use storyline_scenario::{Modifier, Scenario, Step, StepRole};
use storyline_solver::SubstitutionMap;

/// Produce a copy of `scenario` with its example values resolved
///
/// Every scalar `MOD` narrows the options of the targeted argument's
/// example value; a `then` step merely fixes an example value it is the
/// first to mention. Variadic modifiers replace the argument's items
/// directly. Modifiers are evaluated on a scratch copy of `model`, so the
/// live model is never touched.
pub fn generate_variant<R: Rng + ?Sized>(
    scenario: &Scenario,
    model: Option<&DomainModel>,
    rng: &mut R,
) -> Result<Scenario, VariantError> {
    let mut scratch = model.cloned().unwrap_or_default();
    scratch.push_scenario_scope();

    let mut subs = SubstitutionMap::new();
    let mut replaced_lists = Vec::new();

    for (step_index, step) in scenario.all_steps().enumerate() {
        for text in &step.model_info.modifiers {
            let modifier: Modifier = text.parse()?;
            let Some(arg) = step.argument(&modifier.target) else {
                continue;
            };
            if arg.is_default {
                continue;
            }

            if modifier.variadic {
                let items = option_set(&mut scratch, &modifier, step)?
                    .into_iter()
                    .map(|v| v.to_string())
                    .collect();
                replaced_lists.push((step_index, modifier.target, ArgValue::List(items)));
                continue;
            }

            let Some(example) = arg.example_value() else {
                continue;
            };
            if step.role == StepRole::Then {
                subs.define(example);
                continue;
            }
            let options = option_set(&mut scratch, &modifier, step)?;
            subs.narrow(example, options)?;
        }
    }

    let solution = subs.solve(rng)?;

    let mut variant = scenario.clone();
    for step in variant.all_steps_mut() {
        for arg in step.args.iter_mut().filter(|a| !a.is_default) {
            if let Some(value) = arg.example_value().and_then(|e| solution.get(e)) {
                arg.value = ArgValue::Scalar(value.to_string());
            }
        }
    }
    for (step_index, target, items) in replaced_lists {
        if let Some(arg) = variant
            .all_steps_mut()
            .nth(step_index)
            .and_then(|s| s.argument_mut(&target))
        {
            arg.value = items;
        }
    }
    variant.data_choices = solution
        .iter()
        .map(|(example, value)| (example.clone(), value.to_string()))
        .collect();

    tracing::trace!(scenario = %scenario.name, choices = ?variant.data_choices, "variant generated");
    Ok(variant)
}

fn option_set(
    model: &mut DomainModel,
    modifier: &Modifier,
    step: &Step,
) -> Result<Vec<Value>, VariantError> {
    let expression = || modifier.constraint.source().to_string();
    match model.evaluate(&modifier.constraint, &step.bindings()) {
        Ok(Outcome::Value(value)) => Ok(value.into_options()),
        Ok(Outcome::Executed) => Err(VariantError::NotAnOptionSet {
            expression: expression(),
        }),
        Err(source) => Err(VariantError::Model {
            expression: expression(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use storyline_scenario::StepArgument;
    use storyline_solver::SolverError;

    fn shop() -> DomainModel {
        let mut model = DomainModel::new();
        for stmt in ["new shelf", "shelf.items = ['apple', 'pear', 'plum']"] {
            model.evaluate_str(stmt, &Default::default()).unwrap();
        }
        model
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn buying(mod_text: &str) -> Scenario {
        Scenario::new("Buy", "buy")
            .with_step(
                Step::new("When buying apple", StepRole::When)
                    .with_arg(StepArgument::scalar("fruit", "apple"))
                    .with_mod(mod_text),
            )
            .with_step(
                Step::new("Then apple is in the basket", StepRole::Then)
                    .with_arg(StepArgument::scalar("item", "apple")),
            )
    }

    #[test]
    fn scenario_without_modifiers_is_copied() {
        let scenario = buying("${fruit} = ['apple']");
        let mut plain = scenario.clone();
        plain.steps[0].model_info.modifiers.clear();
        let variant = generate_variant(&plain, None, &mut rng()).unwrap();
        assert_eq!(variant, plain);
    }

    #[test]
    fn chosen_value_replaces_every_use_of_the_example() {
        let variant = generate_variant(&buying("${fruit} = shelf.items"), Some(&shop()), &mut rng()).unwrap();
        let chosen = variant.data_choices["apple"].clone();
        assert!(["apple", "pear", "plum"].contains(&chosen.as_str()));
        assert_eq!(variant.steps[0].args[0].value, ArgValue::Scalar(chosen.clone()));
        assert_eq!(variant.steps[1].args[0].value, ArgValue::Scalar(chosen));
        // originals are kept for the next variant
        assert_eq!(variant.steps[0].args[0].example.as_deref(), Some("apple"));
    }

    #[test]
    fn distinct_examples_get_distinct_values() {
        let scenario = Scenario::new("Swap", "swap").with_step(
            Step::new("When swapping apple for pear", StepRole::When)
                .with_arg(StepArgument::scalar("a", "apple"))
                .with_arg(StepArgument::scalar("b", "pear"))
                .with_mod("${a} = shelf.items")
                .with_mod("${b} = shelf.items"),
        );
        let model = shop();
        for seed in 0..20 {
            let variant = generate_variant(&scenario, Some(&model), &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_ne!(variant.data_choices["apple"], variant.data_choices["pear"]);
        }
    }

    #[test]
    fn then_step_only_fixes_its_first_mention() {
        let scenario = Scenario::new("Check", "check").with_step(
            Step::new("Then kiwi is missing", StepRole::Then)
                .with_arg(StepArgument::scalar("fruit", "kiwi"))
                .with_mod("${fruit} = shelf.items"),
        );
        let variant = generate_variant(&scenario, Some(&shop()), &mut rng()).unwrap();
        assert_eq!(variant.data_choices["kiwi"], "kiwi");
    }

    #[test]
    fn empty_intersection_is_infeasible() {
        let mut scenario = buying("${fruit} = ['apple', 'pear']");
        scenario.steps[1] = Step::new("When also", StepRole::When)
            .with_arg(StepArgument::scalar("fruit", "apple"))
            .with_mod("${fruit} = ['kiwi']");
        let err = generate_variant(&scenario, None, &mut rng()).unwrap_err();
        assert_eq!(
            err,
            VariantError::Solver(SolverError::InfeasibleExample {
                example: "apple".into()
            })
        );
    }

    #[test]
    fn default_and_unknown_targets_are_skipped() {
        let scenario = Scenario::new("Defaults", "d").with_step(
            Step::new("When defaulted", StepRole::When)
                .with_arg(StepArgument::scalar("fruit", "apple").defaulted())
                .with_mod("${fruit} = ['pear']")
                .with_mod("${missing} = ['pear']"),
        );
        let variant = generate_variant(&scenario, None, &mut rng()).unwrap();
        assert_eq!(variant.steps[0].args[0].value, ArgValue::Scalar("apple".into()));
        assert!(variant.data_choices.is_empty());
    }

    #[test]
    fn variadic_modifier_replaces_items() {
        let scenario = Scenario::new("Fill", "fill").with_step(
            Step::new("When filling", StepRole::When)
                .with_arg(StepArgument::list("fruits", ["x"]))
                .with_mod("@{fruits} = shelf.items"),
        );
        let variant = generate_variant(&scenario, Some(&shop()), &mut rng()).unwrap();
        assert_eq!(
            variant.steps[0].args[0].value,
            ArgValue::List(vec!["apple".into(), "pear".into(), "plum".into()])
        );
    }

    #[test]
    fn failing_modifier_is_reported() {
        let err = generate_variant(&buying("${fruit} = shelf.items"), None, &mut rng()).unwrap_err();
        assert!(matches!(err, VariantError::Model { .. }));
        let err = generate_variant(&buying("${fruit} = new crate"), None, &mut rng()).unwrap_err();
        assert!(matches!(err, VariantError::NotAnOptionSet { .. }));
    }

    #[test]
    fn live_model_is_untouched() {
        let model = shop();
        let scenario = buying("${fruit} = shelf.items + [apple]");
        let _ = generate_variant(&scenario, Some(&model), &mut rng());
        assert!(model.alias("apple").is_none());
    }
}
