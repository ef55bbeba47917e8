//! Fitting scenario variants onto the current model
//!
//! A variant fits when every relevant precondition and postcondition holds
//! as its steps run in order on a working copy of the model. When a
//! `when`/plain step's postcondition does not hold yet, the variant is
//! split: the part before that step is committed and the search looks for
//! other scenarios that bring the model into the required state before the
//! remainder is resumed.

use crate::trace_state::TraceState;
use std::fmt;
use storyline_model::{Bindings, DomainModel};
use storyline_scenario::{Scenario, Step};

/// Why a scenario (or remainder) does not fit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Keyword of the step that failed
    pub step: String,
    /// Expression that failed, if the failure came from one
    pub expression: Option<String>,
    /// What went wrong
    pub reason: String,
}

impl Rejection {
    fn at(step: &Step, expression: &str, reason: impl Into<String>) -> Self {
        Self {
            step: step.keyword.clone(),
            expression: Some(expression.to_string()),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expression {
            Some(expression) => write!(f, "{}: '{expression}' {}", self.step, self.reason),
            None => write!(f, "{}: {}", self.step, self.reason),
        }
    }
}

/// Refinement waiting for its exit conditions
#[derive(Debug, Clone)]
pub struct PendingRefinement {
    /// Candidate under refinement
    pub id: usize,
    /// Steps still to run once the exit conditions hold
    pub remainder: Scenario,
    /// Postconditions of the step that triggered the refinement
    pub exit_conditions: Vec<String>,
    /// Arguments of that step
    pub bindings: Bindings,
    /// Trace length right after the latest part was committed
    pub anchor: usize,
}

/// Result of fitting a variant at the current position
#[derive(Debug, Clone)]
pub enum FitResult {
    /// Whole variant committed
    Inserted,
    /// First part committed; refinement pending
    Partial(PendingRefinement),
    /// Nothing committed
    Rejected(Rejection),
}

/// Result of trying to close a pending refinement
#[derive(Debug, Clone)]
pub enum ExitResult {
    /// Remainder committed as the closing part
    Completed,
    /// Remainder needs another refinement; its next part is committed
    Resplit(PendingRefinement),
    /// Refinement cannot be closed here; nothing committed
    Invalid(Rejection),
}

enum StepsOutcome {
    Passed,
    Rejected(Rejection),
    Refine(usize),
}

/// Fits variants onto the model on top of a [`TraceState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioFitter;

impl ScenarioFitter {
    /// Create a fitter
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Try to commit `variant` for candidate `id` at the current position
    pub fn fit(&self, id: usize, variant: Scenario, state: &mut TraceState) -> FitResult {
        let base = state.model().cloned().unwrap_or_default();
        let mut working = base.clone();
        working.push_scenario_scope();

        match run_steps(&variant, &mut working, true) {
            StepsOutcome::Passed => match close_scope(&variant, working) {
                Ok(model) => {
                    state.confirm_full_scenario(id, variant, model);
                    FitResult::Inserted
                }
                Err(rejection) => FitResult::Rejected(rejection),
            },
            StepsOutcome::Rejected(rejection) => FitResult::Rejected(rejection),
            StepsOutcome::Refine(index) => {
                let mut model = base;
                model.push_scenario_scope();
                tracing::debug!(
                    scenario = %variant.name,
                    step = %variant.steps[index].keyword,
                    "postcondition not met, refining"
                );
                match begin_part(id, &variant, index, model, state) {
                    Ok(pending) => FitResult::Partial(pending),
                    Err(rejection) => FitResult::Rejected(rejection),
                }
            }
        }
    }

    /// Try to close `pending` on top of the latest trace entry
    ///
    /// The exit conditions are checked on a scratch copy first; only when
    /// all of them hold is the remainder run against the live model.
    /// `pending` itself is left for the caller to retire.
    pub fn exit_refinement(&self, pending: &PendingRefinement, state: &mut TraceState) -> ExitResult {
        let model = state.model().cloned().unwrap_or_default();

        let mut scratch = model.clone();
        for expression in &pending.exit_conditions {
            let failure = match scratch.evaluate_str(expression, &pending.bindings) {
                Ok(outcome) if outcome.is_false() => "still False after refinement".to_string(),
                Ok(_) => continue,
                Err(e) => e.to_string(),
            };
            return ExitResult::Invalid(Rejection {
                step: pending.remainder.name.clone(),
                expression: Some(expression.clone()),
                reason: failure,
            });
        }

        let mut working = model.clone();
        match run_steps(&pending.remainder, &mut working, true) {
            StepsOutcome::Passed => match close_scope(&pending.remainder, working) {
                Ok(model) => {
                    let part = state.highest_part(pending.id) + 1;
                    let name = format!("{} (part {part})", pending.remainder.name);
                    state.confirm_full_scenario(pending.id, pending.remainder.clone().renamed(name), model);
                    ExitResult::Completed
                }
                Err(rejection) => ExitResult::Invalid(rejection),
            },
            StepsOutcome::Rejected(rejection) => ExitResult::Invalid(rejection),
            StepsOutcome::Refine(index) => {
                match begin_part(pending.id, &pending.remainder, index, model, state) {
                    Ok(next) => ExitResult::Resplit(next),
                    Err(rejection) => ExitResult::Invalid(rejection),
                }
            }
        }
    }
}

/// Run the relevant expressions of every step in order
///
/// Setup and teardown never refine.
fn run_steps(scenario: &Scenario, model: &mut DomainModel, allow_refinement: bool) -> StepsOutcome {
    let setup = scenario.setup.iter().map(|s| (s, None));
    let regular = scenario.steps.iter().enumerate().map(|(i, s)| (s, Some(i)));
    let teardown = scenario.teardown.iter().map(|s| (s, None));

    for (step, index) in setup.chain(regular).chain(teardown) {
        let bindings = step.bindings();

        for expression in step.relevant_preconditions() {
            match model.evaluate_str(expression, &bindings) {
                Ok(outcome) if outcome.is_false() => {
                    return StepsOutcome::Rejected(Rejection::at(step, expression, "precondition is False"));
                }
                Ok(_) => {}
                Err(e) => return StepsOutcome::Rejected(Rejection::at(step, expression, e.to_string())),
            }
        }

        for expression in step.relevant_postconditions() {
            match model.evaluate_str(expression, &bindings) {
                Ok(outcome) if outcome.is_false() => {
                    return match index {
                        Some(i) if allow_refinement && step.role.may_refine() => StepsOutcome::Refine(i),
                        _ => StepsOutcome::Rejected(Rejection::at(step, expression, "postcondition is False")),
                    };
                }
                Ok(_) => {}
                Err(e) => return StepsOutcome::Rejected(Rejection::at(step, expression, e.to_string())),
            }
        }
    }
    StepsOutcome::Passed
}

fn close_scope(scenario: &Scenario, mut model: DomainModel) -> Result<DomainModel, Rejection> {
    model.pop_scenario_scope().map_err(|e| Rejection {
        step: scenario.name.clone(),
        expression: None,
        reason: e.to_string(),
    })?;
    Ok(model)
}

/// Commit the part of `scenario` before regular step `index`
///
/// `model` must already have the refined scenario's scope open; it stays
/// open until the closing part is committed.
fn begin_part(
    id: usize,
    scenario: &Scenario,
    index: usize,
    mut model: DomainModel,
    state: &mut TraceState,
) -> Result<PendingRefinement, Rejection> {
    let step = &scenario.steps[index];
    let (mut front, mut back) = scenario.split_at_step(index);

    let mut opening = Step::new(format!("Refinement follows for step: {}", step.keyword), step.role);
    opening.args = step.args.clone();
    opening.model_info.preconditions = step.model_info.preconditions.clone();
    front.steps.push(opening);

    back.steps[0].model_info.preconditions.clear();
    back.steps.insert(
        0,
        Step::new(format!("Refinement completed for step: {}", step.keyword), step.role),
    );

    // refinement is disabled for the front part
    if let StepsOutcome::Rejected(rejection) = run_steps(&front, &mut model, false) {
        return Err(rejection);
    }

    let part = state.highest_part(id) + 1;
    front.name = format!("{} (part {part})", scenario.name);
    state.push_partial_scenario(id, front, model);

    Ok(PendingRefinement {
        id,
        remainder: back,
        exit_conditions: step.model_info.postconditions.clone(),
        bindings: step.bindings(),
        anchor: state.len(),
    })
}
