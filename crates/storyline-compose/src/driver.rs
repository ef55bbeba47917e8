//! Composition driver: the outer search loop

use crate::config::ComposeConfig;
use crate::error::{ComposeError, FailureDiagnostic};
use crate::fitter::{ExitResult, FitResult, PendingRefinement, ScenarioFitter};
use crate::observer::{NoopObserver, TraceEvent, TraceEventKind, TraceObserver};
use crate::trace_id::TraceId;
use crate::trace_state::TraceState;
use crate::variant::generate_variant;
use rand::seq::SliceRandom;
use rand::Rng;
use storyline_model::DomainModel;
use storyline_scenario::{validate_pool, Scenario};
use tracing::{debug, info, warn};

/// One entry of a composed trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Position in the input pool, with part numbering
    pub id: TraceId,
    /// Scenario or part as it must be executed
    pub scenario: Scenario,
}

/// Successful composition
#[derive(Debug, Clone)]
pub struct Composition {
    /// Trace entries in execution order
    pub entries: Vec<TraceEntry>,
    /// Seed that reproduces this run, unless unseeded
    pub seed: Option<String>,
    /// Whether scenarios had to be repeated to reach full coverage
    pub repeated: bool,
    /// Model after the last entry
    pub model: DomainModel,
}

impl Composition {
    /// Scenarios and parts in execution order
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.entries.iter().map(|e| &e.scenario)
    }

    /// Display names in execution order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scenarios().map(|s| s.name.as_str()).collect()
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trace is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassEnd {
    Covered,
    Exhausted,
    IterationLimit,
}

struct Pass {
    state: TraceState,
    pending: Vec<PendingRefinement>,
    allow_repeats: bool,
    iterations: usize,
}

impl Pass {
    fn new(scenario_count: usize, allow_repeats: bool) -> Self {
        Self {
            state: TraceState::new(scenario_count),
            pending: Vec::new(),
            allow_repeats,
            iterations: 0,
        }
    }

    fn is_done(&self) -> bool {
        self.state.coverage_reached() && self.pending.is_empty()
    }

    /// Pending refinements whose parts were rewound are gone
    ///
    /// A refinement that was split again keeps its earlier pending entries
    /// below the latest one until it completes.
    fn prune_pending(&mut self) {
        let len = self.state.len();
        self.pending.retain(|p| p.anchor <= len);
    }
}

/// Backtracking search for a trace covering every scenario
pub struct Composer<O = NoopObserver> {
    config: ComposeConfig,
    fitter: ScenarioFitter,
    observer: O,
}

impl Composer<NoopObserver> {
    /// Composer without an observer
    #[must_use]
    pub fn new(config: ComposeConfig) -> Self {
        Self {
            config,
            fitter: ScenarioFitter::new(),
            observer: NoopObserver,
        }
    }
}

impl<O: TraceObserver> Composer<O> {
    /// Report trace changes to `observer`
    #[must_use]
    pub fn with_observer<P: TraceObserver>(self, observer: P) -> Composer<P> {
        Composer {
            config: self.config,
            fitter: self.fitter,
            observer,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Observer receiving trace changes
    #[inline]
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Compose one trace covering every scenario in `scenarios`
    ///
    /// The pool is validated up front, shuffled once with the seeded
    /// generator and searched without repetitions first. Only when that
    /// pass fails is a fresh pass with repetitions attempted.
    pub fn compose(&mut self, scenarios: &[Scenario]) -> Result<Composition, ComposeError> {
        self.config.validate()?;
        validate_pool(scenarios)?;

        let (mut rng, seed) = self.config.seed.build_rng();
        match &seed {
            Some(seed) => info!(seed = %seed, scenarios = scenarios.len(), "composing trace"),
            None => info!(scenarios = scenarios.len(), "composing trace without seed"),
        }

        let mut order: Vec<usize> = (0..scenarios.len()).collect();
        order.shuffle(&mut rng);
        let pool: Vec<Scenario> = order.iter().map(|&i| scenarios[i].clone()).collect();

        let mut pass = Pass::new(pool.len(), false);
        let mut end = self.run_pass(&pool, &mut pass, &mut rng);
        if end != PassEnd::Covered {
            info!(
                covered = pass.state.covered_count(),
                total = pool.len(),
                "no trace without repetitions, allowing repeated scenarios"
            );
            pass = Pass::new(pool.len(), true);
            end = self.run_pass(&pool, &mut pass, &mut rng);
        }

        match end {
            PassEnd::Covered => Ok(Composition {
                entries: pass
                    .state
                    .snapshots()
                    .iter()
                    .map(|s| TraceEntry {
                        id: s.id.map(|i| order[i]),
                        scenario: s.scenario.clone(),
                    })
                    .collect(),
                seed,
                repeated: pass.allow_repeats,
                model: pass.state.model().cloned().unwrap_or_default(),
            }),
            PassEnd::Exhausted => Err(ComposeError::SearchExhausted(Box::new(diagnose(&pass.state, &pool)))),
            PassEnd::IterationLimit => Err(ComposeError::IterationLimit {
                iterations: pass.iterations,
                diagnostic: Box::new(diagnose(&pass.state, &pool)),
            }),
        }
    }

    fn run_pass<R: Rng + ?Sized>(&mut self, pool: &[Scenario], pass: &mut Pass, rng: &mut R) -> PassEnd {
        info!(repeats = pass.allow_repeats, "search pass started");

        while !pass.is_done() {
            if pass.iterations >= self.config.max_iterations {
                warn!(iterations = pass.iterations, "iteration limit reached, aborting pass");
                return PassEnd::IterationLimit;
            }
            pass.iterations += 1;

            let Some(candidate) = pass.state.next_candidate(pass.allow_repeats) else {
                if !pass.state.can_rewind() {
                    info!(iterations = pass.iterations, "search pass exhausted");
                    return PassEnd::Exhausted;
                }
                debug!(position = pass.state.len(), "no candidate left, rewinding");
                self.backtrack(pass);
                continue;
            };

            self.attempt(candidate, pool, pass, rng);

            if pass.state.coverage_drought() > self.config.drought_limit {
                warn!(
                    drought = pass.state.coverage_drought(),
                    limit = self.config.drought_limit,
                    "coverage drought, rewinding to last coverage gain"
                );
                while pass.state.coverage_drought() > 0 && pass.state.can_rewind() {
                    self.backtrack(pass);
                }
            }
        }

        info!(
            entries = pass.state.len(),
            iterations = pass.iterations,
            "search pass reached full coverage"
        );
        PassEnd::Covered
    }

    fn attempt<R: Rng + ?Sized>(&mut self, candidate: usize, pool: &[Scenario], pass: &mut Pass, rng: &mut R) {
        let source = &pool[candidate];
        let mut variant = match generate_variant(source, pass.state.model(), rng) {
            Ok(variant) => variant,
            Err(e) => {
                debug!(scenario = %source.name, error = %e, "no variant available");
                pass.state.reject_scenario(candidate);
                return;
            }
        };

        let occurrence = pass.state.count(candidate) + 1;
        if occurrence > 1 {
            variant.name = format!("{} (rep {occurrence})", variant.name);
        }

        let covered = pass.state.covered_count();
        match self.fitter.fit(candidate, variant, &mut pass.state) {
            FitResult::Rejected(rejection) => {
                debug!(scenario = %source.name, reason = %rejection, "candidate rejected");
                pass.state.reject_scenario(candidate);
            }
            FitResult::Partial(pending) => {
                debug!(scenario = %source.name, part = pass.state.highest_part(candidate), "refinement opened");
                pass.pending.push(pending);
                self.notify(TraceEventKind::Committed, &pass.state);
            }
            FitResult::Inserted => {
                debug!(scenario = %source.name, position = pass.state.len(), "candidate inserted");
                self.notify(TraceEventKind::Committed, &pass.state);
                if pass.state.covered_count() == covered && repeats_previous(&pass.state) {
                    debug!(scenario = %source.name, "repeated insertion without effect, rewinding");
                    self.backtrack(pass);
                    return;
                }
                self.close_refinements(pass);
            }
        }
    }

    /// Close every open refinement whose part is no longer on top
    ///
    /// An inner insertion that leaves the exit conditions unmet is rewound
    /// on its own; it stays tried on top of the part, so the next inner
    /// candidate gets its turn there.
    fn close_refinements(&mut self, pass: &mut Pass) {
        while let Some(pending) = pass.pending.last().filter(|p| pass.state.len() > p.anchor) {
            let (id, anchor) = (pending.id, pending.anchor);
            match self.fitter.exit_refinement(pending, &mut pass.state) {
                ExitResult::Completed => {
                    debug!(id, "refinement completed");
                    pass.pending.retain(|p| p.id != id);
                    self.notify(TraceEventKind::Committed, &pass.state);
                }
                ExitResult::Resplit(next) => {
                    debug!(id, part = pass.state.highest_part(id), "refinement continued");
                    pass.pending.push(next);
                    self.notify(TraceEventKind::Committed, &pass.state);
                    break;
                }
                ExitResult::Invalid(rejection) => {
                    debug!(id, reason = %rejection, "exit conditions unmet, rewinding inner insertion");
                    self.rewind_to(anchor, pass);
                    break;
                }
            }
        }
    }

    /// Undo the latest trace position
    ///
    /// A later part of a refinement goes together with the inner insertion
    /// that let it begin, which reopens the previous part.
    fn backtrack(&mut self, pass: &mut Pass) {
        let Some(choice) = pass.state.last_choice() else {
            return;
        };
        self.rewind_entry(pass);
        if matches!(choice, TraceId::Part(_, k) if k > 1) {
            let id = choice.scenario();
            if let Some(anchor) = pass.pending.last().filter(|p| p.id == id).map(|p| p.anchor) {
                self.rewind_to(anchor, pass);
            }
        }
    }

    fn rewind_to(&mut self, len: usize, pass: &mut Pass) {
        while pass.state.len() > len {
            self.rewind_entry(pass);
        }
    }

    fn rewind_entry(&mut self, pass: &mut Pass) {
        pass.state.rewind();
        self.notify(TraceEventKind::Rewound, &pass.state);
        pass.prune_pending();
    }

    fn notify(&mut self, kind: TraceEventKind, state: &TraceState) {
        let top = state.top();
        self.observer.on_update(&TraceEvent {
            kind,
            entry: top.map(|s| s.id),
            scenario: top.map(|s| &s.scenario),
            model: top.map(|s| &s.model),
            trace_len: state.len(),
        });
    }
}

impl<O> std::fmt::Debug for Composer<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Latest insertion repeats the one before it: same scenario, same model
fn repeats_previous(state: &TraceState) -> bool {
    match state.snapshots() {
        [.., previous, last] => {
            previous.id.scenario() == last.id.scenario() && previous.model == last.model
        }
        _ => false,
    }
}

fn diagnose(state: &TraceState, pool: &[Scenario]) -> FailureDiagnostic {
    FailureDiagnostic {
        trace: state.snapshots().iter().map(|s| s.scenario.name.clone()).collect(),
        rejected: state.tried().into_iter().flatten().map(|&i| pool[i].name.clone()).collect(),
        uncovered: state
            .coverage()
            .iter()
            .zip(pool)
            .filter(|(covered, _)| !**covered)
            .map(|(_, s)| s.name.clone())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedOption;
    use pretty_assertions::assert_eq;
    use storyline_scenario::{Step, StepRole};

    fn seeded(seed: &str) -> Composer {
        Composer::new(ComposeConfig::default().with_seed(SeedOption::parse(seed)))
    }

    fn plain(name: &str) -> Scenario {
        Scenario::new(name, name).with_step(Step::new(format!("When {name}"), StepRole::When))
    }

    #[test]
    fn empty_pool_gives_empty_trace() {
        let composition = seeded("1").compose(&[]).unwrap();
        assert!(composition.is_empty());
        assert_eq!(composition.seed.as_deref(), Some("1"));
    }

    #[test]
    fn unconstrained_pool_is_a_permutation() {
        let pool = vec![plain("A"), plain("B"), plain("C")];
        let composition = seeded("3").compose(&pool).unwrap();
        let mut names = composition.names();
        names.sort_unstable();
        assert_eq!(names, ["A", "B", "C"]);
        assert!(!composition.repeated);
    }

    #[test]
    fn entry_ids_refer_to_input_positions() {
        let pool = vec![plain("A"), plain("B"), plain("C")];
        let composition = seeded("9").compose(&pool).unwrap();
        for entry in &composition.entries {
            assert_eq!(pool[entry.id.scenario()].name, entry.scenario.name);
        }
    }

    #[test]
    fn repeats_previous_compares_scenario_and_model() {
        let mut state = TraceState::new(2);
        assert!(!repeats_previous(&state));
        state.confirm_full_scenario(0, plain("A"), DomainModel::new());
        state.confirm_full_scenario(0, plain("A"), DomainModel::new());
        assert!(repeats_previous(&state));
        state.confirm_full_scenario(1, plain("B"), DomainModel::new());
        assert!(!repeats_previous(&state));
    }

    #[test]
    fn unsatisfiable_pool_is_diagnosed() {
        let never = Scenario::new("Never", "never")
            .with_step(Step::new("Given the impossible", StepRole::Given).with_in("1 == 2"));
        let err = seeded("5").compose(&[plain("A"), never]).unwrap_err();
        let ComposeError::SearchExhausted(diagnostic) = err else {
            panic!("expected exhaustion");
        };
        assert!(diagnostic.uncovered.contains(&"Never".to_string()));
        assert_eq!(diagnostic.rejected.len(), 2);
    }

    #[test]
    fn step_definition_errors_stop_before_search() {
        let mut step = Step::new("Given", StepRole::Given);
        step.model_info.error = Some("missing model info".into());
        let err = seeded("5").compose(&[Scenario::new("A", "a").with_step(step)]).unwrap_err();
        assert!(matches!(err, ComposeError::StepDefinition(_)));
    }
}
