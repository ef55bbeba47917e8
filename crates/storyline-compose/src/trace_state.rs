//! Backtracking ledger of the search
//!
//! The ledger records, per trace position, which candidates were already
//! tried there, plus the chosen entries and the model snapshot after each
//! of them. Rewinding restores the previous snapshot exactly; nothing is
//! ever undone by reverse-applying effects.

use crate::trace_id::TraceId;
use std::collections::BTreeSet;
use storyline_model::DomainModel;
use storyline_scenario::Scenario;

/// State of the search after one trace entry
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Entry that produced this state
    pub id: TraceId,
    /// Scenario (or part) as executed, with substituted arguments
    pub scenario: Scenario,
    /// Model after the entry
    pub model: DomainModel,
    /// Consecutive insertions without new coverage, up to this entry
    pub drought: usize,
}

/// Coverage, tried sets, choices and snapshots of one search pass
#[derive(Debug, Clone)]
pub struct TraceState {
    coverage: Vec<bool>,
    tried: Vec<BTreeSet<usize>>,
    choices: Vec<TraceId>,
    snapshots: Vec<Snapshot>,
}

impl TraceState {
    /// Empty ledger for a pool of `scenario_count` candidates
    #[must_use]
    pub fn new(scenario_count: usize) -> Self {
        Self {
            coverage: vec![false; scenario_count],
            tried: vec![BTreeSet::new()],
            choices: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    /// Number of trace entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Whether the trace is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Whether every candidate has completed at least once
    #[must_use]
    pub fn coverage_reached(&self) -> bool {
        self.coverage.iter().all(|&covered| covered)
    }

    /// Number of candidates completed at least once
    #[must_use]
    pub fn covered_count(&self) -> usize {
        self.coverage.iter().filter(|&&covered| covered).count()
    }

    /// Coverage flag per candidate
    #[inline]
    #[must_use]
    pub fn coverage(&self) -> &[bool] {
        &self.coverage
    }

    /// Entries chosen so far
    #[inline]
    #[must_use]
    pub fn choices(&self) -> &[TraceId] {
        &self.choices
    }

    /// Snapshot per entry
    #[inline]
    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Latest snapshot
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Model after the latest entry; `None` before the first insertion
    #[inline]
    #[must_use]
    pub fn model(&self) -> Option<&DomainModel> {
        self.top().map(|s| &s.model)
    }

    /// Latest entry
    #[inline]
    #[must_use]
    pub fn last_choice(&self) -> Option<TraceId> {
        self.choices.last().copied()
    }

    /// Candidates already tried at the current position
    ///
    /// The root position is never closed, so this is `Some` for any ledger
    /// built with [`TraceState::new`].
    #[inline]
    #[must_use]
    pub fn tried(&self) -> Option<&BTreeSet<usize>> {
        self.tried.last()
    }

    /// Insertions without new coverage since the last coverage gain
    #[must_use]
    pub fn coverage_drought(&self) -> usize {
        self.top().map_or(0, |s| s.drought)
    }

    /// Whether there is anything to rewind
    #[inline]
    #[must_use]
    pub fn can_rewind(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Completed occurrences of a candidate in the trace
    #[must_use]
    pub fn count(&self, id: usize) -> usize {
        self.choices
            .iter()
            .filter(|c| c.is_completion() && c.scenario() == id)
            .count()
    }

    /// Number of the latest part of an open refinement of `id`, or 0
    #[must_use]
    pub fn highest_part(&self, id: usize) -> usize {
        for choice in self.choices.iter().rev() {
            match *choice {
                TraceId::Part(i, k) if i == id => return k,
                TraceId::Plain(i) | TraceId::PartDone(i) if i == id => return 0,
                _ => {}
            }
        }
        0
    }

    /// Whether `id` has a refinement in progress
    #[inline]
    #[must_use]
    pub fn is_refinement_active(&self, id: usize) -> bool {
        self.highest_part(id) > 0
    }

    /// Lowest-index candidate to try next at the current position
    ///
    /// Uncovered candidates come first. With `allow_retry`, already covered
    /// ones follow. Candidates under refinement are never offered.
    #[must_use]
    pub fn next_candidate(&self, allow_retry: bool) -> Option<usize> {
        let tried = self.tried()?;
        let open = |&id: &usize| !tried.contains(&id) && !self.is_refinement_active(id);
        let uncovered = (0..self.coverage.len()).filter(|&id| !self.coverage[id]).find(open);
        if uncovered.is_some() || !allow_retry {
            return uncovered;
        }
        (0..self.coverage.len()).find(open)
    }

    /// Record that `id` does not fit at the current position
    pub fn reject_scenario(&mut self, id: usize) {
        if let Some(tried) = self.tried.last_mut() {
            tried.insert(id);
        }
    }

    /// Commit a complete scenario (or the closing part of a refinement)
    pub fn confirm_full_scenario(&mut self, id: usize, scenario: Scenario, model: DomainModel) {
        let drought = if self.coverage[id] {
            self.coverage_drought() + 1
        } else {
            self.coverage[id] = true;
            0
        };
        let choice = if self.is_refinement_active(id) {
            TraceId::PartDone(id)
        } else {
            self.open_position(id);
            TraceId::Plain(id)
        };
        self.push(choice, scenario, model, drought);
    }

    /// Commit a part of a scenario under refinement
    pub fn push_partial_scenario(&mut self, id: usize, scenario: Scenario, model: DomainModel) {
        let drought = self.coverage_drought();
        let part = self.highest_part(id);
        let choice = if part > 0 {
            TraceId::Part(id, part + 1)
        } else {
            self.open_position(id);
            TraceId::Part(id, 1)
        };
        self.push(choice, scenario, model, drought);
    }

    /// Undo the latest entry and return the snapshot that is current again
    ///
    /// Rewinding the closing part of a refinement takes the whole refined
    /// unit with it, back to and including its first part.
    pub fn rewind(&mut self) -> Option<&Snapshot> {
        let last = self.choices.pop()?;
        self.snapshots.pop();

        match last {
            TraceId::PartDone(id) => {
                self.uncover_if_gone(id);
                while let Some(choice) = self.last_choice() {
                    self.rewind();
                    if choice == TraceId::Part(id, 1) {
                        break;
                    }
                }
            }
            TraceId::Plain(id) => {
                self.tried.pop();
                self.uncover_if_gone(id);
            }
            TraceId::Part(_, 1) => {
                self.tried.pop();
            }
            TraceId::Part(..) => {}
        }
        debug_assert!(!self.tried.is_empty(), "root position closed");
        self.top()
    }

    fn open_position(&mut self, id: usize) {
        self.reject_scenario(id);
        self.tried.push(BTreeSet::new());
    }

    fn uncover_if_gone(&mut self, id: usize) {
        if self.count(id) == 0 {
            self.coverage[id] = false;
        }
    }

    fn push(&mut self, id: TraceId, scenario: Scenario, model: DomainModel, drought: usize) {
        tracing::trace!(entry = %id, scenario = %scenario.name, drought, "trace entry committed");
        self.choices.push(id);
        self.snapshots.push(Snapshot {
            id,
            scenario,
            model,
            drought,
        });
    }
}
