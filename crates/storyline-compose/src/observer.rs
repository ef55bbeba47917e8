//! Progress notifications from the search

use crate::trace_id::TraceId;
use storyline_model::DomainModel;
use storyline_scenario::Scenario;

/// What happened to the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEventKind {
    /// An entry was committed
    Committed,
    /// An entry was undone
    Rewound,
}

/// Trace position after a commit or rewind
#[derive(Debug, Clone, Copy)]
pub struct TraceEvent<'a> {
    /// Commit or rewind
    pub kind: TraceEventKind,
    /// Entry now on top of the trace
    pub entry: Option<TraceId>,
    /// Scenario or part now on top of the trace
    pub scenario: Option<&'a Scenario>,
    /// Model now current
    pub model: Option<&'a DomainModel>,
    /// Trace length after the change
    pub trace_len: usize,
}

/// Receives every committed or rewound trace position
pub trait TraceObserver {
    /// Called after the trace changed
    fn on_update(&mut self, event: &TraceEvent<'_>);
}

/// Ignores all events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TraceObserver for NoopObserver {
    #[inline]
    fn on_update(&mut self, _event: &TraceEvent<'_>) {}
}

/// Logs every event at debug level, the model state at trace level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TraceObserver for TracingObserver {
    fn on_update(&mut self, event: &TraceEvent<'_>) {
        let entry = event.entry.map(|id| id.to_string()).unwrap_or_default();
        let scenario = event.scenario.map_or("", |s| s.name.as_str());
        tracing::debug!(
            kind = ?event.kind,
            entry = %entry,
            scenario = %scenario,
            trace_len = event.trace_len,
            "trace updated"
        );
        if let Some(model) = event.model {
            tracing::trace!(model = %model.status(), "model state");
        }
    }
}

impl<O: TraceObserver + ?Sized> TraceObserver for &mut O {
    fn on_update(&mut self, event: &TraceEvent<'_>) {
        (**self).on_update(event);
    }
}
