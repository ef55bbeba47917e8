//! Error types for trace composition

use std::fmt;
use storyline_model::ModelError;
use storyline_scenario::ScenarioError;
use storyline_solver::SolverError;

/// Composition errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComposeError {
    /// Step metadata unusable; raised before any search starts
    #[error(transparent)]
    StepDefinition(#[from] ScenarioError),

    /// Neither the direct pass nor the pass with repetitions reached full coverage
    #[error("unable to compose a consistent trace: {0}")]
    SearchExhausted(Box<FailureDiagnostic>),

    /// The search was stopped by the iteration bound
    #[error("search aborted after {iterations} iterations: {diagnostic}")]
    IterationLimit {
        /// Iterations spent in the aborted pass
        iterations: usize,
        /// State of the search when it was aborted
        diagnostic: Box<FailureDiagnostic>,
    },

    /// Invalid engine configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Where the search stood when it gave up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureDiagnostic {
    /// Names of the entries in the final trace
    pub trace: Vec<String>,
    /// Scenarios tried and rejected at the last open position
    pub rejected: Vec<String>,
    /// Scenarios never covered
    pub uncovered: Vec<String>,
}

impl fmt::Display for FailureDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uncovered [{}]; trace so far [{}]; rejected at last position [{}]",
            self.uncovered.join(", "),
            self.trace.join(", "),
            self.rejected.join(", ")
        )
    }
}

/// Reasons a scenario variant could not be generated
///
/// Never fatal: the candidate is rejected at the current position.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VariantError {
    /// `MOD` expression did not parse as a modifier
    #[error(transparent)]
    Modifier(#[from] ScenarioError),

    /// Evaluating a modifier failed against the current model
    #[error("modifier '{expression}' failed: {source}")]
    Model {
        /// Offending expression
        expression: String,
        /// Model error
        source: ModelError,
    },

    /// Modifier ran as a statement instead of producing options
    #[error("modifier '{expression}' does not produce options")]
    NotAnOptionSet {
        /// Offending expression
        expression: String,
    },

    /// No consistent assignment of example values exists
    #[error(transparent)]
    Solver(#[from] SolverError),
}
