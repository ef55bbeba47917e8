//! Error types for the constraint solver

/// Constraint solver errors
///
/// All of them make the current scenario variant infeasible; the search
/// rejects the candidate and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// An option set would become (or start) empty
    #[error("constraint is infeasible: no option left")]
    Infeasible,

    /// No concrete value remains for a registered example value
    #[error("no option left for example value '{example}'")]
    InfeasibleExample {
        /// Example value whose options ran out
        example: String,
    },
}

impl SolverError {
    /// Attach the example value a bare option-set failure belongs to
    #[must_use]
    pub fn for_example(self, example: &str) -> Self {
        match self {
            Self::Infeasible => Self::InfeasibleExample {
                example: example.to_string(),
            },
            other => other,
        }
    }
}
