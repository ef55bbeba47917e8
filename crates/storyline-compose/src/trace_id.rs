//! Identifiers of trace positions

use std::fmt;

/// Choice recorded at one trace position
///
/// Scenario indices refer to the (shuffled) candidate pool. A refined
/// scenario appears as parts `N.1`, `N.2`, ... and is closed by `N.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceId {
    /// Whole scenario inserted in one go
    Plain(usize),
    /// Part `k` (1-based) of a scenario under refinement
    Part(usize, usize),
    /// Final part completing a refinement
    PartDone(usize),
}

impl TraceId {
    /// Scenario index this entry belongs to
    #[inline]
    #[must_use]
    pub fn scenario(self) -> usize {
        match self {
            Self::Plain(id) | Self::Part(id, _) | Self::PartDone(id) => id,
        }
    }

    /// Whether this entry completes a scenario
    #[inline]
    #[must_use]
    pub fn is_completion(self) -> bool {
        matches!(self, Self::Plain(_) | Self::PartDone(_))
    }

    /// Whether this entry opens a new trace position
    #[inline]
    #[must_use]
    pub fn opens_position(self) -> bool {
        matches!(self, Self::Plain(_) | Self::Part(_, 1))
    }

    /// Same entry with the scenario index mapped
    #[must_use]
    pub fn map(self, f: impl FnOnce(usize) -> usize) -> Self {
        match self {
            Self::Plain(id) => Self::Plain(f(id)),
            Self::Part(id, k) => Self::Part(f(id), k),
            Self::PartDone(id) => Self::PartDone(f(id)),
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(id) => write!(f, "{id}"),
            Self::Part(id, k) => write!(f, "{id}.{k}"),
            Self::PartDone(id) => write!(f, "{id}.0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_dotted_parts() {
        assert_eq!(TraceId::Plain(3).to_string(), "3");
        assert_eq!(TraceId::Part(3, 2).to_string(), "3.2");
        assert_eq!(TraceId::PartDone(3).to_string(), "3.0");
    }

    #[test]
    fn classification() {
        assert!(TraceId::Plain(0).opens_position());
        assert!(TraceId::Part(0, 1).opens_position());
        assert!(!TraceId::Part(0, 2).opens_position());
        assert!(!TraceId::PartDone(0).opens_position());
        assert!(TraceId::PartDone(0).is_completion());
        assert!(!TraceId::Part(0, 1).is_completion());
        assert_eq!(TraceId::Part(1, 2).map(|i| i + 10), TraceId::Part(11, 2));
    }
}
