//! Error types for the domain model
//!
//! Every [`ModelError`] is a model consistency error: the search treats it
//! as a reason to reject the scenario under evaluation, never as fatal.

use std::fmt;

/// Errors raised while evaluating an expression against a [`crate::DomainModel`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Name is already a declared term or a bound literal alias
    #[error("naming conflict: '{name}' is already in use")]
    NamingConflict {
        /// Conflicting name
        name: String,
    },

    /// Reference to a term that was never declared (or was deleted)
    #[error("undeclared term: '{name}'")]
    UndeclaredTerm {
        /// Unresolved name
        name: String,
    },

    /// Attribute read before it was ever assigned
    #[error("attribute '{attribute}' of '{term}' is not set")]
    AttributeUnset {
        /// Owning term
        term: String,
        /// Missing attribute
        attribute: String,
    },

    /// `scenario` namespace used outside an open scenario scope
    #[error("scenario namespace used outside of a scenario scope")]
    ScopeInactive,

    /// Placeholder names an argument the step does not bind
    #[error("unbound argument placeholder: '{name}'")]
    UnboundArgument {
        /// Placeholder name
        name: String,
    },

    /// Operator applied to incompatible values
    #[error("type error: {0}")]
    Type(String),

    /// Integer division or modulo by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Expression text could not be parsed
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),
}

impl ModelError {
    /// Create a type error
    #[inline]
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    /// Whether this error reflects the model's state rather than a malformed expression
    ///
    /// Syntax errors are caught before the search starts; everything else
    /// surfaces while fitting and only rejects the current candidate.
    #[inline]
    #[must_use]
    pub fn is_consistency(&self) -> bool {
        !matches!(self, Self::Syntax(_))
    }
}

/// Classification of parse failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorCode {
    /// Nothing but whitespace
    EmptyExpression,
    /// Character the lexer does not understand
    UnexpectedCharacter,
    /// String literal or placeholder missing its closing delimiter
    Unterminated,
    /// Token out of place
    UnexpectedToken,
    /// Left-hand side of an assignment is not an attribute
    InvalidAssignmentTarget,
    /// Integer literal does not fit in 64 bits
    IntegerOverflow,
}

/// Parse failure with the byte offset where it was detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Failure class
    pub code: ParseErrorCode,
    /// Human-readable description
    pub message: String,
    /// Byte offset into the source text
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn new(code: ParseErrorCode, message: impl Into<String>, offset: usize) -> Self {
        Self {
            code,
            message: message.into(),
            offset,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at offset {}: {}", self.code, self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_are_not_consistency_errors() {
        let err = ModelError::from(ParseError::new(ParseErrorCode::UnexpectedToken, "x", 0));
        assert!(!err.is_consistency());
        assert!(ModelError::ScopeInactive.is_consistency());
    }

    #[test]
    fn parse_error_display_includes_offset() {
        let err = ParseError::new(ParseErrorCode::Unterminated, "missing quote", 7);
        assert_eq!(err.to_string(), "Unterminated at offset 7: missing quote");
    }
}
