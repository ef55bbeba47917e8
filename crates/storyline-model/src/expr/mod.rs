//! Guard/effect expression language
//!
//! Statements: `new NAME`, `del NAME`, `term.attr = EXPR` (also `+=`, `-=`)
//! or a plain expression. Expressions support `or`, `and`, `not`,
//! comparisons (`==`, `!=`, `<`, `<=`, `>`, `>=`, `in`, `not in`),
//! integer arithmetic, list literals, attribute paths, the built-in `len`
//! and `${arg}` / `@{arg}` placeholders bound to step arguments.

mod ast;
mod lexer;
mod parser;

pub use ast::{AssignOp, BinaryOp, Expr, Statement, UnaryOp};

pub(crate) use lexer::is_identifier;

use crate::error::ParseError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Parsed expression together with its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    source: String,
    statement: Statement,
}

impl Expression {
    /// Parse expression text
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Ok(Self {
            source: source.trim().to_string(),
            statement: parser::parse_statement(source)?,
        })
    }

    /// Source text as written
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed statement
    #[inline]
    #[must_use]
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Whether the whole expression is a single name or scalar placeholder
    ///
    /// Such expressions act as existence checks: an undeclared name yields
    /// `False` instead of an error.
    #[must_use]
    pub fn is_bare_reference(&self) -> bool {
        matches!(
            self.statement,
            Statement::Expr(Expr::Name(_) | Expr::Placeholder { variadic: false, .. })
        )
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
