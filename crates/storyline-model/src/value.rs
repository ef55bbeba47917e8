//! Runtime values of the expression language

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Value held by an attribute or produced by an expression
///
/// Terms are referenced by name, never by pointer, so cloning a model
/// never shares attribute storage between the copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absence of a value
    None,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// Text
    Str(String),
    /// Reference to a declared vocabulary term
    Term(String),
    /// Ordered collection
    List(Vec<Value>),
}

impl Value {
    /// Truthiness used by `and`, `or` and `not`
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Str(s) => !s.is_empty(),
            Self::Term(_) => true,
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Short type name for error messages
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "str",
            Self::Term(_) => "term",
            Self::List(_) => "list",
        }
    }

    /// Interpret argument text as a literal when it reads like one
    ///
    /// Integers and the keywords `True`, `False`, `None` (any case) are
    /// recognised; anything else yields `None`.
    #[must_use]
    pub fn parse_literal(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Some(Self::Int(i));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => Some(Self::Bool(true)),
            "false" => Some(Self::Bool(false)),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Options represented by this value: a list yields its items, anything else itself
    #[must_use]
    pub fn into_options(self) -> Vec<Self> {
        match self {
            Self::List(items) => items,
            other => vec![other],
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) | Self::Term(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
