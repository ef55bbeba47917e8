//! Step argument bindings substituted into expression placeholders

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Concrete value bound to a formal argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Single argument (`${name}`)
    Scalar(String),
    /// Variadic argument (`@{name}`)
    List(Vec<String>),
}

impl ArgValue {
    /// Whether `text` is this value or one of its items
    #[must_use]
    pub fn mentions(&self, text: &str) -> bool {
        match self {
            Self::Scalar(s) => s == text,
            Self::List(items) => items.iter().any(|i| i == text),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

/// Formal argument name to bound value, in step order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: IndexMap<String, ArgValue>,
}

impl Bindings {
    /// Create empty bindings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar binding
    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, ArgValue::Scalar(value.into()));
        self
    }

    /// Add a variadic binding
    #[must_use]
    pub fn with_list<I, S>(mut self, name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name, ArgValue::List(items.into_iter().map(Into::into).collect()));
        self
    }

    /// Bind or rebind an argument
    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.entries.insert(name.into(), value);
    }

    /// Look up a bound argument
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries.get(name)
    }

    /// Iterate bindings in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether any argument supplied exactly this text
    ///
    /// Used to decide whether an unresolved name may become a literal alias.
    #[must_use]
    pub fn supplies(&self, text: &str) -> bool {
        self.entries.values().any(|v| v.mentions(text))
    }

    /// Number of bound arguments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is bound
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ArgValue)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (K, ArgValue)>>(iter: T) -> Self {
        let mut bindings = Self::new();
        for (k, v) in iter {
            bindings.insert(k, v);
        }
        bindings
    }
}
