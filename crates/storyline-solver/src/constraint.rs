//! Option set of a single example value

use crate::error::SolverError;
use storyline_model::Value;

/// Non-empty, duplicate-free set of acceptable concrete values
///
/// Every operation that would leave the set empty fails with
/// [`SolverError::Infeasible`] and leaves the set untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    options: Vec<Value>,
}

impl Constraint {
    /// Create a constraint from its initial options
    pub fn new(options: impl IntoIterator<Item = Value>) -> Result<Self, SolverError> {
        let mut unique: Vec<Value> = Vec::new();
        for option in options {
            if !unique.contains(&option) {
                unique.push(option);
            }
        }
        if unique.is_empty() {
            return Err(SolverError::Infeasible);
        }
        Ok(Self { options: unique })
    }

    /// Constraint fixed to exactly one value
    #[inline]
    #[must_use]
    pub fn fixed(value: Value) -> Self {
        Self {
            options: vec![value],
        }
    }

    /// Keep only options also present in `options`
    ///
    /// An empty `options` slice places no restriction and is a no-op.
    pub fn narrow(&mut self, options: &[Value]) -> Result<(), SolverError> {
        if options.is_empty() {
            return Ok(());
        }
        let remaining: Vec<Value> = self
            .options
            .iter()
            .filter(|o| options.contains(o))
            .cloned()
            .collect();
        if remaining.is_empty() {
            return Err(SolverError::Infeasible);
        }
        self.options = remaining;
        Ok(())
    }

    /// Remove a single value from the options
    pub fn exclude(&mut self, value: &Value) -> Result<(), SolverError> {
        if self.options.len() == 1 && self.options[0] == *value {
            return Err(SolverError::Infeasible);
        }
        self.options.retain(|o| o != value);
        Ok(())
    }

    /// Current options, in first-seen order
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[Value] {
        &self.options
    }

    /// Whether exactly one option remains
    #[inline]
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.options.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn successive_narrowing() {
        let mut c = Constraint::new(words(&["one", "two", "three"])).unwrap();
        c.narrow(&words(&["one", "two"])).unwrap();
        c.narrow(&words(&["one", "three"])).unwrap();
        assert_eq!(c.options(), words(&["one"]).as_slice());
        assert!(c.is_fixed());

        assert_eq!(c.narrow(&words(&["two"])), Err(SolverError::Infeasible));
        assert_eq!(c.options(), words(&["one"]).as_slice());
    }

    #[test]
    fn empty_narrowing_is_noop() {
        let mut c = Constraint::new(words(&["a", "b"])).unwrap();
        c.narrow(&[]).unwrap();
        assert_eq!(c.options().len(), 2);
    }

    #[test]
    fn empty_initial_set_is_infeasible() {
        assert_eq!(Constraint::new(Vec::new()), Err(SolverError::Infeasible));
    }

    #[test]
    fn duplicates_are_collapsed() {
        let c = Constraint::new(words(&["a", "b", "a"])).unwrap();
        assert_eq!(c.options(), words(&["a", "b"]).as_slice());
    }

    #[test]
    fn exclude_never_empties() {
        let mut c = Constraint::new(words(&["a", "b"])).unwrap();
        c.exclude(&Value::from("a")).unwrap();
        c.exclude(&Value::from("zzz")).unwrap();
        assert_eq!(c.exclude(&Value::from("b")), Err(SolverError::Infeasible));
        assert_eq!(c.options(), words(&["b"]).as_slice());
    }
}
