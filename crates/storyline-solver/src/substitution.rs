//! Example value to concrete value resolution for one scenario variant

use crate::constraint::Constraint;
use crate::error::SolverError;
use indexmap::IndexMap;
use rand::Rng;
use storyline_model::Value;

/// Constraints of every example value used by a scenario variant
///
/// Example values are kept in registration order; [`SubstitutionMap::solve`]
/// resolves them in that order so a seeded generator reproduces the same
/// solution.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionMap {
    constraints: IndexMap<String, Constraint>,
    solution: IndexMap<String, Value>,
}

impl SubstitutionMap {
    /// Create an empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an example value as standing for itself
    ///
    /// Used when an example value is first introduced by an outcome step:
    /// there is nothing to narrow, the example defines its own value. An
    /// already registered example value is left untouched.
    pub fn define(&mut self, example: &str) {
        self.constraints
            .entry(example.to_string())
            .or_insert_with(|| Constraint::fixed(Value::Str(example.to_string())));
    }

    /// Register an example value, or narrow its existing option set
    ///
    /// Narrowing with an empty `options` is a no-op for a registered example
    /// value; registering one with no options at all is infeasible.
    pub fn narrow(&mut self, example: &str, options: Vec<Value>) -> Result<(), SolverError> {
        match self.constraints.get_mut(example) {
            Some(constraint) => constraint
                .narrow(&options)
                .map_err(|e| e.for_example(example)),
            None => {
                let constraint = Constraint::new(options).map_err(|e| e.for_example(example))?;
                self.constraints.insert(example.to_string(), constraint);
                Ok(())
            }
        }
    }

    /// Pick a concrete value for every unresolved example value
    ///
    /// Each pick is uniform over the current options and is then excluded
    /// from every example value still waiting, so distinct example values
    /// never share a concrete value.
    pub fn solve<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<&IndexMap<String, Value>, SolverError> {
        let pending: Vec<String> = self
            .constraints
            .keys()
            .filter(|k| !self.solution.contains_key(*k))
            .cloned()
            .collect();

        for (i, example) in pending.iter().enumerate() {
            let options = self.constraints[example.as_str()].options();
            let choice = options[rng.gen_range(0..options.len())].clone();

            for other in &pending[i + 1..] {
                self.constraints[other.as_str()]
                    .exclude(&choice)
                    .map_err(|e| e.for_example(other))?;
            }

            tracing::trace!(example = %example, value = %choice, "example value resolved");
            self.constraints[example.as_str()] = Constraint::fixed(choice.clone());
            self.solution.insert(example.clone(), choice);
        }

        Ok(&self.solution)
    }

    /// Current options of an example value
    #[must_use]
    pub fn options(&self, example: &str) -> Option<&[Value]> {
        self.constraints.get(example).map(Constraint::options)
    }

    /// Resolved values so far
    #[inline]
    #[must_use]
    pub fn solution(&self) -> &IndexMap<String, Value> {
        &self.solution
    }

    /// Number of registered example values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether no example value is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn narrowing_accumulates() {
        let mut map = SubstitutionMap::new();
        map.narrow("fruit", words(&["apple", "pear", "plum"])).unwrap();
        map.narrow("fruit", words(&["pear", "plum", "kiwi"])).unwrap();
        assert_eq!(map.options("fruit"), Some(words(&["pear", "plum"]).as_slice()));
        assert_eq!(
            map.narrow("fruit", words(&["kiwi"])),
            Err(SolverError::InfeasibleExample {
                example: "fruit".into()
            })
        );
    }

    #[test]
    fn registering_with_no_options_is_infeasible() {
        let mut map = SubstitutionMap::new();
        assert_eq!(
            map.narrow("fruit", Vec::new()),
            Err(SolverError::InfeasibleExample {
                example: "fruit".into()
            })
        );
        assert!(map.is_empty());
    }

    #[test]
    fn define_keeps_example_and_ignores_later_definitions() {
        let mut map = SubstitutionMap::new();
        map.define("receipt");
        map.define("receipt");
        assert_eq!(map.options("receipt"), Some(words(&["receipt"]).as_slice()));

        map.narrow("apple", words(&["a", "b"])).unwrap();
        map.define("apple");
        assert_eq!(map.options("apple").map(<[Value]>::len), Some(2));
    }

    #[test]
    fn solve_resolves_in_registration_order() {
        let mut map = SubstitutionMap::new();
        map.narrow("first", words(&["x"])).unwrap();
        map.narrow("second", words(&["x", "y"])).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let solution = map.solve(&mut rng).unwrap();
        assert_eq!(solution["first"], Value::from("x"));
        assert_eq!(solution["second"], Value::from("y"));
    }

    #[test]
    fn solve_fails_when_distinctness_cannot_hold() {
        let mut map = SubstitutionMap::new();
        map.narrow("a", words(&["only"])).unwrap();
        map.narrow("b", words(&["only"])).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            map.solve(&mut rng),
            Err(SolverError::InfeasibleExample { example: "b".into() })
        );
    }

    #[test]
    fn same_seed_same_solution() {
        let build = || {
            let mut map = SubstitutionMap::new();
            map.narrow("a", words(&["1", "2", "3", "4"])).unwrap();
            map.narrow("b", words(&["1", "2", "3", "4"])).unwrap();
            map
        };
        let mut first = build();
        let mut second = build();
        let s1 = first.solve(&mut StdRng::seed_from_u64(99)).unwrap().clone();
        let s2 = second.solve(&mut StdRng::seed_from_u64(99)).unwrap().clone();
        assert_eq!(s1, s2);
    }

    proptest! {
        #[test]
        fn prop_distinct_examples_get_distinct_values(seed in any::<u64>()) {
            let mut map = SubstitutionMap::new();
            map.narrow("a", vec![Value::Int(1), Value::Int(2)]).unwrap();
            map.narrow("b", vec![Value::Int(1), Value::Int(2)]).unwrap();
            let solution = map.solve(&mut StdRng::seed_from_u64(seed)).unwrap();
            prop_assert_ne!(&solution["a"], &solution["b"]);
        }
    }
}
