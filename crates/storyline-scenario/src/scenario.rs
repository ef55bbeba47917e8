//! Scenarios: ordered steps with optional setup and teardown

use crate::step::Step;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One candidate unit of test behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Display name
    pub name: String,

    /// Stable identifier from the scenario source
    pub src_id: String,

    /// Step run before the regular steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<Step>,

    /// Regular steps, in order
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Step run after the regular steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teardown: Option<Step>,

    /// Example value to concrete value chosen for this occurrence
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub data_choices: IndexMap<String, String>,
}

impl Scenario {
    /// Create a scenario without steps
    #[must_use]
    pub fn new(name: impl Into<String>, src_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            src_id: src_id.into(),
            setup: None,
            steps: Vec::new(),
            teardown: None,
            data_choices: IndexMap::new(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Set the setup step
    #[must_use]
    pub fn with_setup(mut self, step: Step) -> Self {
        self.setup = Some(step);
        self
    }

    /// Set the teardown step
    #[must_use]
    pub fn with_teardown(mut self, step: Step) -> Self {
        self.teardown = Some(step);
        self
    }

    /// Every step, including setup and teardown
    pub fn all_steps(&self) -> impl Iterator<Item = &Step> {
        self.setup
            .iter()
            .chain(self.steps.iter())
            .chain(self.teardown.iter())
    }

    /// Every step, mutably, including setup and teardown
    pub fn all_steps_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.setup
            .iter_mut()
            .chain(self.steps.iter_mut())
            .chain(self.teardown.iter_mut())
    }

    /// Cut before regular step `index`
    ///
    /// The front keeps the setup and `steps[..index]`, the back keeps
    /// `steps[index..]` and the teardown. Both keep the data choices.
    #[must_use]
    pub fn split_at_step(&self, index: usize) -> (Self, Self) {
        let index = index.min(self.steps.len());
        let front = Self {
            steps: self.steps[..index].to_vec(),
            teardown: None,
            ..self.clone()
        };
        let back = Self {
            setup: None,
            steps: self.steps[index..].to_vec(),
            ..self.clone()
        };
        (front, back)
    }

    /// Same scenario under another display name
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepRole;

    fn scenario() -> Scenario {
        Scenario::new("Checkout", "shop.robot:12")
            .with_setup(Step::new("Open shop", StepRole::None))
            .with_step(Step::new("Given a basket", StepRole::Given))
            .with_step(Step::new("When paying", StepRole::When))
            .with_step(Step::new("Then receipt", StepRole::Then))
            .with_teardown(Step::new("Close shop", StepRole::None))
    }

    #[test]
    fn all_steps_include_setup_and_teardown() {
        let keywords: Vec<_> = scenario().all_steps().map(|s| s.keyword.clone()).collect();
        assert_eq!(
            keywords,
            vec!["Open shop", "Given a basket", "When paying", "Then receipt", "Close shop"]
        );
    }

    #[test]
    fn split_distributes_setup_and_teardown() {
        let (front, back) = scenario().split_at_step(1);
        assert_eq!(front.steps.len(), 1);
        assert!(front.setup.is_some());
        assert!(front.teardown.is_none());
        assert_eq!(back.steps.len(), 2);
        assert_eq!(back.steps[0].keyword, "When paying");
        assert!(back.setup.is_none());
        assert!(back.teardown.is_some());
        assert_eq!(front.src_id, back.src_id);
    }

    #[test]
    fn split_index_is_clamped() {
        let (front, back) = scenario().split_at_step(99);
        assert_eq!(front.steps.len(), 3);
        assert!(back.steps.is_empty());
    }
}
