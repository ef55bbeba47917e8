//! Steps and their declarative model info

use serde::{Deserialize, Serialize};
use storyline_model::{ArgValue, Bindings};

/// Gherkin role of a step
///
/// The role decides which expressions are checked: preconditions for
/// `given`/`when`/`none`, postconditions for `when`/`then`/`none`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepRole {
    /// Context that must already hold
    Given,
    /// Action that changes the model
    When,
    /// Outcome that must hold afterwards
    Then,
    /// Plain step outside a Gherkin structure
    #[default]
    None,
}

impl StepRole {
    /// Whether `IN` expressions are evaluated for this role
    #[inline]
    #[must_use]
    pub fn checks_preconditions(self) -> bool {
        matches!(self, Self::Given | Self::When | Self::None)
    }

    /// Whether `OUT` expressions are evaluated for this role
    #[inline]
    #[must_use]
    pub fn checks_postconditions(self) -> bool {
        matches!(self, Self::When | Self::Then | Self::None)
    }

    /// Whether an unmet postcondition may be achieved by refinement
    #[inline]
    #[must_use]
    pub fn may_refine(self) -> bool {
        matches!(self, Self::When | Self::None)
    }
}

/// Declarative metadata supplied for a step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Preconditions
    #[serde(rename = "IN", default)]
    pub preconditions: Vec<String>,

    /// Postconditions and effects
    #[serde(rename = "OUT", default)]
    pub postconditions: Vec<String>,

    /// Argument modifiers
    #[serde(rename = "MOD", default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,

    /// Extraction failure reported by the metadata collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Formal argument of a step and its current value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepArgument {
    /// Formal name, as used in `${name}` placeholders
    pub name: String,

    /// Current (possibly substituted) value
    pub value: ArgValue,

    /// Example value as originally written, before substitution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,

    /// Value comes from the step's default rather than the scenario text
    #[serde(default)]
    pub is_default: bool,
}

impl StepArgument {
    /// Scalar argument whose example value is its text
    #[must_use]
    pub fn scalar(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            example: Some(value.clone()),
            value: ArgValue::Scalar(value),
            is_default: false,
        }
    }

    /// Variadic argument
    #[must_use]
    pub fn list<I, S>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            value: ArgValue::List(items.into_iter().map(Into::into).collect()),
            example: None,
            is_default: false,
        }
    }

    /// Mark the value as the step's default
    #[must_use]
    pub fn defaulted(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Symbolic example value tracked by the solver, if any
    ///
    /// Falls back to the scalar text when no original example was recorded.
    #[must_use]
    pub fn example_value(&self) -> Option<&str> {
        match (&self.example, &self.value) {
            (Some(example), _) => Some(example),
            (None, ArgValue::Scalar(text)) => Some(text),
            (None, ArgValue::List(_)) => None,
        }
    }
}

/// One declarative action of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Keyword text as it appears in the scenario
    pub keyword: String,

    /// Gherkin role
    #[serde(default)]
    pub role: StepRole,

    /// Bound arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<StepArgument>,

    /// Declarative metadata
    #[serde(default)]
    pub model_info: ModelInfo,
}

impl Step {
    /// Create a step with empty model info
    #[must_use]
    pub fn new(keyword: impl Into<String>, role: StepRole) -> Self {
        Self {
            keyword: keyword.into(),
            role,
            args: Vec::new(),
            model_info: ModelInfo::default(),
        }
    }

    /// Add a precondition
    #[must_use]
    pub fn with_in(mut self, expression: impl Into<String>) -> Self {
        self.model_info.preconditions.push(expression.into());
        self
    }

    /// Add a postcondition
    #[must_use]
    pub fn with_out(mut self, expression: impl Into<String>) -> Self {
        self.model_info.postconditions.push(expression.into());
        self
    }

    /// Add an argument modifier
    #[must_use]
    pub fn with_mod(mut self, expression: impl Into<String>) -> Self {
        self.model_info.modifiers.push(expression.into());
        self
    }

    /// Add an argument
    #[must_use]
    pub fn with_arg(mut self, argument: StepArgument) -> Self {
        self.args.push(argument);
        self
    }

    /// Argument by formal name
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&StepArgument> {
        self.args.iter().find(|a| a.name == name)
    }

    /// Mutable argument by formal name
    pub fn argument_mut(&mut self, name: &str) -> Option<&mut StepArgument> {
        self.args.iter_mut().find(|a| a.name == name)
    }

    /// Placeholder bindings for expression evaluation
    #[must_use]
    pub fn bindings(&self) -> Bindings {
        self.args
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect()
    }

    /// Preconditions checked for this step's role
    #[must_use]
    pub fn relevant_preconditions(&self) -> &[String] {
        if self.role.checks_preconditions() {
            &self.model_info.preconditions
        } else {
            &[]
        }
    }

    /// Postconditions checked for this step's role
    #[must_use]
    pub fn relevant_postconditions(&self) -> &[String] {
        if self.role.checks_postconditions() {
            &self.model_info.postconditions
        } else {
            &[]
        }
    }
}
