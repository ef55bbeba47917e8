//! Argument modifiers (`MOD` expressions)

use crate::error::ScenarioError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;
use storyline_model::Expression;

static MODIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([$@])\{([^}]+)\}\s*=\s*(.*?)\s*$").expect("modifier pattern is valid")
});

/// Parsed `${arg} = EXPR` or `@{arg} = EXPR`
///
/// The scalar form narrows the option set of the argument's example value;
/// the variadic form replaces the argument's items outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    /// Formal argument targeted
    pub target: String,
    /// `@{..}` form
    pub variadic: bool,
    /// Expression producing the options (or the new items)
    pub constraint: Expression,
}

impl FromStr for Modifier {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScenarioError::InvalidModifier(s.to_string());
        let caps = MODIFIER.captures(s).ok_or_else(invalid)?;
        let rhs = &caps[3];
        // `${a} == x` is a comparison, not a modifier
        if rhs.starts_with('=') || rhs.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            target: caps[2].trim().to_string(),
            variadic: &caps[1] == "@",
            constraint: Expression::parse(rhs).map_err(|_| invalid())?,
        })
    }
}
