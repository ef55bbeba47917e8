//! Storyline Scenarios
//!
//! Data definitions consumed by the composition engine.
//!
//! # Core Concepts
//!
//! - [`Scenario`]: ordered steps plus optional setup/teardown
//! - [`Step`]: role, arguments and declarative [`ModelInfo`]
//! - [`Modifier`]: parsed `MOD` expression targeting one argument
//! - [`validate_pool`]: fail-fast check of every step before a search starts
//!
//! Scenarios are immutable inputs; the engine works on clones.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod modifier;
mod scenario;
mod step;
mod validation;

pub use error::{ScenarioError, StepDefinitionIssue};
pub use modifier::Modifier;
pub use scenario::Scenario;
pub use step::{ModelInfo, Step, StepArgument, StepRole};
pub use validation::validate_pool;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
