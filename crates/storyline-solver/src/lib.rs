//! Storyline Constraint Solver
//!
//! Resolves symbolic example values used in scenario steps to concrete
//! values drawn from the domain model.
//!
//! # Core Concepts
//!
//! - [`Constraint`]: non-empty option set of one example value
//! - [`SubstitutionMap`]: all example values of one scenario variant
//!
//! Distinct example values always resolve to distinct concrete values,
//! so two "some other record" placeholders never collapse onto the same
//! record by accident.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod constraint;
mod error;
mod substitution;

pub use constraint::Constraint;
pub use error::SolverError;
pub use substitution::SubstitutionMap;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
