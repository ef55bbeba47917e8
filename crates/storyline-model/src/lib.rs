//! Storyline Domain Model
//!
//! A dynamic namespace of vocabulary terms plus a small expression language
//! used to write scenario guards (`IN`), effects (`OUT`) and argument
//! modifiers (`MOD`).
//!
//! # Core Concepts
//!
//! - [`DomainModel`]: declared terms, literal aliases and scenario scopes
//! - [`Expression`]: a parsed guard/effect statement
//! - [`Bindings`]: step arguments substituted into `${name}` placeholders
//! - [`Outcome`]: the value of an expression, or the executed marker
//!
//! # Example
//!
//! ```rust
//! use storyline_model::{Bindings, DomainModel, Outcome, Value};
//!
//! let mut model = DomainModel::new();
//! let none = Bindings::new();
//! model.evaluate_str("new basket", &none).unwrap();
//! model.evaluate_str("basket.items = []", &none).unwrap();
//!
//! let args = Bindings::new().with_scalar("fruit", "apple");
//! model.evaluate_str("basket.items += [${fruit}]", &args).unwrap();
//! let found = model.evaluate_str("${fruit} in basket.items", &args).unwrap();
//! assert_eq!(found, Outcome::Value(Value::Bool(true)));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod bindings;
mod error;
pub mod expr;
mod model;
mod value;

pub use bindings::{ArgValue, Bindings};
pub use error::{ModelError, ParseError, ParseErrorCode};
pub use expr::Expression;
pub use model::{DomainModel, Outcome, Term, SCENARIO_NAMESPACE};
pub use value::Value;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
