//! Storyline Composition Engine
//!
//! Composes one executable trace out of a pool of independent scenarios so
//! that every scenario runs at least once and no declared precondition is
//! ever violated.
//!
//! # Core Concepts
//!
//! - [`Composer`]: the search driver (candidate selection, variants,
//!   fitting, backtracking, duplicate escalation)
//! - [`TraceState`]: backtracking ledger of coverage, tried candidates,
//!   choices and model snapshots
//! - [`ScenarioFitter`]: fits one scenario variant onto the current model,
//!   splitting it for refinement when an effect is not yet achievable
//! - [`generate_variant`]: resolves example values through the solver
//! - [`TraceObserver`]: receives every committed or rewound position
//!
//! # Example
//!
//! ```rust,ignore
//! use storyline_compose::{ComposeConfig, Composer, SeedOption};
//!
//! let config = ComposeConfig::default().with_seed(SeedOption::parse("42"));
//! let composition = Composer::new(config).compose(&scenarios)?;
//! for entry in &composition.entries {
//!     println!("{} {}", entry.id, entry.scenario.name);
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod driver;
mod error;
mod fitter;
mod observer;
mod trace_id;
mod trace_state;
mod variant;

pub use config::{ComposeConfig, SeedOption, DEFAULT_DROUGHT_LIMIT, DEFAULT_MAX_ITERATIONS};
pub use driver::{Composer, Composition, TraceEntry};
pub use error::{ComposeError, FailureDiagnostic, VariantError};
pub use fitter::{ExitResult, FitResult, PendingRefinement, Rejection, ScenarioFitter};
pub use observer::{NoopObserver, TraceEvent, TraceEventKind, TraceObserver, TracingObserver};
pub use trace_id::TraceId;
pub use trace_state::{Snapshot, TraceState};
pub use variant::generate_variant;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
