//! Command line front end for storyline
//!
//! Loads a scenario pool from YAML or JSON, runs the composer and renders
//! the resulting trace as text or JSON.

#![warn(missing_docs)]

pub mod logging;
pub mod pool;
pub mod report;

pub use logging::{init_logging, LogFormat};
pub use pool::{load_config, load_pool, PoolFile};
pub use report::{render_text, TraceReport};
