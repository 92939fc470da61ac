//! # streamstats common
//!
//! Shared types, utilities, and common functionality for streamstats.
//!
//! This crate provides the domain model (streams, hourly records, events and
//! the derived summaries), the workspace error type, and the logging bootstrap
//! used across all other crates in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod macros;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{FieldError, Result, StatsError};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use types::*;
pub use utils::*;
