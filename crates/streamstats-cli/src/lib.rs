//! # streamstats command line
//!
//! Loads configuration and a dataset file into an in-memory store, then
//! prints summaries as JSON or writes charts (PNG) and reports (PDF).

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod dataset;

pub use app::App;
pub use cli::{Args, Command};
pub use dataset::{Dataset, IngestReport, Rejection, StreamEntry};
