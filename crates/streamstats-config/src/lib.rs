//! Configuration management for streamstats
//!
//! YAML configuration with validated sections for chart styling, report
//! layout, ingestion defaults and logging, plus `STREAMSTATS_*` environment
//! overrides.

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{ChartConfig, Config, IngestConfig, LoggingSettings, ReportConfig};
