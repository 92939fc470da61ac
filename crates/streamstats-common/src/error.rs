//! Error types and utilities for streamstats

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for streamstats operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// A single rejected field of an ingestion submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field (e.g. `viewers`, `donations[1].amount`)
    pub field: String,
    /// Human readable reason
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Main error type for streamstats operations
#[derive(Error, Debug)]
pub enum StatsError {
    /// A referenced entity does not exist in the record store
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// One or more fields of a submission were rejected
    #[error("Invalid input: {}", join_field_errors(.errors))]
    InvalidInput { errors: Vec<FieldError> },

    /// Chart rendering or image embedding failed
    #[error("Rendering degraded: {message}")]
    RenderingDegraded {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Graph generation and plotting errors
    #[error("Graph error: {message}")]
    Graph {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Document generation errors
    #[error("Report error: {message}")]
    Report {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Record store failures
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl StatsError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error for the given entity kind and id
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create an invalid-input error from collected field errors
    pub fn invalid_input(errors: Vec<FieldError>) -> Self {
        Self::InvalidInput { errors }
    }

    /// Create an invalid-input error for a single field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Create a new rendering-degraded error
    pub fn rendering(msg: impl Into<String>) -> Self {
        Self::RenderingDegraded {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new rendering-degraded error with source
    pub fn rendering_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::RenderingDegraded {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new report error
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new report error with source
    pub fn report_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Report {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
            source: None,
        }
    }

    /// Whether this error reports a missing entity
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Field errors carried by an `InvalidInput` error, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::InvalidInput { errors } => errors,
            _ => &[],
        }
    }
}

impl From<String> for StatsError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for StatsError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to StatsError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for StatsError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Chart rendering failed", err)
    }
}
