//! Error handling for the burden report.
//!
//! Row-level problems (malformed lines, sentinel values, unmatched join keys)
//! never surface here: they degrade to discarded rows or missing values and are
//! counted in the load and join statistics. `AnalysisError` covers the ambient
//! layer only: files, configuration, sheet schemas and exports.

pub mod util;

use std::io;

/// Specialized error type for the analysis pipeline
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing CSV data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A source table could not be mapped onto its canonical schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error building Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error writing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Error converting models to or from an external representation
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AnalysisError {
    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

/// Result type for analysis operations
pub type Result<T> = anyhow::Result<T>;
