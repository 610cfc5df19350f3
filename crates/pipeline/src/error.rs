//! Error types for the conversion pipeline

use eeg_types::{AlignError, ChannelRole, ConfigError};
use thiserror::Error;

/// Pipeline-specific error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Align(#[from] AlignError),

    #[error("missing channel(s): {}", join_roles(.missing))]
    MissingChannel { missing: Vec<ChannelRole> },

    #[error("channel '{key}' has no '{dataset}' array")]
    MalformedChannel { key: String, dataset: &'static str },

    #[error("array shape {shape:?} does not match {len} stored elements")]
    ArrayShape { shape: Vec<usize>, len: usize },

    #[error("failed to read container {path}: {message}")]
    Container { path: String, message: String },

    #[error("unsupported container {path}: {reason}")]
    Unsupported { path: String, reason: &'static str },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

fn join_roles(roles: &[ChannelRole]) -> String {
    roles
        .iter()
        .map(|r| r.column_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
