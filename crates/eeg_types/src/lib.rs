//! Shared types for the sleep-recording conversion workspace
//!
//! This crate holds the recording data model, the immutable run configuration
//! and the error types used by the alignment pipeline and the CLI.

pub mod config;
pub mod data;
pub mod error;

// Re-export commonly used types
pub use config::*;
pub use data::*;
pub use error::*;
