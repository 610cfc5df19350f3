//! Conversion pipeline for sleep recordings
//!
//! Reads hierarchical recording containers, resolves the EEG1/EEG2/EMG and
//! sleep-stage channels, upsamples the per-epoch stage codes to the signal
//! sampling rate and writes one CSV table per recording.

pub mod container;
pub mod error;
pub mod runner;
pub mod stages;
pub mod walker;


// Re-export commonly used types
pub use container::*;
pub use error::*;
pub use runner::*;
pub use stages::*;
pub use walker::*;
