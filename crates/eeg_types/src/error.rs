//! Error types shared by the alignment and configuration layers

use thiserror::Error;

use crate::data::ChannelRole;

/// Errors raised while aligning a recording's channels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// The three raw channels disagree in length.
    #[error("raw channel lengths differ: EEG1={eeg1}, EEG2={eeg2}, EMG={emg}")]
    ShapeMismatch { eeg1: usize, eeg2: usize, emg: usize },

    /// Columns handed to the table builder are not all the same length.
    #[error("aligned columns differ in length: sleepStage={labels}, EEG1={eeg1}, EEG2={eeg2}, EMG={emg}")]
    TableShape {
        labels: usize,
        eeg1: usize,
        eeg2: usize,
        emg: usize,
    },
}

/// Errors in the run configuration. These are detected before any file is read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("{field} must be a positive integer, got {value}")]
    NotPositive { field: &'static str, value: i64 },

    #[error("no suffixes configured for the {0} channel")]
    NoSuffixes(ChannelRole),

    #[error("suffix '{suffix}' for {role} collides with suffix '{other_suffix}' for {other_role}")]
    SuffixCollision {
        role: ChannelRole,
        suffix: String,
        other_role: ChannelRole,
        other_suffix: String,
    },

    #[error("input directory does not exist: {0}")]
    InputDirMissing(String),

    #[error("invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}
