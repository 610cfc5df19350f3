//! Run configuration for the container-to-CSV conversion
//!
//! A [`RunConfig`] is built once per run and passed by reference into the
//! processing entry points. Nothing in the workspace keeps configuration in
//! global state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;

use crate::data::ChannelRole;
use crate::error::ConfigError;

/// Which dataset a batch of recordings belongs to. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Train,
    Test,
    #[default]
    ToScore,
}

impl DatasetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Train => "train",
            DatasetKind::Test => "test",
            DatasetKind::ToScore => "to_score",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(DatasetKind::Train),
            "test" => Ok(DatasetKind::Test),
            "to_score" | "to-score" => Ok(DatasetKind::ToScore),
            other => Err(ConfigError::Invalid {
                field: "dataset",
                message: format!("expected 'train', 'test' or 'to_score', got '{}'", other),
            }),
        }
    }
}

/// Sampling parameters shared by every recording in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingParams {
    /// Raw channel sampling rate in Hz
    pub sampling_rate_hz: NonZeroU32,
    /// Duration of one sleep-stage epoch in seconds
    pub epoch_seconds: NonZeroU32,
}

impl RecordingParams {
    pub fn new(sampling_rate_hz: NonZeroU32, epoch_seconds: NonZeroU32) -> Self {
        Self {
            sampling_rate_hz,
            epoch_seconds,
        }
    }

    /// Build from signed integers as typed by a user, rejecting zero and negatives.
    pub fn from_ints(sampling_rate_hz: i64, epoch_seconds: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            sampling_rate_hz: positive("sampling_rate_hz", sampling_rate_hz)?,
            epoch_seconds: positive("epoch_seconds", epoch_seconds)?,
        })
    }

    /// Number of raw samples covered by one label.
    pub fn samples_per_epoch(&self) -> usize {
        self.sampling_rate_hz.get() as usize * self.epoch_seconds.get() as usize
    }
}

fn positive(field: &'static str, value: i64) -> Result<NonZeroU32, ConfigError> {
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(ConfigError::NotPositive { field, value })
}

/// Key-name suffixes identifying each channel role inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSuffixes {
    pub eeg1: Vec<String>,
    pub eeg2: Vec<String>,
    pub emg: Vec<String>,
    pub labels: Vec<String>,
}

impl Default for ChannelSuffixes {
    fn default() -> Self {
        Self {
            eeg1: vec!["_EEG_EEG1A_B".to_string(), "_EEGorig".to_string()],
            eeg2: vec!["_EEG_EEG2A_B".to_string()],
            emg: vec!["_EMG_EMG".to_string()],
            labels: vec!["_Stage_1_".to_string()],
        }
    }
}

impl ChannelSuffixes {
    pub fn for_role(&self, role: ChannelRole) -> &[String] {
        match role {
            ChannelRole::Eeg1 => &self.eeg1,
            ChannelRole::Eeg2 => &self.eeg2,
            ChannelRole::Emg => &self.emg,
            ChannelRole::Labels => &self.labels,
        }
    }

    /// Check that every role has at least one suffix and that no container key
    /// could match two roles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for role in ChannelRole::ALL {
            let suffixes = self.for_role(role);
            if suffixes.is_empty() {
                return Err(ConfigError::NoSuffixes(role));
            }
            if suffixes.iter().any(|s| s.is_empty()) {
                return Err(ConfigError::Invalid {
                    field: "channels",
                    message: format!("empty suffix configured for {}", role),
                });
            }
        }

        for (i, &role) in ChannelRole::ALL.iter().enumerate() {
            for &other_role in &ChannelRole::ALL[i + 1..] {
                for suffix in self.for_role(role) {
                    for other_suffix in self.for_role(other_role) {
                        // a key ending in the longer suffix also ends in the shorter one
                        if suffix.ends_with(other_suffix.as_str())
                            || other_suffix.ends_with(suffix.as_str())
                        {
                            return Err(ConfigError::SuffixCollision {
                                role,
                                suffix: suffix.clone(),
                                other_role,
                                other_suffix: other_suffix.clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn default_extension() -> String {
    "mat".to_string()
}

/// Immutable settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub dataset: DatasetKind,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub recording: RecordingParams,
    #[serde(default)]
    pub channels: ChannelSuffixes,
    /// File extension of input containers, without the dot
    #[serde(default = "default_extension")]
    pub input_extension: String,
}

impl RunConfig {
    pub fn new(
        dataset: DatasetKind,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        recording: RecordingParams,
    ) -> Self {
        Self {
            dataset,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            recording,
            channels: ChannelSuffixes::default(),
            input_extension: default_extension(),
        }
    }

    pub fn with_channels(mut self, channels: ChannelSuffixes) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_input_extension(mut self, extension: impl Into<String>) -> Self {
        self.input_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Validate everything that can be checked without opening a recording.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InputDirMissing(
                self.input_dir.display().to_string(),
            ));
        }
        if self.input_extension.is_empty() {
            return Err(ConfigError::Invalid {
                field: "input_extension",
                message: "extension must not be empty".to_string(),
            });
        }
        self.channels.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_per_epoch_multiplies_rate_and_duration() {
        let params = RecordingParams::from_ints(512, 10).unwrap();
        assert_eq!(params.samples_per_epoch(), 5120);
    }

    #[test]
    fn zero_and_negative_params_are_rejected() {
        assert_eq!(
            RecordingParams::from_ints(0, 10),
            Err(ConfigError::NotPositive {
                field: "sampling_rate_hz",
                value: 0
            })
        );
        assert_eq!(
            RecordingParams::from_ints(512, -4),
            Err(ConfigError::NotPositive {
                field: "epoch_seconds",
                value: -4
            })
        );
    }

    #[test]
    fn default_suffix_table_is_unambiguous() {
        assert!(ChannelSuffixes::default().validate().is_ok());
    }

    #[test]
    fn shared_suffix_between_eeg_roles_is_a_collision() {
        let mut channels = ChannelSuffixes::default();
        channels.eeg2.push("_EEGorig".to_string());
        match channels.validate() {
            Err(ConfigError::SuffixCollision { role, other_role, .. }) => {
                assert_eq!(role, ChannelRole::Eeg1);
                assert_eq!(other_role, ChannelRole::Eeg2);
            }
            other => panic!("expected a collision, got {:?}", other),
        }
    }

    #[test]
    fn nested_suffix_is_a_collision() {
        let mut channels = ChannelSuffixes::default();
        channels.emg = vec!["orig".to_string()];
        assert!(matches!(
            channels.validate(),
            Err(ConfigError::SuffixCollision { .. })
        ));
    }

    #[test]
    fn empty_role_is_rejected() {
        let mut channels = ChannelSuffixes::default();
        channels.labels.clear();
        assert_eq!(
            channels.validate(),
            Err(ConfigError::NoSuffixes(ChannelRole::Labels))
        );
    }

    #[test]
    fn dataset_kind_parses_user_input() {
        assert_eq!(" Train ".parse::<DatasetKind>().unwrap(), DatasetKind::Train);
        assert_eq!("to-score".parse::<DatasetKind>().unwrap(), DatasetKind::ToScore);
        assert!("validation".parse::<DatasetKind>().is_err());
    }

    #[test]
    fn missing_input_dir_fails_validation() {
        let config = RunConfig::new(
            DatasetKind::Test,
            "/definitely/not/here",
            "/tmp/out",
            RecordingParams::from_ints(256, 4).unwrap(),
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InputDirMissing(_))
        ));
    }

    #[test]
    fn extension_is_stored_without_dot() {
        let config = RunConfig::new(
            DatasetKind::Test,
            ".",
            "out",
            RecordingParams::from_ints(256, 4).unwrap(),
        )
        .with_input_extension(".MAT");
        assert_eq!(config.input_extension, "MAT");
    }
}
