//! Command-line and config-file handling.
//!
//! Each setting is taken from the first source that provides it: command-line
//! flag, then the TOML file given with `--config`, then an interactive prompt.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use eeg_types::{ChannelSuffixes, ConfigError, DatasetKind, RecordingParams, RunConfig};

use crate::prompt::Ask;

/// Attempts per prompted setting before giving up.
const MAX_ATTEMPTS: usize = 3;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Convert Spike2 sleep recordings (.mat) to CSV tables", long_about = None)]
pub struct Args {
    /// TOML file with run settings
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Dataset the recordings belong to: train, test or to_score
    #[arg(long)]
    pub dataset: Option<DatasetKind>,

    /// Directory containing the input recordings
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Directory the CSV files are written to
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Sampling rate of the raw channels in Hz
    #[arg(long)]
    pub sampling_rate: Option<u32>,

    /// Sleep-stage resolution in seconds
    #[arg(long)]
    pub epoch_seconds: Option<u32>,

    /// Extension of input files
    #[arg(long)]
    pub extension: Option<String>,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Fail instead of prompting for missing settings
    #[arg(long)]
    pub no_prompt: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Settings as they appear in the config file. Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub dataset: Option<DatasetKind>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub sampling_rate_hz: Option<i64>,
    pub epoch_seconds: Option<i64>,
    pub input_extension: Option<String>,
    pub channels: Option<ChannelSuffixes>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read configuration file '{}'", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Could not parse configuration file '{}'", path.display()))
    }
}

/// Build the run configuration from flags, the optional file and `ask`.
pub fn resolve(args: &Args, file: FileConfig, ask: &mut dyn Ask) -> Result<RunConfig> {
    let dataset = match args.dataset.or(file.dataset) {
        Some(dataset) => dataset,
        None => prompt_value(
            ask,
            "Enter dataset type ('train', 'test', or 'to_score'):",
            "dataset",
        )?,
    };

    let input_dir = match args.input.clone().or(file.input_dir) {
        Some(dir) => dir,
        None => prompt_value(
            ask,
            &format!("Enter the input directory path for {} files, without quotes:", dataset),
            "input_dir",
        )?,
    };

    let output_dir = match args.output.clone().or(file.output_dir) {
        Some(dir) => dir,
        None => prompt_value(
            ask,
            &format!("Enter the output directory path for {} CSV files, without quotes:", dataset),
            "output_dir",
        )?,
    };

    let sampling_rate = match args.sampling_rate.map(i64::from).or(file.sampling_rate_hz) {
        Some(rate) => rate,
        None => prompt_value(ask, "Enter the sampling rate in Hz (e.g., 512):", "sampling_rate_hz")?,
    };

    let epoch_seconds = match args.epoch_seconds.map(i64::from).or(file.epoch_seconds) {
        Some(seconds) => seconds,
        None => prompt_value(
            ask,
            "Enter the sleep stage resolution in seconds (e.g., 10):",
            "epoch_seconds",
        )?,
    };

    let recording = RecordingParams::from_ints(sampling_rate, epoch_seconds)?;
    let mut config = RunConfig::new(dataset, input_dir, output_dir, recording)
        .with_channels(file.channels.unwrap_or_default());
    if let Some(extension) = args.extension.clone().or(file.input_extension) {
        config = config.with_input_extension(extension);
    }
    Ok(config)
}

/// Ask until the answer parses, up to [`MAX_ATTEMPTS`] times.
fn prompt_value<T>(ask: &mut dyn Ask, question: &str, field: &'static str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    for _ in 0..MAX_ATTEMPTS {
        let Some(answer) = ask.ask(question)? else {
            return Err(ConfigError::Missing(field).into());
        };
        if answer.is_empty() {
            ask.tell("A value is required.")?;
            continue;
        }
        match answer.parse() {
            Ok(value) => return Ok(value),
            Err(e) => ask.tell(&format!("Invalid value: {}", e))?,
        }
    }
    Err(ConfigError::Invalid {
        field,
        message: format!("no valid answer after {} attempts", MAX_ATTEMPTS),
    }
    .into())
}
