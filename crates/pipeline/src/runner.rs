//! Batch driver: converts every recording in the input directory.
//!
//! Files are processed one at a time. A failure in one file is logged and
//! recorded in the [`RunReport`]; the run then moves on to the next file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, info_span};

use eeg_types::{DatasetKind, RunConfig};

use crate::container::ContainerReader;
use crate::error::PipelineResult;
use crate::stages::{align_recording, ChannelSelector, CsvSink, Reconciliation};
use crate::walker::{discover_inputs, output_path_for};

/// What was written for one successfully converted recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub label_epochs: usize,
    pub reconciliation: Reconciliation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted(FileSummary),
    Failed { input: PathBuf, error: String },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Converted(summary) => &summary.input,
            FileOutcome::Failed { input, .. } => input,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, FileOutcome::Converted(_))
    }
}

/// Result of a whole run, one outcome per discovered input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub dataset: DatasetKind,
    pub output_dir: PathBuf,
    pub outcomes: Vec<FileOutcome>,
}

impl RunReport {
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_converted()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Converts recordings according to one immutable [`RunConfig`].
pub struct Converter<'a> {
    config: &'a RunConfig,
    reader: &'a dyn ContainerReader,
    selector: ChannelSelector,
    sink: CsvSink,
}

impl<'a> Converter<'a> {
    /// Validates the configuration; nothing is read or written yet.
    pub fn new(config: &'a RunConfig, reader: &'a dyn ContainerReader) -> PipelineResult<Self> {
        config.validate()?;
        let selector = ChannelSelector::new(&config.channels)?;
        Ok(Self {
            config,
            reader,
            selector,
            sink: CsvSink::new(),
        })
    }

    /// Read, align and write a single recording.
    pub fn convert_file(&self, input: &Path) -> PipelineResult<FileSummary> {
        let selector = &self.selector;
        let contents = self
            .reader
            .read(input, &|key: &str| selector.role_for(key).is_some())?;
        let channels = selector.select(contents)?;
        let label_epochs = channels.labels.len();

        let (table, reconciliation) = align_recording(channels, &self.config.recording)?;

        let output = output_path_for(input, &self.config.output_dir);
        let rows = self.sink.write(&table, &output)?;
        info!("Saved CSV to: {}", output.display());

        Ok(FileSummary {
            input: input.to_path_buf(),
            output,
            rows,
            label_epochs,
            reconciliation,
        })
    }

    /// Convert every input file. Only a failure to list the input directory
    /// aborts the run; per-file failures end up in the report.
    pub fn run(&self) -> PipelineResult<RunReport> {
        let inputs = discover_inputs(&self.config.input_dir, &self.config.input_extension)?;
        info!(
            "Found {} .{} file(s) in {} for the {} set (reader: {})",
            inputs.len(),
            self.config.input_extension,
            self.config.input_dir.display(),
            self.config.dataset,
            self.reader.name()
        );

        let mut outcomes = Vec::with_capacity(inputs.len());
        for input in inputs {
            let span = info_span!("file", path = %input.display());
            let _enter = span.enter();
            info!("Processing file: {}", input.display());

            let outcome = match self.convert_file(&input) {
                Ok(summary) => FileOutcome::Converted(summary),
                Err(e) => {
                    error!("Skipping {}: {}", input.display(), e);
                    FileOutcome::Failed {
                        input,
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = RunReport {
            dataset: self.config.dataset,
            output_dir: self.config.output_dir.clone(),
            outcomes,
        };
        info!(
            "Run finished: {} converted, {} failed",
            report.converted(),
            report.failed()
        );
        Ok(report)
    }
}

/// Convenience entry point: validate `config` and convert all its inputs.
pub fn run(config: &RunConfig, reader: &dyn ContainerReader) -> PipelineResult<RunReport> {
    Converter::new(config, reader)?.run()
}
