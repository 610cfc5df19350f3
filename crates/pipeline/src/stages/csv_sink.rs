//! CSV sink stage for writing aligned recordings to files.

use std::fs::{self, create_dir_all};
use std::io;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use eeg_types::AlignedTable;
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};

/// Writes an [`AlignedTable`] as `sleepStage,EEG1,EEG2,EMG` rows.
#[derive(Debug, Clone)]
pub struct CsvSink {
    delimiter: u8,
}

impl Default for CsvSink {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Serialize the table into any writer: one header row, then one row per
    /// sample, no index column.
    pub fn write_to<W: io::Write>(&self, table: &AlignedTable, writer: W) -> PipelineResult<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(AlignedTable::COLUMNS)?;
        for row in table.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the table to `path`, creating the parent directory if needed.
    ///
    /// Rows go to a `.part` file that is renamed into place once complete, so
    /// `path` either holds the whole table or does not exist.
    pub fn write(&self, table: &AlignedTable, path: &Path) -> PipelineResult<usize> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_all(parent)?;
                info!("Created output directory {}", parent.display());
            }
        }

        let part = part_path(path);
        let result = fs::File::create(&part)
            .map_err(PipelineError::from)
            .and_then(|file| self.write_to(table, io::BufWriter::new(file)));
        if let Err(e) = result {
            let _ = fs::remove_file(&part);
            return Err(e);
        }
        fs::rename(&part, path)?;
        debug!("Wrote {} rows to {}", table.len(), path.display());
        Ok(table.len())
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
