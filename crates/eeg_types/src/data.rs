use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AlignError;

/// Stage code written for samples that fall after the last labelled epoch.
pub const PAD_STAGE_CODE: i64 = 0;

/// The four logical roles a container channel can play in a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelRole {
    Eeg1,
    Eeg2,
    Emg,
    /// Sleep-stage codes, one per epoch.
    Labels,
}

impl ChannelRole {
    /// All roles, in output column order.
    pub const ALL: [ChannelRole; 4] = [
        ChannelRole::Labels,
        ChannelRole::Eeg1,
        ChannelRole::Eeg2,
        ChannelRole::Emg,
    ];

    /// Header name of the column this role is written to.
    pub fn column_name(self) -> &'static str {
        match self {
            ChannelRole::Labels => "sleepStage",
            ChannelRole::Eeg1 => "EEG1",
            ChannelRole::Eeg2 => "EEG2",
            ChannelRole::Emg => "EMG",
        }
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A continuous signal recorded at a fixed sampling rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChannel {
    role: ChannelRole,
    samples: Vec<f64>,
}

impl RawChannel {
    pub fn new(role: ChannelRole, samples: Vec<f64>) -> Self {
        Self { role, samples }
    }

    pub fn role(&self) -> ChannelRole {
        self.role
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Sleep-stage codes, one per fixed-duration epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSequence(Vec<i64>);

impl LabelSequence {
    pub fn new(codes: Vec<i64>) -> Self {
        Self(codes)
    }

    pub fn codes(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<i64>> for LabelSequence {
    fn from(codes: Vec<i64>) -> Self {
        Self(codes)
    }
}

/// The four channels of one recording, resolved to their roles.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingChannels {
    pub eeg1: RawChannel,
    pub eeg2: RawChannel,
    pub emg: RawChannel,
    pub labels: LabelSequence,
}

/// One output row. Field order is the column order of the written table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    #[serde(rename = "sleepStage")]
    pub sleep_stage: i64,
    #[serde(rename = "EEG1")]
    pub eeg1: f64,
    #[serde(rename = "EEG2")]
    pub eeg2: f64,
    #[serde(rename = "EMG")]
    pub emg: f64,
}

/// Per-sample labels and signals of equal length, ready for row-wise output.
///
/// The only way to obtain one is [`AlignedTable::new`], which rejects columns
/// of differing lengths, so every table in existence is rectangular.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    sleep_stage: Vec<i64>,
    eeg1: Vec<f64>,
    eeg2: Vec<f64>,
    emg: Vec<f64>,
}

impl AlignedTable {
    /// Column header, in emission order.
    pub const COLUMNS: [&'static str; 4] = ["sleepStage", "EEG1", "EEG2", "EMG"];

    pub fn new(
        sleep_stage: Vec<i64>,
        eeg1: Vec<f64>,
        eeg2: Vec<f64>,
        emg: Vec<f64>,
    ) -> Result<Self, AlignError> {
        let len = sleep_stage.len();
        if eeg1.len() != len || eeg2.len() != len || emg.len() != len {
            return Err(AlignError::TableShape {
                labels: len,
                eeg1: eeg1.len(),
                eeg2: eeg2.len(),
                emg: emg.len(),
            });
        }
        Ok(Self {
            sleep_stage,
            eeg1,
            eeg2,
            emg,
        })
    }

    pub fn len(&self) -> usize {
        self.sleep_stage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sleep_stage.is_empty()
    }

    pub fn sleep_stage(&self) -> &[i64] {
        &self.sleep_stage
    }

    pub fn eeg1(&self) -> &[f64] {
        &self.eeg1
    }

    pub fn eeg2(&self) -> &[f64] {
        &self.eeg2
    }

    pub fn emg(&self) -> &[f64] {
        &self.emg
    }

    pub fn row(&self, index: usize) -> Option<AlignedRow> {
        Some(AlignedRow {
            sleep_stage: *self.sleep_stage.get(index)?,
            eeg1: self.eeg1[index],
            eeg2: self.eeg2[index],
            emg: self.emg[index],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = AlignedRow> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_follow_output_order() {
        let names: Vec<_> = ChannelRole::ALL.iter().map(|r| r.column_name()).collect();
        assert_eq!(names, AlignedTable::COLUMNS);
    }

    #[test]
    fn ragged_table_is_rejected() {
        let err = AlignedTable::new(vec![1, 1], vec![0.1, 0.2], vec![0.3], vec![0.4, 0.5]).unwrap_err();
        assert_eq!(
            err,
            AlignError::TableShape {
                labels: 2,
                eeg1: 2,
                eeg2: 1,
                emg: 2
            }
        );
    }

    #[test]
    fn rows_pair_columns_by_index() {
        let table = AlignedTable::new(
            vec![3, 0],
            vec![1.0, 2.0],
            vec![-1.0, -2.0],
            vec![0.5, 0.25],
        )
        .unwrap();
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            AlignedRow {
                sleep_stage: 0,
                eeg1: 2.0,
                eeg2: -2.0,
                emg: 0.25
            }
        );
        assert!(table.row(2).is_none());
    }
}
