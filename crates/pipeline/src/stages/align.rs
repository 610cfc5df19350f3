//! Label upsampling and signal alignment.
//!
//! Sleep stages arrive one code per epoch while the raw channels carry one
//! sample per tick. This stage repeats each code over its epoch and then
//! forces the result to the exact raw channel length.

use std::iter;
use std::num::NonZeroU32;

use serde::Serialize;
use tracing::warn;

use eeg_types::{
    AlignError, AlignedTable, LabelSequence, RawChannel, RecordingChannels, RecordingParams,
    PAD_STAGE_CODE,
};

/// How the upsampled labels were fitted to the raw channel length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Reconciliation {
    Exact,
    /// Trailing labels beyond the recording were dropped.
    Truncated { natural_len: usize, target_len: usize },
    /// Samples after the last epoch were filled with [`PAD_STAGE_CODE`].
    Padded { natural_len: usize, target_len: usize },
}

impl Reconciliation {
    fn classify(natural_len: usize, target_len: usize) -> Self {
        use std::cmp::Ordering;
        match natural_len.cmp(&target_len) {
            Ordering::Equal => Reconciliation::Exact,
            Ordering::Greater => Reconciliation::Truncated {
                natural_len,
                target_len,
            },
            Ordering::Less => Reconciliation::Padded {
                natural_len,
                target_len,
            },
        }
    }

    /// `target_len - natural_len`: negative when labels were truncated.
    pub fn difference(&self) -> i64 {
        match *self {
            Reconciliation::Exact => 0,
            Reconciliation::Truncated {
                natural_len,
                target_len,
            }
            | Reconciliation::Padded {
                natural_len,
                target_len,
            } => target_len as i64 - natural_len as i64,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Reconciliation::Exact)
    }
}

/// Per-sample labels of exactly the requested length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsampledLabels {
    pub codes: Vec<i64>,
    pub reconciliation: Reconciliation,
}

/// Check that the three raw channels have the same number of samples.
/// Returns that common length.
pub fn validate_channels(
    eeg1: &RawChannel,
    eeg2: &RawChannel,
    emg: &RawChannel,
) -> Result<usize, AlignError> {
    if eeg1.len() != eeg2.len() || eeg1.len() != emg.len() {
        return Err(AlignError::ShapeMismatch {
            eeg1: eeg1.len(),
            eeg2: eeg2.len(),
            emg: emg.len(),
        });
    }
    Ok(eeg1.len())
}

fn repeated_codes(
    labels: &LabelSequence,
    samples_per_epoch: usize,
) -> impl Iterator<Item = i64> + '_ {
    labels
        .codes()
        .iter()
        .flat_map(move |&code| iter::repeat(code).take(samples_per_epoch))
}

/// Repeat every code `samples_per_epoch` times, without reconciliation.
pub fn repeat_labels(labels: &LabelSequence, samples_per_epoch: usize) -> Vec<i64> {
    repeated_codes(labels, samples_per_epoch).collect()
}

/// Expand epoch labels to one label per raw sample and fit them to
/// `target_len` by truncating the tail or padding with [`PAD_STAGE_CODE`].
pub fn upsample_labels(
    labels: &LabelSequence,
    sampling_rate_hz: NonZeroU32,
    epoch_seconds: NonZeroU32,
    target_len: usize,
) -> UpsampledLabels {
    let samples_per_epoch = sampling_rate_hz.get() as usize * epoch_seconds.get() as usize;
    let natural_len = labels.len().saturating_mul(samples_per_epoch);
    let reconciliation = Reconciliation::classify(natural_len, target_len);

    // never materialise repeats that would be truncated away
    let mut codes: Vec<i64> = Vec::with_capacity(target_len);
    codes.extend(repeated_codes(labels, samples_per_epoch).take(target_len));
    codes.resize(target_len, PAD_STAGE_CODE);

    match reconciliation {
        Reconciliation::Exact => {}
        Reconciliation::Truncated { .. } => warn!(
            natural_len,
            target_len,
            difference = reconciliation.difference(),
            "Upsampled sleep stages ({}) longer than EEG data ({}) by {} samples; truncated to match",
            natural_len,
            target_len,
            natural_len - target_len
        ),
        Reconciliation::Padded { .. } => warn!(
            natural_len,
            target_len,
            difference = reconciliation.difference(),
            "Upsampled sleep stages ({}) shorter than EEG data ({}) by {} samples; padded with {}",
            natural_len,
            target_len,
            target_len - natural_len,
            PAD_STAGE_CODE
        ),
    }

    assert_eq!(
        codes.len(),
        target_len,
        "upsampled sleep stages must match the EEG length after reconciliation"
    );
    UpsampledLabels {
        codes,
        reconciliation,
    }
}

/// Assemble the output table in the fixed {sleepStage, EEG1, EEG2, EMG} order.
pub fn build_aligned_table(
    eeg1: RawChannel,
    eeg2: RawChannel,
    emg: RawChannel,
    labels: UpsampledLabels,
) -> Result<AlignedTable, AlignError> {
    AlignedTable::new(
        labels.codes,
        eeg1.into_samples(),
        eeg2.into_samples(),
        emg.into_samples(),
    )
}

/// Validate, upsample and assemble one recording.
pub fn align_recording(
    channels: RecordingChannels,
    params: &RecordingParams,
) -> Result<(AlignedTable, Reconciliation), AlignError> {
    let RecordingChannels {
        eeg1,
        eeg2,
        emg,
        labels,
    } = channels;
    let target_len = validate_channels(&eeg1, &eeg2, &emg)?;
    let upsampled = upsample_labels(
        &labels,
        params.sampling_rate_hz,
        params.epoch_seconds,
        target_len,
    );
    let reconciliation = upsampled.reconciliation;
    let table = build_aligned_table(eeg1, eeg2, emg, upsampled)?;
    Ok((table, reconciliation))
}
