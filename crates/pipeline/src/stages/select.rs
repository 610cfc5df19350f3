//! Channel selection: resolves container keys to recording roles.
//!
//! Matching is driven by a table of suffix rules built from
//! [`ChannelSuffixes`], so adding a naming convention is a configuration
//! change rather than a code change.

use tracing::{debug, warn};

use eeg_types::{ChannelRole, ChannelSuffixes, ConfigError, LabelSequence, RawChannel, RecordingChannels};

use crate::container::ContainerContents;
use crate::error::{PipelineError, PipelineResult};

/// A container key ending in `suffix` holds the channel for `role`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixRule {
    pub role: ChannelRole,
    pub suffix: String,
}

#[derive(Debug, Clone)]
pub struct ChannelSelector {
    rules: Vec<SuffixRule>,
}

impl ChannelSelector {
    /// Build the rule table, refusing suffix sets in which one key could
    /// match two roles.
    pub fn new(suffixes: &ChannelSuffixes) -> Result<Self, ConfigError> {
        suffixes.validate()?;
        let rules = ChannelRole::ALL
            .iter()
            .flat_map(|&role| {
                suffixes.for_role(role).iter().map(move |suffix| SuffixRule {
                    role,
                    suffix: suffix.clone(),
                })
            })
            .collect();
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[SuffixRule] {
        &self.rules
    }

    pub fn role_for(&self, key: &str) -> Option<ChannelRole> {
        self.rules
            .iter()
            .find(|rule| key.ends_with(rule.suffix.as_str()))
            .map(|rule| rule.role)
    }

    /// Pick the four channels of a recording out of a container.
    ///
    /// Keys are visited in sorted order; if several keys resolve to the same
    /// role the first one is used and the rest are reported.
    pub fn select(&self, mut contents: ContainerContents) -> PipelineResult<RecordingChannels> {
        let mut assigned: [Option<String>; 4] = Default::default();
        for key in contents.keys() {
            let Some(role) = self.role_for(key) else {
                continue;
            };
            let slot = &mut assigned[role_index(role)];
            match slot {
                Some(existing) => warn!(
                    "Ignoring '{}': {} already taken from '{}'",
                    key, role, existing
                ),
                None => *slot = Some(key.to_string()),
            }
        }

        let missing: Vec<ChannelRole> = ChannelRole::ALL
            .into_iter()
            .filter(|&role| assigned[role_index(role)].is_none())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::MissingChannel { missing });
        }

        let [labels_key, eeg1_key, eeg2_key, emg_key] = assigned.map(Option::unwrap_or_default);
        Ok(RecordingChannels {
            eeg1: take_raw(&mut contents, &eeg1_key, ChannelRole::Eeg1)?,
            eeg2: take_raw(&mut contents, &eeg2_key, ChannelRole::Eeg2)?,
            emg: take_raw(&mut contents, &emg_key, ChannelRole::Emg)?,
            labels: take_labels(&mut contents, &labels_key)?,
        })
    }
}

/// Position of a role in [`ChannelRole::ALL`].
fn role_index(role: ChannelRole) -> usize {
    match role {
        ChannelRole::Labels => 0,
        ChannelRole::Eeg1 => 1,
        ChannelRole::Eeg2 => 2,
        ChannelRole::Emg => 3,
    }
}

fn take_raw(contents: &mut ContainerContents, key: &str, role: ChannelRole) -> PipelineResult<RawChannel> {
    let values = contents
        .remove(key)
        .and_then(|group| group.values)
        .ok_or_else(|| PipelineError::MalformedChannel {
            key: key.to_string(),
            dataset: "values",
        })?;
    let samples = values.into_flat();
    debug!("{} data extracted from '{}' ({} samples)", role, key, samples.len());
    Ok(RawChannel::new(role, samples))
}

fn take_labels(contents: &mut ContainerContents, key: &str) -> PipelineResult<LabelSequence> {
    let codes = contents
        .remove(key)
        .and_then(|group| group.codes)
        .ok_or_else(|| PipelineError::MalformedChannel {
            key: key.to_string(),
            dataset: "codes",
        })?;
    let labels = LabelSequence::new(codes.first_row().to_vec());
    debug!("Sleep stage data extracted from '{}' ({} epochs)", key, labels.len());
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ContainerGroup, NumericArray};

    fn recording(prefix: &str) -> ContainerContents {
        let codes = NumericArray::new(vec![2, 2], vec![1, 2, 0, 0]).unwrap();
        [
            (format!("{}_EEG_EEG1A_B", prefix), ContainerGroup::with_values(vec![1.0, 2.0])),
            (format!("{}_EEG_EEG2A_B", prefix), ContainerGroup::with_values(vec![3.0, 4.0])),
            (format!("{}_EMG_EMG", prefix), ContainerGroup::with_values(vec![5.0, 6.0])),
            (format!("{}_Stage_1_", prefix), ContainerGroup::with_codes(codes)),
            (format!("{}_Keyboard", prefix), ContainerGroup::with_values(vec![9.0])),
        ]
        .into_iter()
        .collect()
    }

    fn selector() -> ChannelSelector {
        ChannelSelector::new(&ChannelSuffixes::default()).unwrap()
    }

    #[test]
    fn resolves_all_four_roles() {
        let channels = selector().select(recording("mouse1")).unwrap();
        assert_eq!(channels.eeg1.samples(), &[1.0, 2.0]);
        assert_eq!(channels.eeg2.samples(), &[3.0, 4.0]);
        assert_eq!(channels.emg.samples(), &[5.0, 6.0]);
        assert_eq!(channels.labels.codes(), &[1, 2]);
        assert_eq!(channels.eeg1.role(), ChannelRole::Eeg1);
    }

    #[test]
    fn eegorig_maps_to_eeg1_only() {
        let selector = selector();
        assert_eq!(selector.role_for("rec_EEGorig"), Some(ChannelRole::Eeg1));
        assert_eq!(selector.role_for("rec_EEG_EEG2A_B"), Some(ChannelRole::Eeg2));
        assert_eq!(selector.role_for("rec_Keyboard"), None);
    }

    #[test]
    fn reports_every_missing_role() {
        let mut contents = recording("m");
        contents.remove("m_EMG_EMG");
        contents.remove("m_Stage_1_");
        match selector().select(contents) {
            Err(PipelineError::MissingChannel { missing }) => {
                assert_eq!(missing, vec![ChannelRole::Labels, ChannelRole::Emg]);
            }
            other => panic!("expected MissingChannel, got {:?}", other),
        }
    }

    #[test]
    fn first_key_wins_for_duplicate_role() {
        let mut contents = recording("b");
        contents.insert("a_EEGorig", ContainerGroup::with_values(vec![7.0, 8.0]));
        let channels = selector().select(contents).unwrap();
        assert_eq!(channels.eeg1.samples(), &[7.0, 8.0]);
    }

    #[test]
    fn label_group_without_codes_is_malformed() {
        let mut contents = recording("m");
        contents.insert("m_Stage_1_", ContainerGroup::with_values(vec![1.0]));
        assert!(matches!(
            selector().select(contents),
            Err(PipelineError::MalformedChannel { dataset: "codes", .. })
        ));
    }

    #[test]
    fn colliding_suffixes_are_rejected_up_front() {
        let mut suffixes = ChannelSuffixes::default();
        suffixes.eeg2.push("_EEGorig".to_string());
        assert!(matches!(
            ChannelSelector::new(&suffixes),
            Err(ConfigError::SuffixCollision { .. })
        ));
    }

    #[test]
    fn rule_table_follows_configuration() {
        let selector = selector();
        let eeg1: Vec<_> = selector
            .rules()
            .iter()
            .filter(|r| r.role == ChannelRole::Eeg1)
            .map(|r| r.suffix.as_str())
            .collect();
        assert_eq!(eeg1, vec!["_EEG_EEG1A_B", "_EEGorig"]);
    }
}
