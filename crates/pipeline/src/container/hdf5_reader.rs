//! HDF5 backend for MATLAB v7.3 exports.
//!
//! Spike2 writes each channel as a top-level group. Waveform channels carry a
//! `values` dataset and marker channels carry a `codes` dataset.

use std::path::Path;

use hdf5::{File, Group, H5Type};
use tracing::debug;

use super::{ContainerContents, ContainerGroup, ContainerReader, NumericArray};
use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct Hdf5Reader;

impl ContainerReader for Hdf5Reader {
    fn name(&self) -> &'static str {
        "hdf5"
    }

    fn read(&self, path: &Path, wanted: &dyn Fn(&str) -> bool) -> PipelineResult<ContainerContents> {
        let file = File::open(path).map_err(|e| container_error(path, e))?;
        let names = file.member_names().map_err(|e| container_error(path, e))?;

        let mut contents = ContainerContents::new();
        for name in names {
            if !wanted(&name) {
                continue;
            }
            let group = match file.group(&name) {
                Ok(group) => group,
                Err(e) => {
                    debug!("Skipping '{}': not a group ({})", name, e);
                    continue;
                }
            };
            let values = read_array::<f64>(&group, "values").map_err(|e| container_error(path, e))?;
            let codes = read_array::<i64>(&group, "codes").map_err(|e| container_error(path, e))?;
            contents.insert(
                name,
                ContainerGroup {
                    values: values.map(|(shape, data)| NumericArray::new(shape, data)).transpose()?,
                    codes: codes.map(|(shape, data)| NumericArray::new(shape, data)).transpose()?,
                },
            );
        }
        Ok(contents)
    }
}

fn read_array<T: H5Type>(group: &Group, name: &str) -> hdf5::Result<Option<(Vec<usize>, Vec<T>)>> {
    if !group.link_exists(name) {
        return Ok(None);
    }
    let dataset = group.dataset(name)?;
    let shape = dataset.shape();
    let data = dataset.read_raw::<T>()?;
    Ok(Some((shape, data)))
}

fn container_error(path: &Path, err: hdf5::Error) -> PipelineError {
    PipelineError::Container {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_recording(path: &Path) -> hdf5::Result<()> {
        let file = File::create(path)?;

        let eeg = file.create_group("rec_EEG_EEG1A_B")?;
        eeg.new_dataset::<f64>()
            .shape((1, 4))
            .create("values")?
            .write_raw(&[0.5, -1.0, 2.25, 3.0][..])?;

        let stages = file.create_group("rec_Stage_1_")?;
        stages
            .new_dataset::<u8>()
            .shape((2, 3))
            .create("codes")?
            .write_raw(&[1u8, 2, 3, 0, 0, 0][..])?;

        file.create_group("rec_Keyboard")?;
        file.new_dataset::<f64>()
            .shape(3)
            .create("rec_EMG_EMG")?
            .write_raw(&[1.0, 2.0, 3.0][..])?;

        let notes = file.create_group("notes")?;
        notes
            .new_dataset::<f64>()
            .shape(2)
            .create("values")?
            .write_raw(&[9.0, 9.0][..])?;
        Ok(())
    }

    #[test]
    fn reads_wanted_groups_and_converts_codes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.mat");
        write_recording(&path).unwrap();

        let contents = Hdf5Reader
            .read(&path, &|key: &str| key.starts_with("rec_"))
            .unwrap();

        let keys: Vec<_> = contents.keys().collect();
        assert_eq!(keys, vec!["rec_EEG_EEG1A_B", "rec_Keyboard", "rec_Stage_1_"]);

        let eeg = contents.get("rec_EEG_EEG1A_B").unwrap();
        assert_eq!(
            eeg.values,
            Some(NumericArray::new(vec![1, 4], vec![0.5, -1.0, 2.25, 3.0]).unwrap())
        );
        assert_eq!(eeg.codes, None);

        let stages = contents.get("rec_Stage_1_").unwrap();
        let codes = stages.codes.as_ref().unwrap();
        assert_eq!(codes, &NumericArray::new(vec![2, 3], vec![1i64, 2, 3, 0, 0, 0]).unwrap());
        assert_eq!(codes.first_row(), &[1, 2, 3]);
        assert_eq!(stages.values, None);

        assert_eq!(contents.get("rec_Keyboard"), Some(&ContainerGroup::default()));
    }

    #[test]
    fn unreadable_file_is_a_container_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.mat");
        std::fs::write(&path, b"not an hdf5 file").unwrap();

        let err = Hdf5Reader.read(&path, &|_: &str| true).unwrap_err();
        assert!(matches!(err, PipelineError::Container { .. }));
    }
}
