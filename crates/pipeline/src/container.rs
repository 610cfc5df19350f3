//! Access to hierarchical recording containers
//!
//! A container is read into [`ContainerContents`]: one [`ContainerGroup`] per
//! top-level key, each holding the numeric arrays the pipeline cares about.
//! The HDF5 backend (MATLAB v7.3 exports) is behind the `hdf5` feature.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

#[cfg(feature = "hdf5")]
mod hdf5_reader;
#[cfg(feature = "hdf5")]
pub use hdf5_reader::Hdf5Reader;

/// A dense array stored in row-major order together with its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> NumericArray<T> {
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> PipelineResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(PipelineError::ArrayShape {
                shape,
                len: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional array.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// All elements in storage order, whatever the shape.
    pub fn into_flat(self) -> Vec<T> {
        self.data
    }

    /// The first row of a 2-D (or higher) array, or the whole array if it has
    /// fewer than two dimensions.
    pub fn first_row(&self) -> &[T] {
        if self.shape.len() < 2 {
            return &self.data;
        }
        let row_len: usize = self.shape[1..].iter().product();
        &self.data[..row_len.min(self.data.len())]
    }
}

/// The arrays found under one top-level container key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerGroup {
    /// Sample values of a waveform channel
    pub values: Option<NumericArray<f64>>,
    /// Marker codes of an event channel
    pub codes: Option<NumericArray<i64>>,
}

impl ContainerGroup {
    pub fn with_values(values: Vec<f64>) -> Self {
        Self {
            values: Some(NumericArray::from_vec(values)),
            codes: None,
        }
    }

    pub fn with_codes(codes: NumericArray<i64>) -> Self {
        Self {
            values: None,
            codes: Some(codes),
        }
    }
}

/// Everything read from one container, keyed by top-level name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerContents {
    groups: BTreeMap<String, ContainerGroup>,
}

impl ContainerContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, group: ContainerGroup) {
        self.groups.insert(key.into(), group);
    }

    pub fn get(&self, key: &str) -> Option<&ContainerGroup> {
        self.groups.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ContainerGroup> {
        self.groups.remove(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ContainerGroup)> for ContainerContents {
    fn from_iter<I: IntoIterator<Item = (K, ContainerGroup)>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().map(|(k, g)| (k.into(), g)).collect(),
        }
    }
}

/// Opens a container file and yields its groups.
pub trait ContainerReader {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Read the groups whose key passes `wanted`. Other keys may be skipped
    /// without loading their arrays.
    fn read(&self, path: &Path, wanted: &dyn Fn(&str) -> bool) -> PipelineResult<ContainerContents>;
}

/// Reader used when the binary is built without any container backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedReader;

impl ContainerReader for UnsupportedReader {
    fn name(&self) -> &'static str {
        "none"
    }

    fn read(&self, path: &Path, _wanted: &dyn Fn(&str) -> bool) -> PipelineResult<ContainerContents> {
        Err(PipelineError::Unsupported {
            path: path.display().to_string(),
            reason: "built without the `hdf5` feature",
        })
    }
}

/// The best reader compiled into this build.
pub fn default_reader() -> Box<dyn ContainerReader> {
    #[cfg(feature = "hdf5")]
    {
        Box::new(Hdf5Reader)
    }
    #[cfg(not(feature = "hdf5"))]
    {
        Box::new(UnsupportedReader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_row_of_two_row_codes() {
        let codes = NumericArray::new(vec![2, 3], vec![1, 2, 3, 0, 0, 0]).unwrap();
        assert_eq!(codes.first_row(), &[1, 2, 3]);
    }

    #[test]
    fn first_row_of_vector_is_whole_vector() {
        let codes = NumericArray::from_vec(vec![4i64, 5]);
        assert_eq!(codes.first_row(), &[4, 5]);
    }

    #[test]
    fn shape_must_cover_data() {
        let err = NumericArray::new(vec![2, 2], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, PipelineError::ArrayShape { len: 3, .. }));
    }

    #[test]
    fn column_vector_flattens_in_order() {
        let values = NumericArray::new(vec![3, 1], vec![0.1, 0.2, 0.3]).unwrap();
        assert_eq!(values.into_flat(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn keys_are_sorted() {
        let contents: ContainerContents = [
            ("b_EMG_EMG", ContainerGroup::with_values(vec![])),
            ("a_EEGorig", ContainerGroup::with_values(vec![])),
        ]
        .into_iter()
        .collect();
        assert_eq!(contents.keys().collect::<Vec<_>>(), vec!["a_EEGorig", "b_EMG_EMG"]);
    }

    #[cfg(not(feature = "hdf5"))]
    #[test]
    fn default_reader_without_backend_reports_unsupported() {
        let reader = default_reader();
        let err = reader.read(Path::new("x.mat"), &|_: &str| true).unwrap_err();
        assert!(matches!(err, PipelineError::Unsupported { .. }));
    }
}
