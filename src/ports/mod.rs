//! # Ports
//!
//! The contract a hierarchical container must meet for a grid to be read
//! from or written to it.
//!
//! Containers hold groups, datasets and string attributes, addressed by
//! `/`-separated paths relative to the container root (`"Geometry/Walls 1"`).
//! A path may also name an external link, which readers follow transparently.

use std::path::PathBuf;

use ndarray::{ArrayD, ArrayView, Dimension, IxDyn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::{CopyPolicy, Precision};
use crate::core::DeferredReference;

/// Errors raised by container implementations
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("No such object: {0}")]
    NotFound(String),

    #[error("Not a group: {0}")]
    NotAGroup(String),

    #[error("Not a dataset: {0}")]
    NotADataset(String),

    #[error("Missing attribute {name:?} on {path}")]
    MissingAttribute { path: String, name: String },

    #[error("Dataset holds {len} values, which does not fit shape {shape:?}")]
    InvalidShape { shape: Vec<usize>, len: usize },

    #[error("Cannot resolve external link to {file:?}: {reason}")]
    BrokenLink { file: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type ContainerResult<T> = Result<T, ContainerError>;

/// Stored numeric values at their on-disk precision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "values", rename_all = "lowercase")]
pub enum DatasetData {
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl DatasetData {
    pub fn len(&self) -> usize {
        match self {
            DatasetData::F32(v) => v.len(),
            DatasetData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn precision(&self) -> Precision {
        match self {
            DatasetData::F32(_) => Precision::Single,
            DatasetData::F64(_) => Precision::Double,
        }
    }

    /// Index of the first NaN or infinite value, if any
    pub fn first_non_finite(&self) -> Option<usize> {
        match self {
            DatasetData::F32(v) => v.iter().position(|x| !x.is_finite()),
            DatasetData::F64(v) => v.iter().position(|x| !x.is_finite()),
        }
    }

    fn to_f64(&self) -> Vec<f64> {
        match self {
            DatasetData::F32(v) => v.iter().map(|&x| x as f64).collect(),
            DatasetData::F64(v) => v.clone(),
        }
    }
}

/// An n-dimensional numeric dataset
///
/// `field` names the single field of a record dataset (wall arrays are
/// stored as one-field records: `r`, `t`, `p`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub shape: Vec<usize>,
    pub data: DatasetData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Dataset {
    /// Build a dataset from an array, rounding to `precision` (row-major)
    ///
    /// Values beyond the `f32` range become infinite at single precision;
    /// see [`DatasetData::first_non_finite`].
    pub fn from_array<D: Dimension>(array: ArrayView<'_, f64, D>, precision: Precision) -> Self {
        let data = match precision {
            Precision::Single => DatasetData::F32(array.iter().map(|&x| x as f32).collect()),
            Precision::Double => DatasetData::F64(array.iter().copied().collect()),
        };
        Self {
            shape: array.shape().to_vec(),
            data,
            field: None,
        }
    }

    /// Builder: name the record field
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Widen to an `f64` array of the stored shape
    pub fn to_array(&self) -> Result<ArrayD<f64>, ContainerError> {
        ArrayD::from_shape_vec(IxDyn(&self.shape), self.data.to_f64()).map_err(|_| {
            ContainerError::InvalidShape {
                shape: self.shape.clone(),
                len: self.data.len(),
            }
        })
    }

    pub fn precision(&self) -> Precision {
        self.data.precision()
    }
}

/// Hierarchical group/attribute/dataset store
pub trait Container {
    /// Whether anything (group, dataset or link) exists at `path`
    fn contains(&self, path: &str) -> bool;

    /// Create the group at `path` (and its parents) unless it exists
    fn require_group(&mut self, path: &str) -> ContainerResult<()>;

    /// Read a string attribute, `None` if the object lacks it
    fn attr(&self, path: &str, name: &str) -> ContainerResult<Option<String>>;

    /// Set a string attribute on a group or dataset
    fn set_attr(&mut self, path: &str, name: &str, value: &str) -> ContainerResult<()>;

    /// Names of the direct members of a group, sorted
    fn members(&self, path: &str) -> ContainerResult<Vec<String>>;

    /// Read a dataset, following external links
    fn read_dataset(&self, path: &str) -> ContainerResult<Dataset>;

    /// Write a dataset, replacing anything already at `path`
    fn write_dataset(&mut self, path: &str, dataset: Dataset, compression: bool) -> ContainerResult<()>;

    /// Place externally stored data at `path`, either by copying it in or by
    /// storing a link to it
    fn link_or_copy(
        &mut self,
        path: &str,
        reference: &DeferredReference,
        policy: CopyPolicy,
        absolute_paths: bool,
    ) -> ContainerResult<()>;

    /// Attribute that must be present
    fn require_attr(&self, path: &str, name: &str) -> ContainerResult<String> {
        self.attr(path, name)?
            .ok_or_else(|| ContainerError::MissingAttribute {
                path: path.to_string(),
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_dataset_roundtrip_double() {
        let array = Array2::from_shape_fn((2, 3), |(i, j)| (i * 3 + j) as f64 + 0.1);
        let dataset = Dataset::from_array(array.view(), Precision::Double);

        assert_eq!(dataset.shape, vec![2, 3]);
        assert_eq!(dataset.precision(), Precision::Double);
        assert_eq!(dataset.to_array().unwrap(), array.into_dyn());
    }

    #[test]
    fn test_dataset_single_precision_rounds() {
        let array = Array2::from_elem((1, 2), 0.1);
        let dataset = Dataset::from_array(array.view(), Precision::Single);

        let back = dataset.to_array().unwrap();
        assert_eq!(back[[0, 0]], 0.1f32 as f64);
        assert!(matches!(dataset.data, DatasetData::F32(_)));
    }

    #[test]
    fn test_dataset_single_precision_overflow_is_not_finite() {
        let array = Array2::from_elem((1, 2), 1e300);

        let double = Dataset::from_array(array.view(), Precision::Double);
        assert_eq!(double.data.first_non_finite(), None);

        let single = Dataset::from_array(array.view(), Precision::Single);
        assert_eq!(single.data.first_non_finite(), Some(0));
    }

    #[test]
    fn test_dataset_bad_shape() {
        let dataset = Dataset {
            shape: vec![2, 2],
            data: DatasetData::F64(vec![1.0, 2.0, 3.0]),
            field: Some("r".to_string()),
        };
        assert!(matches!(
            dataset.to_array(),
            Err(ContainerError::InvalidShape { len: 3, .. })
        ));
    }
}
