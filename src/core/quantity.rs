//! # Quantities
//!
//! Named per-cell physical fields attached to a grid.
//!
//! A quantity is either an in-memory array shaped like the grid (or a stack
//! of such arrays), or a [`DeferredReference`] to data that lives in some
//! other container and is only resolved when the grid is written out.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ndarray::{Array3, ArrayD, ArrayView, Axis, Dimension, IxDyn};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::walls::GridShape;

/// Pointer to a dataset stored in another container file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredReference {
    /// Container file holding the data
    pub file: PathBuf,
    /// Dataset path inside that container
    pub path: String,
}

impl DeferredReference {
    pub fn new(file: impl Into<PathBuf>, path: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            path: path.into(),
        }
    }
}

/// Array input: a single field, or a list of fields to stack
#[derive(Debug, Clone)]
pub enum ArrayLike {
    Single(ArrayD<f64>),
    List(Vec<ArrayD<f64>>),
}

/// Anything accepted by [`QuantityStore::set`]
#[derive(Debug, Clone)]
pub enum QuantityValue {
    Array(ArrayLike),
    Deferred(DeferredReference),
}

impl From<ArrayD<f64>> for QuantityValue {
    fn from(array: ArrayD<f64>) -> Self {
        QuantityValue::Array(ArrayLike::Single(array))
    }
}

impl From<Array3<f64>> for QuantityValue {
    fn from(array: Array3<f64>) -> Self {
        QuantityValue::Array(ArrayLike::Single(array.into_dyn()))
    }
}

impl From<Vec<Array3<f64>>> for QuantityValue {
    fn from(arrays: Vec<Array3<f64>>) -> Self {
        QuantityValue::Array(ArrayLike::List(
            arrays.into_iter().map(|a| a.into_dyn()).collect(),
        ))
    }
}

impl From<Vec<ArrayD<f64>>> for QuantityValue {
    fn from(arrays: Vec<ArrayD<f64>>) -> Self {
        QuantityValue::Array(ArrayLike::List(arrays))
    }
}

impl From<DeferredReference> for QuantityValue {
    fn from(reference: DeferredReference) -> Self {
        QuantityValue::Deferred(reference)
    }
}

/// A stored quantity
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    /// Shape `(np, nt, nr)` or `(k, np, nt, nr)`
    Array(ArrayD<f64>),
    Deferred(DeferredReference),
}

impl Quantity {
    pub fn as_array(&self) -> Option<&ArrayD<f64>> {
        match self {
            Quantity::Array(array) => Some(array),
            Quantity::Deferred(_) => None,
        }
    }

    pub fn as_deferred(&self) -> Option<&DeferredReference> {
        match self {
            Quantity::Array(_) => None,
            Quantity::Deferred(reference) => Some(reference),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Quantity::Deferred(_))
    }
}

/// Check that a stored array is one field or a stack of fields of `shape`
pub fn check_stored_shape(array: &ArrayD<f64>, shape: &GridShape) -> Result<(), ValidationError> {
    let expected = shape.to_vec();
    let dims = array.shape();
    let ok = match dims.len() {
        3 => dims == expected.as_slice(),
        4 => &dims[1..] == expected.as_slice(),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::ShapeMismatch {
            got: dims.to_vec(),
            expected,
        })
    }
}

fn check_field<D: Dimension>(array: &ArrayView<'_, f64, D>, shape: &GridShape) -> Result<(), ValidationError> {
    let expected = shape.to_vec();
    if array.shape() != expected.as_slice() {
        return Err(ValidationError::ShapeMismatch {
            got: array.shape().to_vec(),
            expected,
        });
    }
    Ok(())
}

/// Normalise an array input into one array of shape `shape` or `(k, *shape)`
fn normalize(value: ArrayLike, shape: &GridShape) -> Result<ArrayD<f64>, ValidationError> {
    match value {
        ArrayLike::Single(array) => {
            check_field(&array.view(), shape)?;
            Ok(array)
        }
        ArrayLike::List(arrays) => {
            if arrays.is_empty() {
                return Err(ValidationError::EmptyArrayList);
            }
            for array in &arrays {
                check_field(&array.view(), shape)?;
            }
            let views: Vec<ArrayView<'_, f64, IxDyn>> = arrays.iter().map(|a| a.view()).collect();
            ndarray::stack(Axis(0), &views).map_err(|_| ValidationError::ShapeMismatch {
                got: arrays[0].shape().to_vec(),
                expected: shape.to_vec(),
            })
        }
    }
}

/// Name-to-quantity mapping owned by a grid
#[derive(Debug, Clone, Default)]
pub struct QuantityStore {
    quantities: BTreeMap<String, Quantity>,
}

impl QuantityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a quantity, replacing any previous value of the same name
    ///
    /// Arrays are checked against `shape` (if the grid has one yet; arrays
    /// cannot be stored before then). Deferred references are stored as-is.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<QuantityValue>,
        shape: Option<&GridShape>,
    ) -> Result<(), ValidationError> {
        let quantity = match value.into() {
            QuantityValue::Deferred(reference) => Quantity::Deferred(reference),
            QuantityValue::Array(array) => {
                let shape = shape.ok_or(ValidationError::WallsNotSet)?;
                Quantity::Array(normalize(array, shape)?)
            }
        };
        self.quantities.insert(name.into(), quantity);
        Ok(())
    }

    /// Store an already-normalised quantity without checking it
    pub(crate) fn insert(&mut self, name: String, quantity: Quantity) {
        self.quantities.insert(name, quantity);
    }

    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.quantities.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Quantity> {
        self.quantities.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.quantities.contains_key(name)
    }

    /// Quantity names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.quantities.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.quantities.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn clear(&mut self) {
        self.quantities.clear();
    }
}
