//! # Errors
//!
//! Three failure classes surface from the grid:
//!
//! - [`ValidationError`] - bad walls, bad quantity shapes, geometry queried too early
//! - [`GridError::Format`] - the container holds some other kind of grid
//! - [`GridError::Integrity`] - stored and recomputed fingerprints disagree
//!
//! Container plumbing failures are carried through as [`ContainerError`].
//! Nothing here is retried; every error is raised where it is detected.

use std::fmt;

use thiserror::Error;

use crate::ports::ContainerError;

/// One of the three grid axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Radial (r)
    Radial,
    /// Polar (theta)
    Polar,
    /// Azimuthal (phi)
    Azimuthal,
}

impl Axis {
    /// Short name used for wall records and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Radial => "r",
            Axis::Polar => "t",
            Axis::Azimuthal => "p",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_wall", self.as_str())
    }
}

/// Malformed input or a query the grid cannot answer yet
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{axis} should be a 1-D sequence, got {ndim} dimensions")]
    NotOneDimensional { axis: Axis, ndim: usize },

    #[error("{axis} needs at least 2 values, got {len}")]
    TooFewWalls { axis: Axis, len: usize },

    #[error("{axis} should be monotonically increasing (violated at index {index})")]
    NotIncreasing { axis: Axis, index: usize },

    #[error("r_wall should be non-negative, got {value}")]
    NegativeRadius { value: f64 },

    #[error("Array does not have the right dimensions: {got:?} instead of {expected:?}")]
    ShapeMismatch { got: Vec<usize>, expected: Vec<usize> },

    #[error("List of arrays is empty")]
    EmptyArrayList,

    #[error("Grid walls have not been set")]
    WallsNotSet,
}

/// Top-level error for grid operations
#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Grid is not spherical polar (grid_type = {found:?})")]
    Format { found: String },

    #[error("Calculated geometry hash {computed} does not match hash in file {stored} ({location})")]
    Integrity {
        location: String,
        stored: String,
        computed: String,
    },

    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// Result alias for grid operations
pub type GridResult<T> = std::result::Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_reports_both_shapes() {
        let err = ValidationError::ShapeMismatch {
            got: vec![2, 3],
            expected: vec![1, 2, 3],
        };
        let msg = err.to_string();
        assert!(msg.contains("[2, 3]"));
        assert!(msg.contains("[1, 2, 3]"));
    }

    #[test]
    fn test_axis_display() {
        assert_eq!(Axis::Polar.to_string(), "t_wall");
        let err = ValidationError::NotIncreasing {
            axis: Axis::Azimuthal,
            index: 4,
        };
        assert!(err.to_string().starts_with("p_wall"));
    }

    #[test]
    fn test_validation_converts_into_grid_error() {
        let err: GridError = ValidationError::WallsNotSet.into();
        assert!(matches!(err, GridError::Validation(ValidationError::WallsNotSet)));
    }
}
