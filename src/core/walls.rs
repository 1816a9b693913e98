//! # Walls
//!
//! The three boundary coordinate arrays that define a grid.
//!
//! Walls arrive in many forms (slices, vectors, ndarray arrays of any
//! dimensionality). [`WallInput`] normalises them to a 1-D `f64` array;
//! [`Walls::new`] then checks each axis before anything is derived.

use ndarray::{Array1, ArrayBase, Data, Ix1, IxDyn};

use super::error::{Axis, ValidationError};

/// Anything that can be turned into a 1-D wall array
pub trait WallInput {
    /// Convert to a 1-D array, failing if the input is not 1-D
    fn to_walls(&self, axis: Axis) -> Result<Array1<f64>, ValidationError>;
}

impl WallInput for [f64] {
    fn to_walls(&self, _axis: Axis) -> Result<Array1<f64>, ValidationError> {
        Ok(Array1::from(self.to_vec()))
    }
}

impl WallInput for Vec<f64> {
    fn to_walls(&self, axis: Axis) -> Result<Array1<f64>, ValidationError> {
        self.as_slice().to_walls(axis)
    }
}

impl<const N: usize> WallInput for [f64; N] {
    fn to_walls(&self, axis: Axis) -> Result<Array1<f64>, ValidationError> {
        self.as_slice().to_walls(axis)
    }
}

impl<S> WallInput for ArrayBase<S, Ix1>
where
    S: Data<Elem = f64>,
{
    fn to_walls(&self, _axis: Axis) -> Result<Array1<f64>, ValidationError> {
        Ok(self.to_owned())
    }
}

impl<S> WallInput for ArrayBase<S, IxDyn>
where
    S: Data<Elem = f64>,
{
    fn to_walls(&self, axis: Axis) -> Result<Array1<f64>, ValidationError> {
        if self.ndim() != 1 {
            return Err(ValidationError::NotOneDimensional {
                axis,
                ndim: self.ndim(),
            });
        }
        Ok(self.iter().copied().collect())
    }
}

impl<T: WallInput + ?Sized> WallInput for &T {
    fn to_walls(&self, axis: Axis) -> Result<Array1<f64>, ValidationError> {
        (**self).to_walls(axis)
    }
}

/// Validated wall positions for all three axes
#[derive(Debug, Clone, PartialEq)]
pub struct Walls {
    r: Array1<f64>,
    t: Array1<f64>,
    p: Array1<f64>,
}

impl Walls {
    /// Validate and store wall arrays
    ///
    /// Each axis must be 1-D, hold at least two values and be strictly
    /// increasing. Radial walls must also be non-negative.
    pub fn new<R, T, P>(r_wall: R, t_wall: T, p_wall: P) -> Result<Self, ValidationError>
    where
        R: WallInput,
        T: WallInput,
        P: WallInput,
    {
        let r = r_wall.to_walls(Axis::Radial)?;
        let t = t_wall.to_walls(Axis::Polar)?;
        let p = p_wall.to_walls(Axis::Azimuthal)?;

        check_axis(&r, Axis::Radial)?;
        check_axis(&t, Axis::Polar)?;
        check_axis(&p, Axis::Azimuthal)?;

        if r[0] < 0.0 {
            return Err(ValidationError::NegativeRadius { value: r[0] });
        }

        Ok(Self { r, t, p })
    }

    /// Radial walls
    pub fn r(&self) -> &Array1<f64> {
        &self.r
    }

    /// Polar walls
    pub fn t(&self) -> &Array1<f64> {
        &self.t
    }

    /// Azimuthal walls
    pub fn p(&self) -> &Array1<f64> {
        &self.p
    }

    /// Walls along the given axis
    pub fn axis(&self, axis: Axis) -> &Array1<f64> {
        match axis {
            Axis::Radial => &self.r,
            Axis::Polar => &self.t,
            Axis::Azimuthal => &self.p,
        }
    }

    /// Cell counts `(np, nt, nr)`
    pub fn shape(&self) -> GridShape {
        GridShape {
            np: self.p.len() - 1,
            nt: self.t.len() - 1,
            nr: self.r.len() - 1,
        }
    }
}

/// Reject short or non-increasing walls (NaN fails the comparison too)
fn check_axis(walls: &Array1<f64>, axis: Axis) -> Result<(), ValidationError> {
    if walls.len() < 2 {
        return Err(ValidationError::TooFewWalls {
            axis,
            len: walls.len(),
        });
    }

    for (index, (lo, hi)) in walls.iter().zip(walls.iter().skip(1)).enumerate() {
        if !(hi > lo) {
            return Err(ValidationError::NotIncreasing {
                axis,
                index: index + 1,
            });
        }
    }

    Ok(())
}

/// Number of cells along each axis, in array axis order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    /// Azimuthal cells
    pub np: usize,
    /// Polar cells
    pub nt: usize,
    /// Radial cells
    pub nr: usize,
}

impl GridShape {
    /// As an ndarray shape tuple
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.np, self.nt, self.nr)
    }

    /// As a slice-comparable vector
    pub fn to_vec(&self) -> Vec<usize> {
        vec![self.np, self.nt, self.nr]
    }

    /// Total number of cells
    pub fn n_cells(&self) -> usize {
        self.np * self.nt * self.nr
    }

    /// Shape with `k` stacked components in front
    pub fn stacked(&self, k: usize) -> (usize, usize, usize, usize) {
        (k, self.np, self.nt, self.nr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, ArrayD};

    #[test]
    fn test_walls_accept_slices_and_arrays() {
        let walls = Walls::new(vec![0.0, 1.0, 2.0], [0.0, 1.0], array![0.0, 3.0, 6.0]).unwrap();

        assert_eq!(walls.shape(), GridShape { np: 2, nt: 1, nr: 2 });
        assert_eq!(walls.t().len(), 2);
    }

    #[test]
    fn test_walls_reject_non_increasing() {
        let result = Walls::new(vec![0.0, 1.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]);

        match result {
            Err(ValidationError::NotIncreasing { axis, index }) => {
                assert_eq!(axis, Axis::Radial);
                assert_eq!(index, 2);
            }
            other => panic!("Expected NotIncreasing, got {:?}", other),
        }
    }

    #[test]
    fn test_walls_reject_decreasing_polar() {
        let result = Walls::new(vec![1.0, 2.0], vec![1.0, 0.5], vec![0.0, 1.0]);
        assert!(matches!(
            result,
            Err(ValidationError::NotIncreasing { axis: Axis::Polar, .. })
        ));
    }

    #[test]
    fn test_walls_reject_nan() {
        let result = Walls::new(vec![1.0, 2.0], vec![0.0, 1.0], vec![0.0, f64::NAN]);
        assert!(matches!(
            result,
            Err(ValidationError::NotIncreasing { axis: Axis::Azimuthal, .. })
        ));
    }

    #[test]
    fn test_walls_reject_multidimensional() {
        let r = ArrayD::<f64>::zeros(vec![2, 2]);
        let result = Walls::new(r, vec![0.0, 1.0], vec![0.0, 1.0]);

        assert_eq!(
            result,
            Err(ValidationError::NotOneDimensional {
                axis: Axis::Radial,
                ndim: 2
            })
        );
    }

    #[test]
    fn test_walls_accept_dynamic_1d() {
        let r = ArrayD::from_shape_vec(vec![3], vec![1.0, 2.0, 3.0]).unwrap();
        let walls = Walls::new(r, vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        assert_eq!(walls.shape().nr, 2);
    }

    #[test]
    fn test_walls_reject_single_value() {
        let result = Walls::new(vec![1.0], vec![0.0, 1.0], vec![0.0, 1.0]);
        assert_eq!(
            result,
            Err(ValidationError::TooFewWalls {
                axis: Axis::Radial,
                len: 1
            })
        );
    }

    #[test]
    fn test_walls_reject_negative_radius() {
        let result = Walls::new(vec![-1.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]);
        assert_eq!(result, Err(ValidationError::NegativeRadius { value: -1.0 }));
    }

    #[test]
    fn test_grid_shape_helpers() {
        let shape = GridShape { np: 4, nt: 3, nr: 2 };
        assert_eq!(shape.n_cells(), 24);
        assert_eq!(shape.dims(), (4, 3, 2));
        assert_eq!(shape.stacked(5), (5, 4, 3, 2));
        assert_eq!(shape.to_vec(), vec![4, 3, 2]);
    }
}
