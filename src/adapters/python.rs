//! # Python Bindings
//!
//! PyO3 bindings for SPH-GRID.
//!
//! ## Python API
//!
//! ```python
//! import math
//! from sph_grid import SphericalPolarGrid
//!
//! grid = SphericalPolarGrid()
//! grid.set_walls([0.0, 1.0, 2.0], [0.0, math.pi / 2, math.pi], [0.0, math.pi, 2 * math.pi])
//!
//! grid.shape               # (2, 2, 2)
//! sum(grid.volumes())      # 33.51...
//!
//! grid.set_quantity("density", [1.0] * 8)
//! grid.write("grid.json", compression=False)
//!
//! loaded = SphericalPolarGrid.read("grid.json", quantities=["density"])
//! ```
//!
//! Arrays cross the boundary as flat row-major lists in `(np, nt, nr)`
//! order; areas and widths carry a leading face/direction axis.

use ndarray::{Array3, ArrayD, IxDyn};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::adapters::container::MemoryContainer;
use crate::core::config::{CopyPolicy, Precision, QuantitySelector, WriteOptions};
use crate::core::{GridError, ValidationError};
use crate::engine::SphericalPolarGrid as RustGrid;

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(format!("{}", e))
}

fn grid_error(e: GridError) -> PyErr {
    match e {
        GridError::Container(inner) => PyIOError::new_err(format!("{}", inner)),
        other => value_error(other),
    }
}

fn selector(quantities: Option<Vec<String>>) -> QuantitySelector {
    match quantities {
        Some(names) => QuantitySelector::from(names),
        None => QuantitySelector::All,
    }
}

fn precision(double: bool) -> Precision {
    if double {
        Precision::Double
    } else {
        Precision::Single
    }
}

/// Spherical-polar grid
///
/// Holds the wall arrays, the geometry derived from them and any number of
/// named per-cell quantities.
#[pyclass(name = "SphericalPolarGrid")]
pub struct PySphericalPolarGrid {
    inner: RustGrid,
}

#[pymethods]
impl PySphericalPolarGrid {
    #[new]
    fn new() -> Self {
        Self {
            inner: RustGrid::new(),
        }
    }

    /// Set the wall positions and recompute the geometry
    ///
    /// Args:
    ///     r_wall: Radial walls (strictly increasing, non-negative)
    ///     t_wall: Polar walls (strictly increasing)
    ///     p_wall: Azimuthal walls (strictly increasing)
    fn set_walls(&mut self, r_wall: Vec<f64>, t_wall: Vec<f64>, p_wall: Vec<f64>) -> PyResult<()> {
        self.inner
            .set_walls(r_wall, t_wall, p_wall)
            .map_err(value_error)
    }

    /// Cell counts as (np, nt, nr)
    #[getter]
    fn shape(&self) -> PyResult<(usize, usize, usize)> {
        Ok(self.inner.shape().map_err(value_error)?.dims())
    }

    /// Cell volumes, flat
    fn volumes(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.volumes().map_err(value_error)?.iter().copied().collect())
    }

    /// Face areas, flat, shape (6, np, nt, nr)
    fn areas(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.areas().map_err(value_error)?.iter().copied().collect())
    }

    /// Cell widths, flat, shape (3, np, nt, nr)
    fn widths(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.widths().map_err(value_error)?.iter().copied().collect())
    }

    /// Fingerprint of the current walls
    fn geometry_id(&self) -> PyResult<String> {
        Ok(self.inner.geometry_id().map_err(value_error)?.to_string())
    }

    /// Attach a quantity
    ///
    /// Args:
    ///     name: Quantity name
    ///     values: Flat values, n_cells long (or a multiple of it to stack
    ///         several fields)
    fn set_quantity(&mut self, name: &str, values: Vec<f64>) -> PyResult<()> {
        let shape = self.inner.shape().map_err(value_error)?;
        let n_cells = shape.n_cells();

        if values.is_empty() || values.len() % n_cells != 0 {
            return Err(value_error(ValidationError::ShapeMismatch {
                got: vec![values.len()],
                expected: shape.to_vec(),
            }));
        }

        if values.len() == n_cells {
            let array = Array3::from_shape_vec(shape.dims(), values).map_err(value_error)?;
            self.inner.set_quantity(name, array).map_err(value_error)
        } else {
            let (np, nt, nr) = shape.dims();
            let arrays: Vec<ArrayD<f64>> = values
                .chunks(n_cells)
                .map(|chunk| ArrayD::from_shape_vec(IxDyn(&[np, nt, nr]), chunk.to_vec()))
                .collect::<Result<_, _>>()
                .map_err(value_error)?;
            self.inner.set_quantity(name, arrays).map_err(value_error)
        }
    }

    /// Flat values of a quantity, or None if it is missing or deferred
    fn quantity(&self, name: &str) -> Option<Vec<f64>> {
        self.inner
            .quantity(name)
            .and_then(|q| q.as_array())
            .map(|a| a.iter().copied().collect())
    }

    /// Remove a quantity; returns whether it existed
    fn remove_quantity(&mut self, name: &str) -> bool {
        self.inner.remove_quantity(name).is_some()
    }

    /// Names of all quantities
    fn quantity_names(&self) -> Vec<String> {
        self.inner
            .quantity_names()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Write the grid to a container file
    ///
    /// An existing file is loaded first, so groups and datasets the grid
    /// does not write are kept.
    ///
    /// Args:
    ///     path: Container file path
    ///     quantities: Names to write (default: all)
    ///     copy: Copy deferred quantities rather than link them
    ///     absolute_paths: Store absolute paths in links
    ///     compression: Compress datasets
    ///     double_walls: Write walls at 64-bit precision
    ///     double_quantities: Write quantities at 64-bit precision
    #[pyo3(signature = (path, quantities=None, copy=true, absolute_paths=false, compression=true, double_walls=true, double_quantities=true))]
    #[allow(clippy::too_many_arguments)]
    fn write(
        &self,
        path: &str,
        quantities: Option<Vec<String>>,
        copy: bool,
        absolute_paths: bool,
        compression: bool,
        double_walls: bool,
        double_quantities: bool,
    ) -> PyResult<()> {
        let options = WriteOptions::new()
            .with_copy(if copy { CopyPolicy::Copy } else { CopyPolicy::Link })
            .with_absolute_paths(absolute_paths)
            .with_compression(compression)
            .with_wall_precision(precision(double_walls))
            .with_quantity_precision(precision(double_quantities));

        let mut container =
            MemoryContainer::open_or_create(path).map_err(|e| PyIOError::new_err(format!("{}", e)))?;
        self.inner
            .write(&mut container, selector(quantities), &options)
            .map_err(grid_error)?;
        container
            .save_to_file(path)
            .map_err(|e| PyIOError::new_err(format!("{}", e)))
    }

    /// Read a grid from a container file
    ///
    /// Args:
    ///     path: Container file path
    ///     quantities: Names to read (default: all)
    #[staticmethod]
    #[pyo3(signature = (path, quantities=None))]
    fn read(path: &str, quantities: Option<Vec<String>>) -> PyResult<Self> {
        let container =
            MemoryContainer::load_from_file(path).map_err(|e| PyIOError::new_err(format!("{}", e)))?;

        let mut inner = RustGrid::new();
        inner
            .read(&container, selector(quantities))
            .map_err(grid_error)?;

        Ok(Self { inner })
    }

    fn __repr__(&self) -> String {
        match self.inner.shape() {
            Ok(shape) => format!(
                "SphericalPolarGrid(np={}, nt={}, nr={}, quantities={})",
                shape.np,
                shape.nt,
                shape.nr,
                self.inner.quantities().len()
            ),
            Err(_) => "SphericalPolarGrid(uninitialized)".to_string(),
        }
    }
}

/// SPH-GRID Python module
#[pymodule]
fn sph_grid(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySphericalPolarGrid>()?;

    m.add("__doc__", "SPH-GRID: spherical-polar grid geometry and quantities")?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
