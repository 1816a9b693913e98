//! # Spherical-Polar Grid
//!
//! The main grid object.
//!
//! This struct wires together:
//! - Walls and the geometry derived from them
//! - The geometry fingerprint
//! - Named quantities
//!
//! And reads/writes the lot through any [`Container`].
//!
//! ## Container layout
//!
//! ```text
//! /
//! ├── Geometry        grid_type = "sph_pol", geometry = <fingerprint>
//! │   ├── Walls 1     radial walls,    Unit = "cm"
//! │   ├── Walls 2     polar walls,     Unit = "cm"
//! │   └── Walls 3     azimuthal walls, Unit = "cm"
//! └── Physics
//!     └── <name>      one dataset (or external link) per quantity,
//!                     geometry = <fingerprint>
//! ```

use ndarray::{Array1, Array3, Array4};

use crate::core::config::{QuantitySelector, WriteOptions};
use crate::core::identity::{fingerprint, geometry_id};
use crate::core::quantity::check_stored_shape;
use crate::core::{
    Axis, Geometry, GridError, GridResult, GridShape, Quantity, QuantityStore, QuantityValue,
    ValidationError, WallInput, Walls,
};
use crate::ports::{Container, Dataset};

/// Grid type tag written to the geometry group
pub const GRID_TYPE: &str = "sph_pol";

const GEOMETRY_GROUP: &str = "Geometry";
const PHYSICS_GROUP: &str = "Physics";
const WALL_UNIT: &str = "cm";

/// Wall datasets in storage order
const WALL_DATASETS: [(&str, Axis); 3] = [
    ("Walls 1", Axis::Radial),
    ("Walls 2", Axis::Polar),
    ("Walls 3", Axis::Azimuthal),
];

fn child(group: &str, name: &str) -> String {
    format!("{}/{}", group, name)
}

/// Names of in-memory array quantities that do not fit `shape`
fn stale_quantities<'a>(quantities: &'a QuantityStore, shape: &GridShape) -> Vec<&'a str> {
    quantities
        .iter()
        .filter(|(_, q)| matches!(q.as_array(), Some(a) if check_stored_shape(a, shape).is_err()))
        .map(|(name, _)| name)
        .collect()
}

fn warn_stale(quantities: &QuantityStore, shape: &GridShape) {
    for name in stale_quantities(quantities, shape) {
        log::warn!(
            "quantity {:?} does not match the new grid shape {:?} and will fail on write",
            name,
            shape.to_vec()
        );
    }
}

/// Geometry plus its fingerprint, replaced as a unit
#[derive(Debug, Clone)]
struct Derived {
    geometry: Geometry,
    id: String,
}

impl Derived {
    fn new(walls: Walls) -> Self {
        let id = geometry_id(&walls);
        Self {
            geometry: Geometry::new(walls),
            id,
        }
    }
}

/// A spherical-polar grid and its quantities
#[derive(Debug, Clone, Default)]
pub struct SphericalPolarGrid {
    derived: Option<Derived>,
    quantities: QuantityStore,
}

impl SphericalPolarGrid {
    /// Create a grid with no walls yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grid and set its walls
    pub fn from_walls<R, T, P>(r_wall: R, t_wall: T, p_wall: P) -> Result<Self, ValidationError>
    where
        R: WallInput,
        T: WallInput,
        P: WallInput,
    {
        let mut grid = Self::new();
        grid.set_walls(r_wall, t_wall, p_wall)?;
        Ok(grid)
    }

    /// Set the walls and recompute all derived geometry
    ///
    /// On failure the grid is left exactly as it was. Quantities are kept;
    /// any that no longer fit the new shape are logged at `warn`.
    pub fn set_walls<R, T, P>(&mut self, r_wall: R, t_wall: T, p_wall: P) -> Result<(), ValidationError>
    where
        R: WallInput,
        T: WallInput,
        P: WallInput,
    {
        let walls = Walls::new(r_wall, t_wall, p_wall)?;
        let derived = Derived::new(walls);
        warn_stale(&self.quantities, &derived.geometry.shape());
        self.derived = Some(derived);
        Ok(())
    }

    /// Whether walls have been set
    pub fn is_initialized(&self) -> bool {
        self.derived.is_some()
    }

    fn derived(&self) -> Result<&Derived, ValidationError> {
        self.derived.as_ref().ok_or(ValidationError::WallsNotSet)
    }

    // ========================================================================
    // GEOMETRY
    // ========================================================================

    /// All derived geometry
    pub fn geometry(&self) -> Result<&Geometry, ValidationError> {
        Ok(&self.derived()?.geometry)
    }

    /// Cell counts `(np, nt, nr)`
    pub fn shape(&self) -> Result<GridShape, ValidationError> {
        Ok(self.geometry()?.shape())
    }

    pub fn n_cells(&self) -> Result<usize, ValidationError> {
        Ok(self.shape()?.n_cells())
    }

    pub fn walls(&self) -> Result<&Walls, ValidationError> {
        Ok(self.geometry()?.walls())
    }

    pub fn r(&self) -> Result<&Array1<f64>, ValidationError> {
        Ok(self.geometry()?.r())
    }

    pub fn t(&self) -> Result<&Array1<f64>, ValidationError> {
        Ok(self.geometry()?.t())
    }

    pub fn p(&self) -> Result<&Array1<f64>, ValidationError> {
        Ok(self.geometry()?.p())
    }

    pub fn gr(&self) -> Result<&Array3<f64>, ValidationError> {
        Ok(self.geometry()?.gr())
    }

    pub fn gt(&self) -> Result<&Array3<f64>, ValidationError> {
        Ok(self.geometry()?.gt())
    }

    pub fn gp(&self) -> Result<&Array3<f64>, ValidationError> {
        Ok(self.geometry()?.gp())
    }

    pub fn gz(&self) -> Result<&Array3<f64>, ValidationError> {
        Ok(self.geometry()?.gz())
    }

    pub fn gw(&self) -> Result<&Array3<f64>, ValidationError> {
        Ok(self.geometry()?.gw())
    }

    pub fn volumes(&self) -> Result<&Array3<f64>, ValidationError> {
        Ok(self.geometry()?.volumes())
    }

    pub fn areas(&self) -> Result<&Array4<f64>, ValidationError> {
        Ok(self.geometry()?.areas())
    }

    pub fn widths(&self) -> Result<&Array4<f64>, ValidationError> {
        Ok(self.geometry()?.widths())
    }

    /// Fingerprint of the current walls
    pub fn geometry_id(&self) -> Result<&str, ValidationError> {
        Ok(&self.derived()?.id)
    }

    // ========================================================================
    // QUANTITIES
    // ========================================================================

    /// Attach a quantity, checking arrays against the grid shape
    pub fn set_quantity(
        &mut self,
        name: impl Into<String>,
        value: impl Into<QuantityValue>,
    ) -> Result<(), ValidationError> {
        let shape = self.derived.as_ref().map(|d| d.geometry.shape());
        self.quantities.set(name, value, shape.as_ref())
    }

    pub fn quantity(&self, name: &str) -> Option<&Quantity> {
        self.quantities.get(name)
    }

    pub fn remove_quantity(&mut self, name: &str) -> Option<Quantity> {
        self.quantities.remove(name)
    }

    pub fn quantity_names(&self) -> Vec<&str> {
        self.quantities.names()
    }

    pub fn quantities(&self) -> &QuantityStore {
        &self.quantities
    }

    // ========================================================================
    // CONTAINER I/O
    // ========================================================================

    /// Read walls and selected quantities from a container
    ///
    /// The grid type tag is checked before any wall data is touched, and the
    /// stored fingerprint must match the one recomputed from the loaded
    /// walls. Nothing is committed unless the whole read succeeds.
    pub fn read<C>(&mut self, container: &C, selector: impl Into<QuantitySelector>) -> GridResult<()>
    where
        C: Container + ?Sized,
    {
        let selector = selector.into();

        let grid_type = container.require_attr(GEOMETRY_GROUP, "grid_type")?;
        if grid_type != GRID_TYPE {
            return Err(GridError::Format { found: grid_type });
        }
        let stored_id = container.require_attr(GEOMETRY_GROUP, "geometry")?;

        let mut arrays = Vec::with_capacity(WALL_DATASETS.len());
        for (name, _) in WALL_DATASETS {
            arrays.push(container.read_dataset(&child(GEOMETRY_GROUP, name))?.to_array()?);
        }
        let walls = Walls::new(&arrays[0], &arrays[1], &arrays[2])?;

        let derived = Derived::new(walls);
        if derived.id != stored_id {
            return Err(GridError::Integrity {
                location: GEOMETRY_GROUP.to_string(),
                stored: stored_id,
                computed: derived.id,
            });
        }

        let shape = derived.geometry.shape();
        let mut quantities = self.quantities.clone();
        let mut count = 0;

        let names = if container.contains(PHYSICS_GROUP) {
            container.members(PHYSICS_GROUP)?
        } else {
            Vec::new()
        };

        for name in names.iter().filter(|n| selector.contains(n)) {
            let path = child(PHYSICS_GROUP, name);

            if let Some(tag) = container.attr(&path, "geometry")? {
                if tag != derived.id {
                    return Err(GridError::Integrity {
                        location: path,
                        stored: tag,
                        computed: derived.id,
                    });
                }
            }

            let array = container.read_dataset(&path)?.to_array()?;
            check_stored_shape(&array, &shape)?;
            quantities.insert(name.clone(), Quantity::Array(array));
            count += 1;
        }

        if let QuantitySelector::Only(wanted) = &selector {
            for name in wanted.iter().filter(|n| !names.contains(n)) {
                log::warn!("quantity {:?} not found in container", name);
            }
        }

        warn_stale(&quantities, &shape);

        log::info!(
            "read spherical-polar grid {} ({} cells, {} quantities)",
            derived.id,
            shape.n_cells(),
            count
        );

        self.derived = Some(derived);
        self.quantities = quantities;
        Ok(())
    }

    /// Write walls and selected quantities to a container
    ///
    /// Deferred quantities are copied or linked according to
    /// `options.copy` without being loaded here. The fingerprint written is
    /// that of the walls as stored at `options.wall_precision`.
    pub fn write<C>(
        &self,
        container: &mut C,
        selector: impl Into<QuantitySelector>,
        options: &WriteOptions,
    ) -> GridResult<()>
    where
        C: Container + ?Sized,
    {
        let selector = selector.into();
        let geometry = self.geometry()?;
        let shape = geometry.shape();
        let walls = geometry.walls();

        let selected: Vec<(&str, &Quantity)> = self
            .quantities
            .iter()
            .filter(|(name, _)| selector.contains(name))
            .collect();

        for (_, quantity) in &selected {
            if let Quantity::Array(array) = quantity {
                check_stored_shape(array, &shape)?;
            }
        }

        let precision = options.wall_precision;
        let stored: Vec<Array1<f64>> = [walls.r(), walls.t(), walls.p()]
            .iter()
            .map(|w| w.mapv(|x| precision.round(x)))
            .collect();
        let id = fingerprint(&stored[0], &stored[1], &stored[2]);

        container.require_group(GEOMETRY_GROUP)?;
        container.require_group(PHYSICS_GROUP)?;

        container.set_attr(GEOMETRY_GROUP, "grid_type", GRID_TYPE)?;
        container.set_attr(GEOMETRY_GROUP, "geometry", &id)?;

        for (name, axis) in WALL_DATASETS {
            let path = child(GEOMETRY_GROUP, name);
            let dataset = Dataset::from_array(walls.axis(axis).view(), precision)
                .with_field(axis.as_str());
            container.write_dataset(&path, dataset, options.compression)?;
            container.set_attr(&path, "Unit", WALL_UNIT)?;
        }

        for (name, quantity) in &selected {
            let path = child(PHYSICS_GROUP, name);
            match quantity {
                Quantity::Deferred(reference) => {
                    container.link_or_copy(&path, reference, options.copy, options.absolute_paths)?;
                }
                Quantity::Array(array) => {
                    let dataset = Dataset::from_array(array.view(), options.quantity_precision);
                    container.write_dataset(&path, dataset, options.compression)?;
                    container.set_attr(&path, "geometry", &id)?;
                }
            }
        }

        log::info!(
            "wrote spherical-polar grid {} ({} cells, {} quantities)",
            id,
            shape.n_cells(),
            selected.len()
        );

        Ok(())
    }
}
