//! # SPH-GRID - Spherical-Polar Grid Geometry
//!
//! Geometry and per-cell data for non-uniform spherical-polar meshes, as
//! used by volumetric radiative-transfer simulations.
//!
//! Given three strictly increasing wall arrays (radial, polar, azimuthal),
//! the grid derives cell centres, exact wedge volumes, face areas, cell
//! widths and cylindrical coordinates, and keeps a named set of quantities
//! shaped like the grid. A fingerprint of the walls tags everything the grid
//! writes, so quantities and geometry cannot silently drift apart.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SPH-GRID                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  CORE (pure math, no I/O)                                   │
//! │    Walls, Geometry, Quantities, Identity, Options           │
//! │                                                              │
//! │  PORTS (trait contracts)                                     │
//! │    Container, Dataset                                       │
//! │                                                              │
//! │  ADAPTERS (swappable implementations)                       │
//! │    Container: Memory (JSON on disk)                         │
//! │    API: Python bindings                                      │
//! │                                                              │
//! │  ENGINE (orchestration)                                      │
//! │    SphericalPolarGrid - the main entry point                │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::f64::consts::PI;
//! use ndarray::Array3;
//! use sph_grid::{MemoryContainer, SphericalPolarGrid, WriteOptions};
//!
//! let mut grid = SphericalPolarGrid::from_walls(
//!     vec![0.0, 1.0, 2.0],
//!     vec![0.0, PI / 2.0, PI],
//!     vec![0.0, PI, 2.0 * PI],
//! ).unwrap();
//!
//! // Full sphere of radius 2
//! let volume: f64 = grid.volumes().unwrap().sum();
//! assert!((volume - 4.0 / 3.0 * PI * 8.0).abs() < 1e-9);
//!
//! grid.set_quantity("density", Array3::from_elem((2, 2, 2), 1.0)).unwrap();
//!
//! let mut container = MemoryContainer::new();
//! grid.write(&mut container, "all", &WriteOptions::default()).unwrap();
//!
//! let mut loaded = SphericalPolarGrid::new();
//! loaded.read(&container, "all").unwrap();
//! assert_eq!(loaded.geometry_id().unwrap(), grid.geometry_id().unwrap());
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Core domain - pure math, no I/O
/// Contains: Walls, Geometry, QuantityStore, fingerprint, errors, options
pub mod core;

/// Port definitions - trait contracts for adapters
/// Contains: Container trait, Dataset
pub mod ports;

/// Adapter implementations - swappable components
/// Contains: container, python submodules
pub mod adapters;

/// Engine - orchestration layer
/// Contains: SphericalPolarGrid
pub mod engine;

// ============================================================================
// PYTHON BINDINGS (when enabled)
// ============================================================================

#[cfg(feature = "python")]
pub use adapters::python::*;

// ============================================================================
// RE-EXPORTS (public API)
// ============================================================================

// Core types
pub use crate::core::{
    ArrayLike, Axis, DeferredReference, Face, Geometry, GridError, GridResult, GridShape,
    Quantity, QuantityStore, QuantityValue, ValidationError, WallInput, Walls,
};
pub use crate::core::config::{CopyPolicy, Precision, QuantitySelector, WriteOptions};
pub use crate::core::identity::fingerprint;

// Port traits
pub use crate::ports::{Container, ContainerError, Dataset, DatasetData};

// Adapters
pub use crate::adapters::container::MemoryContainer;

// Engine
pub use crate::engine::{SphericalPolarGrid, GRID_TYPE};
