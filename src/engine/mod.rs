//! # Engine
//!
//! The orchestration layer that wires everything together.
//!
//! This is where:
//! - Walls become geometry
//! - Quantities are attached and checked against the grid
//! - Grid state is read from and written to containers

mod grid;

pub use grid::{SphericalPolarGrid, GRID_TYPE};
