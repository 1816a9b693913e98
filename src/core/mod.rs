//! # Core
//!
//! Pure geometry and data types. No I/O.
//!
//! - `walls` - validated wall arrays and the grid shape
//! - `geometry` - centres, volumes, areas, widths
//! - `quantity` - named per-cell fields and deferred references
//! - `identity` - wall fingerprint
//! - `config` - write options and quantity selection
//! - `error` - validation, format and integrity errors

pub mod broadcast;
pub mod config;
pub mod error;
pub mod geometry;
pub mod identity;
pub mod quantity;
pub mod walls;

pub use error::{Axis, GridError, GridResult, ValidationError};
pub use geometry::{Face, Geometry};
pub use quantity::{ArrayLike, DeferredReference, Quantity, QuantityStore, QuantityValue};
pub use walls::{GridShape, WallInput, Walls};
