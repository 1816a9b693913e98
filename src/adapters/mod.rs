//! # Adapters
//!
//! Concrete implementations that plug into the ports:
//! - Container adapters: Memory (JSON on disk)
//! - Python bindings (when enabled)
//!
//! The grid engine only sees the `Container` trait, so a different backing
//! store can be dropped in without touching the geometry.

pub mod container;

#[cfg(feature = "python")]
pub mod python;
