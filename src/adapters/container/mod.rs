//! # Container Adapters
//!
//! Implementations of the `Container` port.
//!
//! Available adapters:
//! - `MemoryContainer` - in-memory tree, persisted as JSON

mod memory;

pub use memory::MemoryContainer;
