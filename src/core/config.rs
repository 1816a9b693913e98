//! # Configuration
//!
//! Options that control how a grid is written to a container, and which
//! quantities take part in a read or write.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Floating-point width used when writing a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 32-bit
    Single,
    /// 64-bit
    #[default]
    Double,
}

impl Precision {
    /// Round a value to this precision and widen it back
    pub fn round(self, value: f64) -> f64 {
        match self {
            Precision::Single => value as f32 as f64,
            Precision::Double => value,
        }
    }
}

/// What to do with a deferred quantity when writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyPolicy {
    /// Copy the referenced data into the target container
    #[default]
    Copy,
    /// Store an external link to the referenced data
    Link,
}

/// Which quantities take part in a read or write
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantitySelector {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl QuantitySelector {
    /// Select only the given names
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QuantitySelector::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            QuantitySelector::All => true,
            QuantitySelector::Only(names) => names.contains(name),
        }
    }
}

impl From<&str> for QuantitySelector {
    /// `"all"` selects everything; any other string selects that one name
    fn from(value: &str) -> Self {
        if value == "all" {
            QuantitySelector::All
        } else {
            QuantitySelector::only([value])
        }
    }
}

impl From<Vec<&str>> for QuantitySelector {
    fn from(names: Vec<&str>) -> Self {
        QuantitySelector::only(names)
    }
}

impl From<Vec<String>> for QuantitySelector {
    fn from(names: Vec<String>) -> Self {
        QuantitySelector::only(names)
    }
}

/// Options for writing a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Copy or link deferred quantities
    pub copy: CopyPolicy,

    /// Store absolute paths in external links
    pub absolute_paths: bool,

    /// Compress datasets (no effect on values)
    pub compression: bool,

    /// Precision of the wall datasets
    pub wall_precision: Precision,

    /// Precision of the quantity datasets
    pub quantity_precision: Precision,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            copy: CopyPolicy::Copy,
            absolute_paths: false,
            compression: true,
            wall_precision: Precision::Double,
            quantity_precision: Precision::Double,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set copy policy
    pub fn with_copy(mut self, copy: CopyPolicy) -> Self {
        self.copy = copy;
        self
    }

    /// Builder: store absolute link paths
    pub fn with_absolute_paths(mut self, absolute: bool) -> Self {
        self.absolute_paths = absolute;
        self
    }

    /// Builder: toggle compression
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    /// Builder: set wall precision
    pub fn with_wall_precision(mut self, precision: Precision) -> Self {
        self.wall_precision = precision;
        self
    }

    /// Builder: set quantity precision
    pub fn with_quantity_precision(mut self, precision: Precision) -> Self {
        self.quantity_precision = precision;
        self
    }
}
