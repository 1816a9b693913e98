//! # Memory Container Adapter
//!
//! In-memory hierarchical store of groups, datasets, attributes and
//! external links. Persisted as JSON.
//!
//! Good for:
//! - Testing
//! - Small grids
//! - Exchanging grids without an HDF5 toolchain
//!
//! External links point at other container files. Relative link paths are
//! resolved against the directory of the container file that holds them.
//! Chains of links are followed at most [`MAX_LINK_DEPTH`] deep.
//!
//! JSON has no NaN or infinity, so datasets holding them are rejected on
//! write rather than saved as `null`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::config::CopyPolicy;
use crate::core::DeferredReference;
use crate::ports::{Container, ContainerError, ContainerResult, Dataset};

/// A dataset together with its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredDataset {
    dataset: Dataset,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
    #[serde(default)]
    compression: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Group {
    #[serde(default)]
    attrs: BTreeMap<String, String>,
    #[serde(default)]
    members: BTreeMap<String, Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Group(Group),
    Dataset(StoredDataset),
    ExternalLink(DeferredReference),
}

/// Longest chain of external links followed before giving up
pub const MAX_LINK_DEPTH: usize = 16;

/// Split a container path into its non-empty segments
fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// In-memory container adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryContainer {
    root: Node,

    /// File this container was loaded from or last saved to
    #[serde(skip)]
    origin: Option<PathBuf>,
}

impl Default for MemoryContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self {
            root: Node::Group(Group::default()),
            origin: None,
        }
    }

    /// Builder: set the file relative links are resolved against
    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// File this container is associated with, if any
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Whether the dataset at `path` was written with compression enabled
    pub fn is_compressed(&self, path: &str) -> bool {
        matches!(self.node(path), Some(Node::Dataset(stored)) if stored.compression)
    }

    /// Whether `path` holds an external link rather than data
    pub fn is_link(&self, path: &str) -> bool {
        matches!(self.node(path), Some(Node::ExternalLink(_)))
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Serialize the container to bytes
    pub fn to_bytes(&self) -> ContainerResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ContainerError::Serialization(e.to_string()))
    }

    /// Deserialize a container from bytes
    pub fn from_bytes(data: &[u8]) -> ContainerResult<Self> {
        serde_json::from_slice(data).map_err(|e| ContainerError::Serialization(e.to_string()))
    }

    /// Write the container to a file and remember it as the origin
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> ContainerResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()?)?;
        self.origin = Some(path.to_path_buf());
        Ok(())
    }

    /// Load a container from a file
    pub fn load_from_file(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(&data)?.with_origin(path))
    }

    /// Load the container at `path`, or start an empty one bound to it
    pub fn open_or_create(path: impl AsRef<Path>) -> ContainerResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::new().with_origin(path))
        }
    }

    // ========================================================================
    // NODE ACCESS
    // ========================================================================

    fn node(&self, path: &str) -> Option<&Node> {
        let mut current = &self.root;
        for segment in segments(path) {
            current = match current {
                Node::Group(group) => group.members.get(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn node_mut(&mut self, path: &str) -> Option<&mut Node> {
        let mut current = &mut self.root;
        for segment in segments(path) {
            current = match current {
                Node::Group(group) => group.members.get_mut(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn group_mut(&mut self, path: &str) -> ContainerResult<&mut Group> {
        match self.node_mut(path) {
            Some(Node::Group(group)) => Ok(group),
            Some(_) => Err(ContainerError::NotAGroup(path.to_string())),
            None => Err(ContainerError::NotFound(path.to_string())),
        }
    }

    /// Put a node at `path`, creating parent groups as needed
    fn insert(&mut self, path: &str, node: Node) -> ContainerResult<()> {
        let mut parts = segments(path);
        let name = parts
            .pop()
            .ok_or_else(|| ContainerError::NotADataset(path.to_string()))?
            .to_string();
        let parent = parts.join("/");

        self.require_group(&parent)?;
        self.group_mut(&parent)?.members.insert(name, node);
        Ok(())
    }

    /// Resolve a link's file against this container's location
    fn link_file(&self, reference: &DeferredReference) -> PathBuf {
        if reference.file.is_absolute() {
            return reference.file.clone();
        }
        match self.origin.as_deref().and_then(Path::parent) {
            Some(dir) => dir.join(&reference.file),
            None => reference.file.clone(),
        }
    }

    /// Open the file a link points at, `depth` links into a chain
    fn open_link(&self, reference: &DeferredReference, depth: usize) -> ContainerResult<MemoryContainer> {
        let file = self.link_file(reference);
        if depth >= MAX_LINK_DEPTH {
            return Err(ContainerError::BrokenLink {
                file,
                reason: format!("more than {} nested external links", MAX_LINK_DEPTH),
            });
        }
        MemoryContainer::load_from_file(&file).map_err(|e| ContainerError::BrokenLink {
            file,
            reason: e.to_string(),
        })
    }

    /// The dataset at `path` with its attributes, following links
    fn resolve_dataset(&self, path: &str, depth: usize) -> ContainerResult<StoredDataset> {
        match self.node(path) {
            Some(Node::Dataset(stored)) => Ok(stored.clone()),
            Some(Node::ExternalLink(reference)) => self
                .open_link(reference, depth)?
                .resolve_dataset(&reference.path, depth + 1),
            Some(Node::Group(_)) => Err(ContainerError::NotADataset(path.to_string())),
            None => Err(ContainerError::NotFound(path.to_string())),
        }
    }

    fn resolve_attr(&self, path: &str, name: &str, depth: usize) -> ContainerResult<Option<String>> {
        match self.node(path) {
            Some(Node::Group(group)) => Ok(group.attrs.get(name).cloned()),
            Some(Node::Dataset(stored)) => Ok(stored.attrs.get(name).cloned()),
            Some(Node::ExternalLink(reference)) => self
                .open_link(reference, depth)?
                .resolve_attr(&reference.path, name, depth + 1),
            None => Err(ContainerError::NotFound(path.to_string())),
        }
    }
}

impl Container for MemoryContainer {
    fn contains(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    fn require_group(&mut self, path: &str) -> ContainerResult<()> {
        let mut current = &mut self.root;
        for segment in segments(path) {
            let group = match current {
                Node::Group(group) => group,
                _ => return Err(ContainerError::NotAGroup(path.to_string())),
            };
            current = group
                .members
                .entry(segment.to_string())
                .or_insert_with(|| Node::Group(Group::default()));
        }
        match current {
            Node::Group(_) => Ok(()),
            _ => Err(ContainerError::NotAGroup(path.to_string())),
        }
    }

    fn attr(&self, path: &str, name: &str) -> ContainerResult<Option<String>> {
        self.resolve_attr(path, name, 0)
    }

    fn set_attr(&mut self, path: &str, name: &str, value: &str) -> ContainerResult<()> {
        let attrs = match self.node_mut(path) {
            Some(Node::Group(group)) => &mut group.attrs,
            Some(Node::Dataset(stored)) => &mut stored.attrs,
            Some(Node::ExternalLink(_)) => return Err(ContainerError::NotADataset(path.to_string())),
            None => return Err(ContainerError::NotFound(path.to_string())),
        };
        attrs.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn members(&self, path: &str) -> ContainerResult<Vec<String>> {
        match self.node(path) {
            Some(Node::Group(group)) => Ok(group.members.keys().cloned().collect()),
            Some(_) => Err(ContainerError::NotAGroup(path.to_string())),
            None => Err(ContainerError::NotFound(path.to_string())),
        }
    }

    fn read_dataset(&self, path: &str) -> ContainerResult<Dataset> {
        Ok(self.resolve_dataset(path, 0)?.dataset)
    }

    fn write_dataset(&mut self, path: &str, dataset: Dataset, compression: bool) -> ContainerResult<()> {
        if let Some(index) = dataset.data.first_non_finite() {
            return Err(ContainerError::Serialization(format!(
                "{} holds a non-finite value at index {} ({:?} precision)",
                path,
                index,
                dataset.precision()
            )));
        }
        self.insert(
            path,
            Node::Dataset(StoredDataset {
                dataset,
                attrs: BTreeMap::new(),
                compression,
            }),
        )
    }

    fn link_or_copy(
        &mut self,
        path: &str,
        reference: &DeferredReference,
        policy: CopyPolicy,
        absolute_paths: bool,
    ) -> ContainerResult<()> {
        match policy {
            CopyPolicy::Copy => {
                let stored = self.open_link(reference, 0)?.resolve_dataset(&reference.path, 1)?;
                self.insert(path, Node::Dataset(stored))
            }
            CopyPolicy::Link => {
                let file = if absolute_paths {
                    let file = self.link_file(reference);
                    let file = if file.is_relative() {
                        std::env::current_dir()?.join(file)
                    } else {
                        file
                    };
                    std::fs::canonicalize(&file).unwrap_or(file)
                } else {
                    reference.file.clone()
                };
                self.insert(
                    path,
                    Node::ExternalLink(DeferredReference::new(file, reference.path.clone())),
                )
            }
        }
    }
}
