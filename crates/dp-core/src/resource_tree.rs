//! Three-level resource tree: namespace -> container -> leaf names.
//!
//! The same shape is used for the declared manifest, the warehouse inventory
//! and the unmanaged result. Every level keeps insertion order so output
//! follows the order resources were discovered in.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Leaf names within one container, in insertion order.
pub type LeafSet = IndexSet<String>;

/// Containers within one namespace, in insertion order.
pub type ContainerMap = IndexMap<String, LeafSet>;

/// Ordered `namespace -> container -> leaves` mapping.
///
/// Serializes as `{"namespace": {"container": ["leaf", ...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTree {
    namespaces: IndexMap<String, ContainerMap>,
}

/// Resources declared by the transformation project.
pub type ResourceManifest = ResourceTree;

/// Resources that actually exist in the warehouse.
pub type InventorySnapshot = ResourceTree;

/// Resources present in the warehouse but neither declared nor excluded.
pub type UnmanagedSet = ResourceTree;

impl ResourceTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the leaf set for `namespace.container`, creating both levels on first use.
    pub fn container_mut(&mut self, namespace: &str, container: &str) -> &mut LeafSet {
        let containers = match self.namespaces.get_index_of(namespace) {
            Some(idx) => &mut self.namespaces[idx],
            None => self.namespaces.entry(namespace.to_string()).or_default(),
        };
        match containers.get_index_of(container) {
            Some(idx) => &mut containers[idx],
            None => containers.entry(container.to_string()).or_default(),
        }
    }

    /// Insert a leaf, returning `false` if it was already present.
    pub fn insert(&mut self, namespace: &str, container: &str, name: &str) -> bool {
        let leaves = self.container_mut(namespace, container);
        if leaves.contains(name) {
            false
        } else {
            leaves.insert(name.to_string())
        }
    }

    /// Whether `namespace.container.name` is present
    pub fn contains(&self, namespace: &str, container: &str, name: &str) -> bool {
        self.container(namespace, container)
            .is_some_and(|leaves| leaves.contains(name))
    }

    /// Whether the path is present
    pub fn contains_path(&self, path: &ResourcePath) -> bool {
        self.contains(&path.namespace, &path.container, &path.name)
    }

    /// Containers recorded under a namespace
    pub fn containers(&self, namespace: &str) -> Option<&ContainerMap> {
        self.namespaces.get(namespace)
    }

    /// Leaves recorded under `namespace.container`
    pub fn container(&self, namespace: &str, container: &str) -> Option<&LeafSet> {
        self.namespaces.get(namespace)?.get(container)
    }

    /// Namespace keys in insertion order
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Iterate `(namespace, container, leaves)` in insertion order.
    pub fn iter_containers(&self) -> impl Iterator<Item = (&str, &str, &LeafSet)> {
        self.namespaces.iter().flat_map(|(namespace, containers)| {
            containers
                .iter()
                .map(move |(container, leaves)| (namespace.as_str(), container.as_str(), leaves))
        })
    }

    /// Iterate every leaf as a fully-qualified path.
    pub fn paths(&self) -> impl Iterator<Item = ResourcePath> + '_ {
        self.iter_containers().flat_map(|(namespace, container, leaves)| {
            leaves
                .iter()
                .map(move |name| ResourcePath::new(namespace, container, name))
        })
    }

    /// Total number of leaves
    pub fn len(&self) -> usize {
        self.iter_containers().map(|(_, _, leaves)| leaves.len()).sum()
    }

    /// True when the tree holds no leaves
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of namespaces
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Number of containers across all namespaces
    pub fn container_count(&self) -> usize {
        self.namespaces.values().map(IndexMap::len).sum()
    }

    /// Serialize as pretty JSON with 4-space indentation.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
    }
}

impl<'a> FromIterator<(&'a str, &'a str, &'a str)> for ResourceTree {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str, &'a str)>>(iter: I) -> Self {
        let mut tree = ResourceTree::new();
        for (namespace, container, name) in iter {
            tree.insert(namespace, container, name);
        }
        tree
    }
}

/// Fully-qualified location of one leaf resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourcePath {
    /// Top-level namespace (cloud project)
    pub namespace: String,
    /// Mid-level container (dataset)
    pub container: String,
    /// Leaf resource name (table)
    pub name: String,
}

impl ResourcePath {
    /// Create a new path
    pub fn new(
        namespace: impl Into<String>,
        container: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            container: container.into(),
            name: name.into(),
        }
    }

    /// The `namespace.container` prefix of this path
    pub fn container_path(&self) -> String {
        format!("{}.{}", self.namespace, self.container)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.namespace, self.container, self.name)
    }
}

#[cfg(test)]
#[path = "resource_tree_test.rs"]
mod tests;
