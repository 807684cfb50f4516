//! Declared-resource manifest extraction from compiler output
//!
//! The compiler (`dataform compile --json`) writes a JSON graph with `tables`
//! and `assertions` arrays. Every enabled item's target becomes a leaf in the
//! [`ResourceManifest`].

use crate::error::{CoreError, CoreResult};
use crate::resource_tree::ResourceManifest;
use serde::Deserialize;
use std::path::Path;

/// The part of the compiled graph that declares warehouse resources.
///
/// Any other key in the compiler output (operations, declarations,
/// project config) is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CompiledGraph {
    /// Materialized tables, views and incremental tables
    pub tables: Vec<ManifestItem>,

    /// Assertions (data quality checks materialized as views)
    pub assertions: Vec<ManifestItem>,
}

/// One declared resource
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestItem {
    /// Warehouse location of the resource
    pub target: ManifestTarget,

    /// Declared but not materialized. `null` is treated as `false`.
    #[serde(default, deserialize_with = "deserialize_disabled")]
    pub disabled: bool,
}

/// Warehouse location of a declared resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestTarget {
    /// Cloud project (namespace)
    pub database: String,

    /// Dataset (container)
    pub schema: String,

    /// Table name (leaf)
    pub name: String,
}

fn deserialize_disabled<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl CompiledGraph {
    /// Parse compiler output from a JSON string.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Load and parse compiler output from a file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::ManifestRead {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_json(&content).map_err(|e| CoreError::ManifestParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// All items, tables first then assertions
    pub fn items(&self) -> impl Iterator<Item = &ManifestItem> {
        self.tables.iter().chain(self.assertions.iter())
    }

    /// Build the declared-resource tree, skipping disabled items.
    pub fn declared_resources(&self) -> ResourceManifest {
        let mut manifest = ResourceManifest::new();
        for item in self.items().filter(|item| !item.disabled) {
            let target = &item.target;
            manifest.insert(&target.database, &target.schema, &target.name);
        }
        manifest
    }
}

/// Read a manifest file and return the declared resources.
pub fn extract(path: &Path) -> CoreResult<ResourceManifest> {
    let graph = CompiledGraph::load(path)?;
    let manifest = graph.declared_resources();
    log::debug!(
        "Manifest {}: {} item(s), {} declared resource(s) across {} namespace(s)",
        path.display(),
        graph.tables.len() + graph.assertions.len(),
        manifest.len(),
        manifest.namespace_count()
    );
    Ok(manifest)
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
