//! dp-core - Core library for dfprune
//!
//! This crate provides the three-level resource tree shared by the manifest,
//! the warehouse inventory and the unmanaged set, plus manifest extraction,
//! exclusion rules, reconciliation and config file parsing.

pub mod config;
pub mod error;
pub mod exclusion;
pub mod manifest;
pub mod reconcile;
pub mod resource_tree;

pub use config::{CompileConfig, Config, ExcludeConfig, WarehouseConfig, WarehouseType};
pub use error::{CoreError, CoreResult};
pub use exclusion::{ExclusionMatcher, ExclusionRule};
pub use manifest::{extract, CompiledGraph, ManifestItem, ManifestTarget};
pub use reconcile::{reconcile, reconcile_with};
pub use resource_tree::{
    InventorySnapshot, ResourceManifest, ResourcePath, ResourceTree, UnmanagedSet,
};
