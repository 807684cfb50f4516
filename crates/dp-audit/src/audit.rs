//! Manifest -> inventory -> unmanaged set pipeline

use crate::abort::AbortSignal;
use crate::collector::collect;
use crate::error::AuditResult;
use dp_core::{
    extract, reconcile_with, ExclusionRule, InventorySnapshot, ResourceManifest, UnmanagedSet,
};
use dp_warehouse::Warehouse;
use std::path::Path;

/// Result of one audit run
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Declared resources
    pub manifest: ResourceManifest,
    /// Live resources under the manifest's namespaces
    pub inventory: InventorySnapshot,
    /// Live resources that are neither declared nor excluded
    pub unmanaged: UnmanagedSet,
}

impl AuditReport {
    /// Number of declared resources
    pub fn declared_count(&self) -> usize {
        self.manifest.len()
    }

    /// Number of live resources inspected
    pub fn inventory_count(&self) -> usize {
        self.inventory.len()
    }

    /// Number of unmanaged resources
    pub fn unmanaged_count(&self) -> usize {
        self.unmanaged.len()
    }
}

/// Run the audit.
///
/// The manifest is read and the exclusion patterns are compiled before the
/// warehouse is contacted, so input errors never cost a warehouse call.
pub async fn audit(
    manifest_path: &Path,
    warehouse: &dyn Warehouse,
    exclusion: &ExclusionRule,
    abort: &AbortSignal,
) -> AuditResult<AuditReport> {
    let manifest = extract(manifest_path)?;
    let matcher = exclusion.compile()?;

    let namespaces: Vec<&str> = manifest.namespaces().collect();
    log::debug!(
        "Auditing {} project(s) on {}: {}",
        namespaces.len(),
        warehouse.warehouse_type(),
        namespaces.join(", ")
    );
    let inventory = collect(warehouse, namespaces, abort).await?;

    let unmanaged = reconcile_with(&manifest, &inventory, &matcher);
    log::debug!(
        "{} declared, {} live, {} unmanaged",
        manifest.len(),
        inventory.len(),
        unmanaged.len()
    );

    Ok(AuditReport {
        manifest,
        inventory,
        unmanaged,
    })
}

#[cfg(test)]
#[path = "audit_test.rs"]
mod tests;
