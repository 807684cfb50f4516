//! Reconciliation of warehouse inventory against the declared manifest

use crate::error::CoreResult;
use crate::exclusion::{ExclusionMatcher, ExclusionRule};
use crate::resource_tree::{InventorySnapshot, ResourceManifest, UnmanagedSet};

/// Compute the unmanaged set, compiling `exclusion` first.
///
/// Fails only when an exclusion pattern is invalid.
pub fn reconcile(
    manifest: &ResourceManifest,
    inventory: &InventorySnapshot,
    exclusion: &ExclusionRule,
) -> CoreResult<UnmanagedSet> {
    let matcher = exclusion.compile()?;
    Ok(reconcile_with(manifest, inventory, &matcher))
}

/// Compute the unmanaged set with an already-compiled exclusion matcher.
///
/// Only namespaces that are keys of `manifest` are visited. Within them every
/// inventory leaf that is not excluded and not declared at the same
/// `namespace.container` path is emitted, in inventory order.
pub fn reconcile_with(
    manifest: &ResourceManifest,
    inventory: &InventorySnapshot,
    exclusion: &ExclusionMatcher,
) -> UnmanagedSet {
    let mut unmanaged = UnmanagedSet::new();

    for namespace in manifest.namespaces() {
        let Some(containers) = inventory.containers(namespace) else {
            continue;
        };

        for (container, leaves) in containers {
            for name in leaves {
                if exclusion.is_excluded(name) {
                    continue;
                }
                if manifest.contains(namespace, container, name) {
                    continue;
                }
                unmanaged.insert(namespace, container, name);
            }
        }
    }

    unmanaged
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
