//! Warehouse inventory collection

use crate::abort::AbortSignal;
use crate::error::{AuditError, AuditResult};
use dp_core::InventorySnapshot;
use dp_warehouse::Warehouse;

/// List every resource under each namespace, one call at a time.
///
/// Containers without resources are left out of the snapshot. Any listing
/// failure aborts the whole collection: a partial inventory would hide
/// unmanaged resources in the namespace that could not be read.
pub async fn collect<I, S>(
    warehouse: &dyn Warehouse,
    namespaces: I,
    abort: &AbortSignal,
) -> AuditResult<InventorySnapshot>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut inventory = InventorySnapshot::new();

    for namespace in namespaces {
        let namespace = namespace.as_ref();

        let containers = abort
            .guard(warehouse.list_containers(namespace))
            .await
            .map_err(|_| AuditError::Interrupted {
                at: format!("listing datasets in {}", namespace),
            })?
            .map_err(|source| AuditError::WarehouseAccess {
                scope: format!("project {}", namespace),
                source,
            })?;

        for container in &containers {
            let resources = abort
                .guard(warehouse.list_resources(namespace, container))
                .await
                .map_err(|_| AuditError::Interrupted {
                    at: format!("listing tables in {}.{}", namespace, container),
                })?
                .map_err(|source| AuditError::WarehouseAccess {
                    scope: format!("dataset {}.{}", namespace, container),
                    source,
                })?;

            for name in &resources {
                inventory.insert(namespace, container, name);
            }
        }

        log::debug!(
            "Collected {} from {}: {} dataset(s), {} table(s)",
            warehouse.warehouse_type(),
            namespace,
            containers.len(),
            inventory
                .containers(namespace)
                .map(|c| c.values().map(|leaves| leaves.len()).sum::<usize>())
                .unwrap_or(0)
        );
    }

    Ok(inventory)
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
