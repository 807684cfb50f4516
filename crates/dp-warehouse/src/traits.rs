//! Warehouse trait definition

use crate::error::WarehouseResult;
use async_trait::async_trait;

/// Warehouse abstraction over a namespace -> container -> resource hierarchy
///
/// For BigQuery these are projects, datasets and tables; for DuckDB catalogs,
/// schemas and tables/views. Calls are issued one at a time, so
/// implementations need not support concurrent use beyond `Send + Sync`.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// List container names in a namespace
    async fn list_containers(&self, namespace: &str) -> WarehouseResult<Vec<String>>;

    /// List resource names in a container
    async fn list_resources(
        &self,
        namespace: &str,
        container: &str,
    ) -> WarehouseResult<Vec<String>>;

    /// Delete one resource
    async fn delete_resource(
        &self,
        namespace: &str,
        container: &str,
        name: &str,
    ) -> WarehouseResult<()>;

    /// Delete a container. Implementations must refuse to delete a non-empty container.
    async fn delete_container(&self, namespace: &str, container: &str) -> WarehouseResult<()>;

    /// Whether the warehouse keeps `container` even when it is empty, such as
    /// DuckDB's default `main` schema. Emptied permanent containers are retained.
    fn is_permanent_container(&self, _namespace: &str, _container: &str) -> bool {
        false
    }

    /// Warehouse type identifier for logging
    fn warehouse_type(&self) -> &'static str;
}
