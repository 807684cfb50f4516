//! DuckDB warehouse backend
//!
//! Namespaces are DuckDB catalogs (the opened database plus anything
//! attached), containers are schemas and resources are tables or views.

use crate::error::{WarehouseError, WarehouseResult};
use crate::traits::Warehouse;
use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Schemas DuckDB creates for its own catalog views
const SYSTEM_SCHEMAS: [&str; 2] = ["information_schema", "pg_catalog"];

/// Default schema of every catalog; DuckDB refuses to drop it
const DEFAULT_SCHEMA: &str = "main";

/// DuckDB warehouse backend
pub struct DuckDbWarehouse {
    conn: Mutex<Connection>,
}

impl DuckDbWarehouse {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> WarehouseResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| WarehouseError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> WarehouseResult<Self> {
        let conn =
            Connection::open(path).map_err(|e| WarehouseError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> WarehouseResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Attach another database file as catalog `alias`
    pub fn attach(&self, alias: &str, path: &str) -> WarehouseResult<()> {
        let sql = format!(
            "ATTACH '{}' AS {}",
            path.replace('\'', "''"),
            quote_ident(alias)
        );
        self.execute_batch(&sql)
    }

    /// Execute one or more SQL statements
    pub fn execute_batch(&self, sql: &str) -> WarehouseResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| WarehouseError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn lock(&self) -> WarehouseResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| WarehouseError::MutexPoisoned(e.to_string()))
    }

    fn schema_exists(
        conn: &Connection,
        catalog: &str,
        schema: Option<&str>,
    ) -> WarehouseResult<bool> {
        let count: i64 = match schema {
            Some(schema) => conn.query_row(
                "SELECT COUNT(*) FROM information_schema.schemata \
                 WHERE catalog_name = ? AND schema_name = ?",
                [catalog, schema],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM information_schema.schemata WHERE catalog_name = ?",
                [catalog],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }

    fn list_containers_sync(&self, namespace: &str) -> WarehouseResult<Vec<String>> {
        let conn = self.lock()?;
        if !Self::schema_exists(&conn, namespace, None)? {
            return Err(WarehouseError::NotFound(format!("catalog '{}'", namespace)));
        }

        let mut stmt = conn.prepare(
            "SELECT schema_name FROM information_schema.schemata \
             WHERE catalog_name = ? ORDER BY schema_name",
        )?;
        let schemas = stmt
            .query_map([namespace], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(schemas
            .into_iter()
            .filter(|schema| !SYSTEM_SCHEMAS.contains(&schema.as_str()))
            .collect())
    }

    fn list_resources_sync(
        &self,
        namespace: &str,
        container: &str,
    ) -> WarehouseResult<Vec<String>> {
        let conn = self.lock()?;
        if !Self::schema_exists(&conn, namespace, Some(container))? {
            return Err(WarehouseError::NotFound(format!(
                "schema '{}.{}'",
                namespace, container
            )));
        }

        let mut stmt = conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_catalog = ? AND table_schema = ? ORDER BY table_name",
        )?;
        let tables = stmt
            .query_map([namespace, container], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    fn delete_resource_sync(
        &self,
        namespace: &str,
        container: &str,
        name: &str,
    ) -> WarehouseResult<()> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT table_type FROM information_schema.tables \
             WHERE table_catalog = ? AND table_schema = ? AND table_name = ?",
        )?;
        let table_type = stmt
            .query_map([namespace, container, name], |row| row.get::<_, String>(0))?
            .next()
            .transpose()?
            .ok_or_else(|| {
                WarehouseError::NotFound(format!("table '{}.{}.{}'", namespace, container, name))
            })?;

        let kind = if table_type == "VIEW" { "VIEW" } else { "TABLE" };
        let sql = format!(
            "DROP {} {}.{}.{}",
            kind,
            quote_ident(namespace),
            quote_ident(container),
            quote_ident(name)
        );
        log::debug!("duckdb: {}", sql);
        conn.execute_batch(&sql)?;
        Ok(())
    }

    fn delete_container_sync(&self, namespace: &str, container: &str) -> WarehouseResult<()> {
        let conn = self.lock()?;
        // Without CASCADE, DuckDB refuses to drop a schema that still has entries.
        let sql = format!(
            "DROP SCHEMA {}.{}",
            quote_ident(namespace),
            quote_ident(container)
        );
        log::debug!("duckdb: {}", sql);
        conn.execute_batch(&sql)?;
        Ok(())
    }
}

/// Double-quote an identifier, escaping embedded quotes
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[async_trait]
impl Warehouse for DuckDbWarehouse {
    async fn list_containers(&self, namespace: &str) -> WarehouseResult<Vec<String>> {
        self.list_containers_sync(namespace)
    }

    async fn list_resources(
        &self,
        namespace: &str,
        container: &str,
    ) -> WarehouseResult<Vec<String>> {
        self.list_resources_sync(namespace, container)
    }

    async fn delete_resource(
        &self,
        namespace: &str,
        container: &str,
        name: &str,
    ) -> WarehouseResult<()> {
        self.delete_resource_sync(namespace, container, name)
    }

    async fn delete_container(&self, namespace: &str, container: &str) -> WarehouseResult<()> {
        self.delete_container_sync(namespace, container)
    }

    fn is_permanent_container(&self, _namespace: &str, container: &str) -> bool {
        container == DEFAULT_SCHEMA
    }

    fn warehouse_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
