//! dp-warehouse - Warehouse abstraction layer for dfprune
//!
//! This crate provides the `Warehouse` trait and implementations for
//! BigQuery (REST API) and DuckDB (catalogs, schemas and tables).

pub mod bigquery;
pub mod duckdb;
pub mod error;
#[cfg(feature = "test-support")]
pub mod memory;
pub mod traits;

pub use bigquery::BigQueryWarehouse;
pub use duckdb::DuckDbWarehouse;
pub use error::{WarehouseError, WarehouseResult};
#[cfg(feature = "test-support")]
pub use memory::MemoryWarehouse;
pub use traits::Warehouse;
