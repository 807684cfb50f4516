//! Error types for dp-warehouse

use thiserror::Error;

/// Warehouse operation errors
#[derive(Error, Debug)]
pub enum WarehouseError {
    /// Connection or client setup error (W001)
    #[error("[W001] Warehouse connection failed: {0}")]
    ConnectionError(String),

    /// Caller is not authorized (W002)
    #[error("[W002] Access denied: {0}")]
    AccessDenied(String),

    /// Namespace, container or resource does not exist (W003)
    ///
    /// From DuckDB this is derived from the error message, so some missing-object
    /// errors may surface as `ExecutionError` instead.
    #[error("[W003] Not found: {0}")]
    NotFound(String),

    /// HTTP request failed or returned an unexpected status (W004)
    #[error("[W004] Warehouse request failed: {0}")]
    Request(String),

    /// SQL execution error (W005)
    #[error("[W005] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Mutex poisoned (W006)
    #[error("[W006] Warehouse mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Internal error (W007)
    #[error("[W007] Internal warehouse error: {0}")]
    Internal(String),
}

/// Result type alias for WarehouseError
pub type WarehouseResult<T> = Result<T, WarehouseError>;

impl From<duckdb::Error> for WarehouseError {
    fn from(err: duckdb::Error) -> Self {
        match err {
            duckdb::Error::QueryReturnedNoRows => WarehouseError::NotFound(err.to_string()),
            // DuckDB reports every catalog error with the same generic code, so a
            // missing object is only recognisable by its message. Best effort.
            duckdb::Error::DuckDBFailure(_, Some(ref message)) if is_missing_object(message) => {
                WarehouseError::NotFound(err.to_string())
            }
            other => WarehouseError::ExecutionError(other.to_string()),
        }
    }
}

fn is_missing_object(message: &str) -> bool {
    message.contains("does not exist")
        || (message.contains("Catalog Error") && message.contains("not found"))
}

impl From<reqwest::Error> for WarehouseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            WarehouseError::ConnectionError(err.to_string())
        } else {
            WarehouseError::Request(err.to_string())
        }
    }
}
