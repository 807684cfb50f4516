//! Error types for dp-audit

use dp_core::CoreError;
use dp_warehouse::WarehouseError;
use thiserror::Error;

/// Fatal audit errors
///
/// Per-resource deletion failures are not errors at this level; they are
/// recorded in the [`DeletionReport`](crate::DeletionReport).
#[derive(Error, Debug)]
pub enum AuditError {
    /// A warehouse listing failed, so the inventory would be incomplete (A001)
    #[error("[A001] Warehouse access failed for {scope}: {source}")]
    WarehouseAccess {
        scope: String,
        #[source]
        source: WarehouseError,
    },

    /// The run was interrupted before it completed (A002)
    #[error("[A002] Interrupted while processing {at}")]
    Interrupted { at: String },

    /// Manifest, exclusion or config error
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for AuditError
pub type AuditResult<T> = Result<T, AuditError>;
