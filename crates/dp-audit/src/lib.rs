//! dp-audit - Audit pipeline for dfprune
//!
//! Collects the live inventory for the namespaces a manifest declares,
//! reconciles it into the unmanaged set, and drives the optional deletion
//! workflow over that set.

pub mod abort;
pub mod audit;
pub mod collector;
pub mod console;
pub mod deletion;
pub mod error;

pub use abort::{AbortHandle, AbortSignal, Aborted};
pub use audit::{audit, AuditReport};
pub use collector::collect;
pub use console::{Console, DeletionEvent};
pub use deletion::{
    ContainerOutcome, ContainerResult, DeletionReport, DeletionWorkflow, ResourceOutcome,
    ResourceResult,
};
pub use error::{AuditError, AuditResult};
