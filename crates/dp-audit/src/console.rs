//! Operator interaction for the deletion workflow

use async_trait::async_trait;
use dp_core::ResourcePath;
use std::fmt;

/// Operator console: answers confirmation prompts and receives progress events.
///
/// The CLI implements this over stdin/stdout; tests script the answers.
#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and read one line of input. `None` means end of input.
    async fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>>;

    /// Report a deletion workflow step
    fn notify(&mut self, event: &DeletionEvent);
}

/// Whether an operator answer approves a deletion.
///
/// Only `yes`, in any letter case, approves. The line terminator is ignored;
/// any other text, including surrounding spaces, is a denial.
pub fn is_affirmative(answer: &str) -> bool {
    answer
        .trim_end_matches(['\r', '\n'])
        .eq_ignore_ascii_case("yes")
}

/// A step of the deletion workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionEvent {
    /// Deletion of a table is starting
    Deleting(ResourcePath),
    /// A table was deleted
    Deleted(ResourcePath),
    /// The operator declined a deletion
    Skipped(ResourcePath),
    /// Deleting a table failed
    DeleteFailed { path: ResourcePath, error: String },
    /// A dataset has no tables left and is about to be deleted
    ContainerEmpty { namespace: String, container: String },
    /// A dataset was deleted
    ContainerDeleted { namespace: String, container: String },
    /// Deleting a dataset failed
    ContainerDeleteFailed {
        namespace: String,
        container: String,
        error: String,
    },
    /// Re-listing a dataset after its deletions failed
    ContainerCheckFailed {
        namespace: String,
        container: String,
        error: String,
    },
    /// The run was interrupted
    Aborted { at: String },
}

impl DeletionEvent {
    /// Whether this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DeletionEvent::DeleteFailed { .. }
                | DeletionEvent::ContainerDeleteFailed { .. }
                | DeletionEvent::ContainerCheckFailed { .. }
                | DeletionEvent::Aborted { .. }
        )
    }
}

impl fmt::Display for DeletionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionEvent::Deleting(path) => write!(f, "Deleting table {}...", path),
            DeletionEvent::Deleted(path) => write!(f, "Table {} deleted.", path),
            DeletionEvent::Skipped(path) => write!(f, "Skipping deletion of table {}", path),
            DeletionEvent::DeleteFailed { path, error } => {
                write!(f, "Failed to delete table {}: {}", path, error)
            }
            DeletionEvent::ContainerEmpty {
                namespace,
                container,
            } => write!(
                f,
                "Dataset {}.{} is empty. Deleting dataset...",
                namespace, container
            ),
            DeletionEvent::ContainerDeleted {
                namespace,
                container,
            } => write!(f, "Dataset {}.{} deleted.", namespace, container),
            DeletionEvent::ContainerDeleteFailed {
                namespace,
                container,
                error,
            } => write!(
                f,
                "Failed to delete dataset {}.{}: {}",
                namespace, container, error
            ),
            DeletionEvent::ContainerCheckFailed {
                namespace,
                container,
                error,
            } => write!(
                f,
                "Could not check whether dataset {}.{} is empty: {}",
                namespace, container, error
            ),
            DeletionEvent::Aborted { at } => {
                write!(f, "Interrupted at {}; completed deletions are kept.", at)
            }
        }
    }
}
