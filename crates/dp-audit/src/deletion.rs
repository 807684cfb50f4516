//! Interactive deletion of unmanaged resources
//!
//! Leaves are processed one at a time in unmanaged-set order. After the last
//! leaf of a container the container is re-listed live and deleted if nothing
//! is left in it. A failing step is recorded and the run moves on.

use crate::abort::{AbortSignal, Aborted};
use crate::console::{is_affirmative, Console, DeletionEvent};
use dp_core::{ResourcePath, UnmanagedSet};
use dp_warehouse::Warehouse;
use serde::Serialize;

/// What happened to one unmanaged resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResourceOutcome {
    Deleted,
    Skipped,
    Failed { error: String },
}

/// Outcome for one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceResult {
    pub path: ResourcePath,
    #[serde(flatten)]
    pub outcome: ResourceOutcome,
}

/// What happened to a container once its unmanaged resources were processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContainerOutcome {
    /// The container was empty and has been deleted
    Deleted,
    /// Resources remain, the container was kept
    Retained { remaining: usize },
    /// The container was empty but deleting it failed
    DeleteFailed { error: String },
    /// The container could not be re-listed
    CheckFailed { error: String },
}

impl ContainerOutcome {
    fn is_failure(&self) -> bool {
        matches!(
            self,
            ContainerOutcome::DeleteFailed { .. } | ContainerOutcome::CheckFailed { .. }
        )
    }
}

/// Outcome for one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerResult {
    pub namespace: String,
    pub container: String,
    #[serde(flatten)]
    pub outcome: ContainerOutcome,
}

/// Everything a deletion run did, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub resources: Vec<ResourceResult>,
    pub containers: Vec<ContainerResult>,
    /// Where the run stopped if it was interrupted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted_at: Option<String>,
}

impl DeletionReport {
    pub fn deleted_count(&self) -> usize {
        self.count(|o| matches!(o, ResourceOutcome::Deleted))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, ResourceOutcome::Skipped))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, ResourceOutcome::Failed { .. }))
    }

    /// Number of containers that failed the emptiness check or deletion
    pub fn container_failure_count(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| c.outcome.is_failure())
            .count()
    }

    /// Whether any resource or container step failed
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0 || self.container_failure_count() > 0
    }

    pub fn was_aborted(&self) -> bool {
        self.aborted_at.is_some()
    }

    /// Outcome recorded for `path`, if it was processed
    pub fn outcome_for(&self, path: &ResourcePath) -> Option<&ResourceOutcome> {
        self.resources
            .iter()
            .find(|r| &r.path == path)
            .map(|r| &r.outcome)
    }

    /// Outcome recorded for a container, if it was reached
    pub fn container_outcome(&self, namespace: &str, container: &str) -> Option<&ContainerOutcome> {
        self.containers
            .iter()
            .find(|c| c.namespace == namespace && c.container == container)
            .map(|c| &c.outcome)
    }

    fn count(&self, pred: impl Fn(&ResourceOutcome) -> bool) -> usize {
        self.resources.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Deletes unmanaged resources, asking the operator for each one unless
/// auto-approve is on.
pub struct DeletionWorkflow<'a> {
    warehouse: &'a dyn Warehouse,
    console: &'a mut dyn Console,
    abort: &'a AbortSignal,
    auto_approve: bool,
}

impl<'a> DeletionWorkflow<'a> {
    pub fn new(
        warehouse: &'a dyn Warehouse,
        console: &'a mut dyn Console,
        abort: &'a AbortSignal,
    ) -> Self {
        Self {
            warehouse,
            console,
            abort,
            auto_approve: false,
        }
    }

    /// Delete without prompting
    pub fn auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }

    /// Process every unmanaged resource. Never fails: each step's result
    /// lands in the report.
    pub async fn run(mut self, unmanaged: &UnmanagedSet) -> DeletionReport {
        let mut report = DeletionReport::default();

        for (namespace, container, leaves) in unmanaged.iter_containers() {
            for name in leaves {
                let path = ResourcePath::new(namespace, container, name);
                match self.process_resource(&path).await {
                    Ok(outcome) => report.resources.push(ResourceResult { path, outcome }),
                    Err(Aborted) => {
                        self.stop(&mut report, path.to_string());
                        return report;
                    }
                }
            }

            match self.cleanup_container(namespace, container).await {
                Ok(outcome) => report.containers.push(ContainerResult {
                    namespace: namespace.to_string(),
                    container: container.to_string(),
                    outcome,
                }),
                Err(Aborted) => {
                    self.stop(&mut report, format!("{}.{}", namespace, container));
                    return report;
                }
            }
        }

        log::debug!(
            "Deletion finished: {} deleted, {} skipped, {} failed",
            report.deleted_count(),
            report.skipped_count(),
            report.failed_count()
        );
        report
    }

    fn stop(&mut self, report: &mut DeletionReport, at: String) {
        log::warn!("Deletion interrupted at {}", at);
        self.console.notify(&DeletionEvent::Aborted { at: at.clone() });
        report.aborted_at = Some(at);
    }

    async fn process_resource(&mut self, path: &ResourcePath) -> Result<ResourceOutcome, Aborted> {
        if self.abort.is_aborted() {
            return Err(Aborted);
        }

        if !self.auto_approve && !self.confirm(path).await? {
            self.console.notify(&DeletionEvent::Skipped(path.clone()));
            return Ok(ResourceOutcome::Skipped);
        }

        self.console.notify(&DeletionEvent::Deleting(path.clone()));
        let deleted = self
            .abort
            .guard(
                self.warehouse
                    .delete_resource(&path.namespace, &path.container, &path.name),
            )
            .await?;

        match deleted {
            Ok(()) => {
                self.console.notify(&DeletionEvent::Deleted(path.clone()));
                Ok(ResourceOutcome::Deleted)
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", path, e);
                let error = e.to_string();
                self.console.notify(&DeletionEvent::DeleteFailed {
                    path: path.clone(),
                    error: error.clone(),
                });
                Ok(ResourceOutcome::Failed { error })
            }
        }
    }

    async fn confirm(&mut self, path: &ResourcePath) -> Result<bool, Aborted> {
        let prompt = format!("Are you sure you want to delete table {}? (yes/no): ", path);
        let answer = self.abort.guard(self.console.ask(&prompt)).await?;
        Ok(match answer {
            Ok(Some(answer)) => is_affirmative(&answer),
            Ok(None) => {
                log::debug!("End of input while confirming {}, treating as no", path);
                false
            }
            Err(e) => {
                log::warn!("Could not read confirmation for {}: {}", path, e);
                false
            }
        })
    }

    async fn cleanup_container(
        &mut self,
        namespace: &str,
        container: &str,
    ) -> Result<ContainerOutcome, Aborted> {
        let listed = self
            .abort
            .guard(self.warehouse.list_resources(namespace, container))
            .await?;

        let remaining = match listed {
            Ok(remaining) => remaining,
            Err(e) => {
                log::warn!("Failed to re-list {}.{}: {}", namespace, container, e);
                let error = e.to_string();
                self.console.notify(&DeletionEvent::ContainerCheckFailed {
                    namespace: namespace.to_string(),
                    container: container.to_string(),
                    error: error.clone(),
                });
                return Ok(ContainerOutcome::CheckFailed { error });
            }
        };

        if !remaining.is_empty() {
            log::debug!(
                "Keeping {}.{}: {} table(s) remain",
                namespace,
                container,
                remaining.len()
            );
            return Ok(ContainerOutcome::Retained {
                remaining: remaining.len(),
            });
        }

        if self.warehouse.is_permanent_container(namespace, container) {
            log::debug!("Keeping {}.{}: permanent container", namespace, container);
            return Ok(ContainerOutcome::Retained { remaining: 0 });
        }

        self.console.notify(&DeletionEvent::ContainerEmpty {
            namespace: namespace.to_string(),
            container: container.to_string(),
        });
        let deleted = self
            .abort
            .guard(self.warehouse.delete_container(namespace, container))
            .await?;

        match deleted {
            Ok(()) => {
                self.console.notify(&DeletionEvent::ContainerDeleted {
                    namespace: namespace.to_string(),
                    container: container.to_string(),
                });
                Ok(ContainerOutcome::Deleted)
            }
            Err(e) => {
                log::warn!("Failed to delete {}.{}: {}", namespace, container, e);
                let error = e.to_string();
                self.console.notify(&DeletionEvent::ContainerDeleteFailed {
                    namespace: namespace.to_string(),
                    container: container.to_string(),
                    error: error.clone(),
                });
                Ok(ContainerOutcome::DeleteFailed { error })
            }
        }
    }
}

#[cfg(test)]
#[path = "deletion_test.rs"]
mod tests;
