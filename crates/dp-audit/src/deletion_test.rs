use super::*;
use crate::abort::AbortHandle;
use async_trait::async_trait;
use dp_warehouse::memory::Call;
use dp_warehouse::MemoryWarehouse;
use std::collections::VecDeque;
use std::io;

/// Console that replays canned answers and records what it was shown
#[derive(Default)]
struct ScriptedConsole {
    answers: VecDeque<io::Result<Option<String>>>,
    prompts: Vec<String>,
    events: Vec<DeletionEvent>,
    abort_on_deleted: Option<AbortHandle>,
}

impl ScriptedConsole {
    fn answering(answers: &[&str]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|a| Ok(Some(format!("{}\n", a))))
                .collect(),
            ..Self::default()
        }
    }

    fn lines(&self) -> Vec<String> {
        self.events.iter().map(|e| e.to_string()).collect()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(Ok(None))
    }

    fn notify(&mut self, event: &DeletionEvent) {
        if let (DeletionEvent::Deleted(_), Some(handle)) = (event, &self.abort_on_deleted) {
            handle.abort();
        }
        self.events.push(event.clone());
    }
}

fn unmanaged(paths: &[(&str, &str, &str)]) -> UnmanagedSet {
    paths.iter().copied().collect()
}

#[tokio::test]
async fn test_confirmed_and_declined_deletions() {
    let wh = MemoryWarehouse::new().with_resources("proj1", "ds1", &["t1", "t2"]);
    let set = unmanaged(&[("proj1", "ds1", "t1"), ("proj1", "ds1", "t2")]);
    let mut console = ScriptedConsole::answering(&["yes", "no"]);
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .run(&set)
        .await;

    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(
        report.outcome_for(&ResourcePath::new("proj1", "ds1", "t2")),
        Some(&ResourceOutcome::Skipped)
    );
    assert_eq!(
        report.container_outcome("proj1", "ds1"),
        Some(&ContainerOutcome::Retained { remaining: 1 })
    );
    assert_eq!(wh.resources("proj1", "ds1"), Some(vec!["t2".to_string()]));
    assert_eq!(
        console.prompts,
        vec![
            "Are you sure you want to delete table proj1.ds1.t1? (yes/no): ",
            "Are you sure you want to delete table proj1.ds1.t2? (yes/no): ",
        ]
    );
    assert_eq!(
        console.lines(),
        vec![
            "Deleting table proj1.ds1.t1...",
            "Table proj1.ds1.t1 deleted.",
            "Skipping deletion of table proj1.ds1.t2",
        ]
    );
    assert!(!report.has_failures());
}

#[tokio::test]
async fn test_auto_approve_deletes_emptied_container() {
    let wh = MemoryWarehouse::new()
        .with_resources("proj1", "ds1", &["t1", "t2"])
        .with_resources("proj1", "ds2", &["keep"]);
    let set = unmanaged(&[("proj1", "ds1", "t1"), ("proj1", "ds1", "t2")]);
    let mut console = ScriptedConsole::default();
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .auto_approve(true)
        .run(&set)
        .await;

    assert!(console.prompts.is_empty());
    assert_eq!(report.deleted_count(), 2);
    assert_eq!(
        report.container_outcome("proj1", "ds1"),
        Some(&ContainerOutcome::Deleted)
    );
    assert!(!wh.has_container("proj1", "ds1"));
    assert!(wh.has_container("proj1", "ds2"));
    assert_eq!(
        wh.calls(),
        vec![
            Call::DeleteResource("proj1".into(), "ds1".into(), "t1".into()),
            Call::DeleteResource("proj1".into(), "ds1".into(), "t2".into()),
            Call::ListResources("proj1".into(), "ds1".into()),
            Call::DeleteContainer("proj1".into(), "ds1".into()),
        ]
    );
    assert_eq!(
        console.lines()[4..],
        [
            "Dataset proj1.ds1 is empty. Deleting dataset...".to_string(),
            "Dataset proj1.ds1 deleted.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_answers_are_case_insensitive() {
    let wh = MemoryWarehouse::new().with_resources("proj1", "ds1", &["t1", "t2", "t3"]);
    let set = unmanaged(&[
        ("proj1", "ds1", "t1"),
        ("proj1", "ds1", "t2"),
        ("proj1", "ds1", "t3"),
    ]);
    let mut console = ScriptedConsole::answering(&["YES", "Yes", "y"]);
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .run(&set)
        .await;

    assert_eq!(report.deleted_count(), 2);
    assert_eq!(
        report.outcome_for(&ResourcePath::new("proj1", "ds1", "t3")),
        Some(&ResourceOutcome::Skipped)
    );
}

#[tokio::test]
async fn test_end_of_input_and_read_errors_deny() {
    let wh = MemoryWarehouse::new().with_resources("proj1", "ds1", &["t1", "t2"]);
    let set = unmanaged(&[("proj1", "ds1", "t1"), ("proj1", "ds1", "t2")]);
    let mut console = ScriptedConsole {
        answers: VecDeque::from(vec![Err(io::Error::other("closed")), Ok(None)]),
        ..ScriptedConsole::default()
    };
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .run(&set)
        .await;

    assert_eq!(report.skipped_count(), 2);
    assert_eq!(report.deleted_count(), 0);
    assert_eq!(
        wh.resources("proj1", "ds1"),
        Some(vec!["t1".to_string(), "t2".to_string()])
    );
}

#[tokio::test]
async fn test_out_of_scope_resource_keeps_container() {
    let wh = MemoryWarehouse::new().with_resources("proj1", "ds1", &["tableA", "t1"]);
    let set = unmanaged(&[("proj1", "ds1", "t1")]);
    let mut console = ScriptedConsole::default();
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .auto_approve(true)
        .run(&set)
        .await;

    assert_eq!(
        report.container_outcome("proj1", "ds1"),
        Some(&ContainerOutcome::Retained { remaining: 1 })
    );
    assert!(!wh
        .calls()
        .contains(&Call::DeleteContainer("proj1".into(), "ds1".into())));
}

#[tokio::test]
async fn test_delete_failure_does_not_stop_the_run() {
    let wh = MemoryWarehouse::new()
        .with_resources("proj1", "ds1", &["t1", "t2"])
        .fail_delete("proj1", "ds1", "t2");
    let set = unmanaged(&[("proj1", "ds1", "t1"), ("proj1", "ds1", "t2")]);
    let mut console = ScriptedConsole::default();
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .auto_approve(true)
        .run(&set)
        .await;

    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.deleted_count(), 1);
    assert!(report.has_failures());
    assert!(matches!(
        report.outcome_for(&ResourcePath::new("proj1", "ds1", "t2")),
        Some(ResourceOutcome::Failed { .. })
    ));
    assert_eq!(wh.resources("proj1", "ds1"), Some(vec!["t2".to_string()]));
    assert_eq!(
        report.container_outcome("proj1", "ds1"),
        Some(&ContainerOutcome::Retained { remaining: 1 })
    );
    assert!(console.events.iter().any(|e| e.is_failure()));
}

#[tokio::test]
async fn test_container_delete_failure_moves_on() {
    let wh = MemoryWarehouse::new()
        .with_resources("proj1", "ds1", &["t1"])
        .with_resources("proj1", "ds2", &["t2"])
        .fail_container_delete("proj1", "ds1");
    let set = unmanaged(&[("proj1", "ds1", "t1"), ("proj1", "ds2", "t2")]);
    let mut console = ScriptedConsole::default();
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .auto_approve(true)
        .run(&set)
        .await;

    assert!(matches!(
        report.container_outcome("proj1", "ds1"),
        Some(ContainerOutcome::DeleteFailed { .. })
    ));
    assert_eq!(
        report.container_outcome("proj1", "ds2"),
        Some(&ContainerOutcome::Deleted)
    );
    assert_eq!(report.container_failure_count(), 1);
    assert_eq!(report.failed_count(), 0);
    assert!(report.has_failures());
}

#[tokio::test]
async fn test_relist_failure_is_recorded() {
    let wh = MemoryWarehouse::new()
        .with_resources("proj1", "ds1", &["t1"])
        .fail_listing("proj1", "ds1");
    let set = unmanaged(&[("proj1", "ds1", "t1")]);
    let mut console = ScriptedConsole::default();
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .auto_approve(true)
        .run(&set)
        .await;

    assert_eq!(report.deleted_count(), 1);
    assert!(matches!(
        report.container_outcome("proj1", "ds1"),
        Some(ContainerOutcome::CheckFailed { .. })
    ));
    assert!(wh.has_container("proj1", "ds1"));
}

#[tokio::test]
async fn test_abort_stops_before_next_resource() {
    let wh = MemoryWarehouse::new().with_resources("proj1", "ds1", &["t1", "t2"]);
    let set = unmanaged(&[("proj1", "ds1", "t1"), ("proj1", "ds1", "t2")]);
    let (handle, abort) = AbortSignal::pair();
    let mut console = ScriptedConsole {
        abort_on_deleted: Some(handle),
        ..ScriptedConsole::default()
    };

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .auto_approve(true)
        .run(&set)
        .await;

    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.aborted_at.as_deref(), Some("proj1.ds1.t2"));
    assert!(report.was_aborted());
    assert!(report.containers.is_empty());
    assert_eq!(wh.resources("proj1", "ds1"), Some(vec!["t2".to_string()]));
    assert_eq!(
        console.events.last(),
        Some(&DeletionEvent::Aborted {
            at: "proj1.ds1.t2".to_string()
        })
    );
}

#[tokio::test]
async fn test_already_aborted_run_touches_nothing() {
    let wh = MemoryWarehouse::new().with_resources("proj1", "ds1", &["t1"]);
    let set = unmanaged(&[("proj1", "ds1", "t1")]);
    let (handle, abort) = AbortSignal::pair();
    handle.abort();
    let mut console = ScriptedConsole::answering(&["yes"]);

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .run(&set)
        .await;

    assert!(report.resources.is_empty());
    assert_eq!(report.aborted_at.as_deref(), Some("proj1.ds1.t1"));
    assert!(console.prompts.is_empty());
    assert!(wh.calls().is_empty());
}

#[tokio::test]
async fn test_empty_set_does_nothing() {
    let wh = MemoryWarehouse::new().with_resources("proj1", "ds1", &["t1"]);
    let mut console = ScriptedConsole::default();
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .run(&UnmanagedSet::new())
        .await;

    assert_eq!(report, DeletionReport::default());
    assert!(wh.calls().is_empty());
}

#[tokio::test]
async fn test_emptied_permanent_container_is_retained() {
    let wh = MemoryWarehouse::new()
        .with_permanent_container("proj1", "main")
        .with_resources("proj1", "main", &["orphan"]);
    let set = unmanaged(&[("proj1", "main", "orphan")]);
    let mut console = ScriptedConsole::default();
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .auto_approve(true)
        .run(&set)
        .await;

    assert_eq!(report.deleted_count(), 1);
    assert_eq!(
        report.container_outcome("proj1", "main"),
        Some(&ContainerOutcome::Retained { remaining: 0 })
    );
    assert!(!report.has_failures());
    assert!(wh.has_container("proj1", "main"));
    assert!(!wh
        .calls()
        .contains(&Call::DeleteContainer("proj1".into(), "main".into())));
}

#[tokio::test]
async fn test_duckdb_main_schema_survives_cleanup() {
    let wh = dp_warehouse::DuckDbWarehouse::in_memory().unwrap();
    wh.execute_batch("CREATE TABLE main.orphan (id INT);").unwrap();
    let set = unmanaged(&[("memory", "main", "orphan")]);
    let mut console = ScriptedConsole::default();
    let abort = AbortSignal::never();

    let report = DeletionWorkflow::new(&wh, &mut console, &abort)
        .auto_approve(true)
        .run(&set)
        .await;

    assert_eq!(report.deleted_count(), 1);
    assert_eq!(
        report.container_outcome("memory", "main"),
        Some(&ContainerOutcome::Retained { remaining: 0 })
    );
    assert!(!report.has_failures());
    assert!(wh.list_resources("memory", "main").await.unwrap().is_empty());
}
