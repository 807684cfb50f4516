use super::*;
use dp_audit::{ContainerOutcome, ContainerResult, ResourceOutcome, ResourceResult};
use dp_core::ResourcePath;

fn resource(name: &str, outcome: ResourceOutcome) -> ResourceResult {
    ResourceResult {
        path: ResourcePath::new("proj1", "ds1", name),
        outcome,
    }
}

fn exit_code(result: Result<()>) -> Option<i32> {
    result
        .err()
        .and_then(|e| e.downcast_ref::<ExitCode>().map(|ec| ec.0))
}

#[test]
fn test_summary_line() {
    let report = DeletionReport {
        resources: vec![
            resource("t1", ResourceOutcome::Deleted),
            resource("t2", ResourceOutcome::Skipped),
            resource(
                "t3",
                ResourceOutcome::Failed {
                    error: "denied".to_string(),
                },
            ),
        ],
        ..DeletionReport::default()
    };

    assert_eq!(
        summary_line(&report),
        "Deleted 1 table(s), skipped 1, failed 1"
    );
}

#[test]
fn test_clean_run_succeeds() {
    let report = DeletionReport {
        resources: vec![resource("t1", ResourceOutcome::Deleted)],
        ..DeletionReport::default()
    };
    assert!(finish(&report, Path::new("out.json")).is_ok());
}

#[test]
fn test_failures_exit_with_two() {
    let report = DeletionReport {
        containers: vec![ContainerResult {
            namespace: "proj1".to_string(),
            container: "ds1".to_string(),
            outcome: ContainerOutcome::DeleteFailed {
                error: "not empty".to_string(),
            },
        }],
        ..DeletionReport::default()
    };
    assert_eq!(
        exit_code(finish(&report, Path::new("out.json"))),
        Some(EXIT_DELETION_FAILED)
    );
}

#[test]
fn test_abort_wins_over_failures() {
    let report = DeletionReport {
        resources: vec![resource(
            "t1",
            ResourceOutcome::Failed {
                error: "boom".to_string(),
            },
        )],
        aborted_at: Some("proj1.ds1.t2".to_string()),
        ..DeletionReport::default()
    };
    assert_eq!(
        exit_code(finish(&report, Path::new("out.json"))),
        Some(EXIT_INTERRUPTED)
    );
}
