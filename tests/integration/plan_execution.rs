//! Multi-step plan execution against a live collaborator registry.

use serde_json::json;

use conductor::executor::{plans, ErrorPolicy, ExecutionPlan, SequentialExecutor, Step, StepStatus};

use crate::fixtures::OrchestratorHarness;

#[tokio::test]
async fn test_register_collaborator_plan_end_to_end() {
    let h = OrchestratorHarness::new();
    // The verification reads the config back and expects the name in it
    h.sim
        .set_response("read-file", json!({ "collaborators": ["web-search"] }));

    let plan = plans::register_collaborator(
        "web-search",
        json!({ "endpoint": "sim://web-search" }),
        "collaborators.json",
    );

    let mut executor = SequentialExecutor::new();
    let report = executor.execute_plan(&plan, h.registry.as_ref()).await;

    assert!(report.success, "errors: {:?}", report.errors);
    assert!(!report.aborted);
    assert_eq!(report.results.len(), 4);

    // Every step is in the execution log, in order
    let ids: Vec<&str> = executor
        .execution_log()
        .iter()
        .map(|r| r.step_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["read-config", "merge-config", "write-config", "verify-registration"]
    );
}

#[tokio::test]
async fn test_transient_write_failure_is_retried_within_budget() {
    let h = OrchestratorHarness::new();
    h.sim
        .set_response("read-file", json!({ "collaborators": ["web-search"] }));
    h.sim.set_failures("write-file", 2); // budget is 3 attempts

    let plan = plans::register_collaborator("web-search", json!({}), "collaborators.json");
    let mut executor = SequentialExecutor::new();
    let report = executor.execute_plan(&plan, h.registry.as_ref()).await;

    assert!(report.success);
    let write_calls = h
        .sim
        .calls()
        .iter()
        .filter(|c| c.action == "write-file")
        .count();
    assert_eq!(write_calls, 3);
}

#[tokio::test]
async fn test_abort_stops_plan_without_automatic_rollback() {
    let h = OrchestratorHarness::new();
    h.sim.set_failures("merge-config", 1);

    let plan = ExecutionPlan::new("p", "abort demo")
        .step(Step::new("s1", "read", "read-file", json!({})))
        .step(Step::new("s2", "merge", "merge-config", json!({})).on_error(ErrorPolicy::Abort))
        .step(Step::new("s3", "write", "write-file", json!({})))
        .rollback_step(Step::new("rb1", "undo", "remove-config", json!({})));

    let mut executor = SequentialExecutor::new();
    let report = executor.execute_plan(&plan, h.registry.as_ref()).await;

    assert!(!report.success);
    assert!(report.aborted);
    assert_eq!(report.results.len(), 1);

    // s3 never ran and rollback was not triggered
    let actions: Vec<String> = h.sim.calls().iter().map(|c| c.action.clone()).collect();
    assert!(!actions.contains(&"write-file".to_string()));
    assert!(!actions.contains(&"remove-config".to_string()));

    // Rollback runs only on explicit request
    let rollback_report = executor.run_rollback(&plan, h.registry.as_ref()).await;
    assert!(rollback_report.success);
    assert!(h
        .sim
        .calls()
        .iter()
        .any(|c| c.action == "remove-config"));
}

#[tokio::test]
async fn test_continue_policy_skips_and_proceeds() {
    let h = OrchestratorHarness::new();
    h.sim.set_failures("merge-config", 1);

    let plan = ExecutionPlan::new("p", "continue demo")
        .step(Step::new("s1", "read", "read-file", json!({})))
        .step(Step::new("s2", "merge", "merge-config", json!({})).on_error(ErrorPolicy::Continue))
        .step(Step::new("s3", "write", "write-file", json!({})));

    let mut executor = SequentialExecutor::new();
    let report = executor.execute_plan(&plan, h.registry.as_ref()).await;

    assert!(!report.success);
    assert!(!report.aborted);
    // s1 and s3 produced results; s2 was recorded as skipped
    assert_eq!(report.results.len(), 2);
    let skipped = executor
        .execution_log()
        .iter()
        .find(|r| r.step_id == "s2")
        .unwrap();
    assert_eq!(skipped.status, StepStatus::Skipped);
}
