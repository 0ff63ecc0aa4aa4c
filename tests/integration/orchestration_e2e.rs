//! End-to-end orchestration tests: plan, approve, run to quiescence.

use conductor::approval::{ApprovalGate, PlanState};
use conductor::core::TaskStatus;
use conductor::error::Error;
use conductor::sync::{RemoteTaskService, SyncRequest, SyncResponse};

use crate::fixtures::{test_task, OrchestratorHarness};

#[tokio::test]
async fn test_happy_path_dependency_chain() {
    let h = OrchestratorHarness::new();
    let gate = h
        .plan_and_approve(vec![
            test_task("t1", "Search for rust news"),
            test_task("t2", "Generate an image of the results").depends_on(&["t1"]),
        ])
        .await;

    let outcome = h.run_loop().run(&gate).await.unwrap();

    assert_eq!(outcome.completed, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.stats.progress, 100);

    // Dependency order: the search ran before the image generation
    let calls = h.sim.calls();
    assert_eq!(calls[0].action, "web-search");
    assert_eq!(calls[1].action, "image-generation");

    // Both sides converged on completed
    let guard = h.store.read().await;
    assert!(guard
        .all_tasks()
        .iter()
        .all(|t| t.status == TaskStatus::Completed));
    match h.remote.call(SyncRequest::Stats).await.unwrap() {
        SyncResponse::Stats(stats) => assert_eq!(stats.completed, 2),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn test_unapproved_plan_never_executes() {
    let h = OrchestratorHarness::new();
    let mut gate = ApprovalGate::new();
    {
        let mut guard = h.store.write().await;
        gate.submit_plan(&mut guard, vec![test_task("t1", "Search for news")])
            .unwrap();
    }

    let err = h.run_loop().run(&gate).await.unwrap_err();
    assert!(matches!(err, Error::ExecutionNotApproved { .. }));
    assert!(h.sim.calls().is_empty());

    // Tasks sit pending until someone approves
    let guard = h.store.read().await;
    assert_eq!(guard.tasks_by_status(TaskStatus::Pending).len(), 1);
}

#[tokio::test]
async fn test_rejected_plan_is_cleared_and_replannable() {
    let h = OrchestratorHarness::new();
    let mut gate = ApprovalGate::new();
    {
        let mut guard = h.store.write().await;
        gate.submit_plan(&mut guard, vec![test_task("t1", "Search for news")])
            .unwrap();
        gate.reject(&mut guard).unwrap();
        assert!(guard.is_empty());
    }

    // Re-plan after rejection
    gate.transition(PlanState::Drafting).unwrap();
    {
        let mut guard = h.store.write().await;
        gate.submit_plan(&mut guard, vec![test_task("t2", "Summarize the report")])
            .unwrap();
    }
    gate.approve().unwrap();

    let outcome = h.run_loop().run(&gate).await.unwrap();
    assert_eq!(outcome.completed, 1);
    // No keyword rule matches "Summarize the report", so the fallback runs
    assert_eq!(h.sim.calls()[0].action, "generic-completion");
}

#[tokio::test]
async fn test_failure_blocks_dependents_but_not_siblings() {
    let h = OrchestratorHarness::new();
    let gate = h
        .plan_and_approve(vec![
            test_task("t1", "Search for rust news"),
            test_task("t2", "Generate an image of the results").depends_on(&["t1"]),
            test_task("t3", "Write a haiku"),
        ])
        .await;
    h.sim.set_failures("web-search", 1);

    let outcome = h.run_loop().run(&gate).await.unwrap();

    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.completed, 1);
    assert_eq!(outcome.blocked, 1);

    let guard = h.store.read().await;
    assert_eq!(guard.get(&"t1".into()).unwrap().status, TaskStatus::Failed);
    assert_eq!(guard.get(&"t2".into()).unwrap().status, TaskStatus::Pending);
    assert_eq!(
        guard.get(&"t3".into()).unwrap().status,
        TaskStatus::Completed
    );
}

#[tokio::test]
async fn test_cancellation_leaves_consistent_state() {
    let h = OrchestratorHarness::new();
    let gate = h
        .plan_and_approve(vec![
            test_task("t1", "Search for rust news"),
            test_task("t2", "Write a haiku"),
        ])
        .await;
    h.cancel.cancel();

    let outcome = h.run_loop().run(&gate).await.unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.completed, 0);
    // Nothing half-done: every task is still pending
    let guard = h.store.read().await;
    assert_eq!(guard.tasks_by_status(TaskStatus::Pending).len(), 2);
}
