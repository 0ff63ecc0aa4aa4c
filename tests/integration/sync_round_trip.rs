//! Local/remote convergence: mirror writes, status updates, and the
//! periodic pull.

use std::time::Duration;

use conductor::core::{TaskStatus, TaskStore};
use conductor::sync::{RemoteTaskService, SyncRequest, SyncResponse};
use tokio_util::sync::CancellationToken;

use crate::fixtures::{test_task, OrchestratorHarness};

#[tokio::test]
async fn test_write_read_round_trip_preserves_tasks() {
    let h = OrchestratorHarness::new();
    let tasks = vec![
        test_task("t1", "First").depends_on(&["t0"]),
        test_task("t2", "Second"),
    ];
    h.bridge.mirror_write(tasks.clone()).await;

    let resp = h.remote.call(SyncRequest::Read).await.unwrap();
    let fetched = match resp {
        SyncResponse::ReadResult { tasks, .. } => tasks,
        other => panic!("unexpected response: {other:?}"),
    };

    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].id, tasks[0].id);
    assert_eq!(fetched[0].dependencies, tasks[0].dependencies);
    assert_eq!(fetched[1].title, "Second");
}

#[tokio::test]
async fn test_read_is_idempotent() {
    let h = OrchestratorHarness::new();
    h.bridge.mirror_write(vec![test_task("t1", "First")]).await;

    let first = h.remote.call(SyncRequest::Read).await.unwrap();
    let second = h.remote.call(SyncRequest::Read).await.unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn test_mirrored_status_update_converges() {
    let h = OrchestratorHarness::new();
    h.bridge.mirror_write(vec![test_task("t1", "First")]).await;

    {
        let mut guard = h.store.write().await;
        guard.set_tasks(vec![test_task("t1", "First")]);
        guard.update_task_status(&"t1".into(), TaskStatus::InProgress);
    }
    h.bridge
        .mirror_status(&"t1".into(), TaskStatus::InProgress)
        .await;

    match h.remote.call(SyncRequest::Read).await.unwrap() {
        SyncResponse::ReadResult { tasks, stats } => {
            assert_eq!(tasks[0].status, TaskStatus::InProgress);
            assert_eq!(stats.in_progress, 1);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn test_pull_replaces_local_state_wholesale() {
    let h = OrchestratorHarness::new();
    {
        let mut guard = h.store.write().await;
        guard.set_tasks(vec![test_task("stale", "Old local task")]);
    }
    h.remote
        .call(SyncRequest::Write {
            tasks: vec![test_task("r1", "Remote truth")],
        })
        .await
        .unwrap();

    h.bridge.pull_once().await.unwrap();

    let guard = h.store.read().await;
    assert_eq!(guard.len(), 1);
    assert!(guard.get(&"r1".into()).is_some());
    assert!(guard.get(&"stale".into()).is_none());
}

#[tokio::test]
async fn test_periodic_puller_tracks_remote_changes() {
    let h = OrchestratorHarness::new();
    let cancel = CancellationToken::new();
    let puller = h.bridge.clone().spawn_puller(cancel.clone());

    h.remote
        .call(SyncRequest::Write {
            tasks: vec![test_task("r1", "Appeared remotely")],
        })
        .await
        .unwrap();

    // Two intervals is plenty for at least one pull
    tokio::time::sleep(Duration::from_millis(150)).await;
    cancel.cancel();
    puller.await.unwrap();

    assert!(h.store.read().await.get(&"r1".into()).is_some());
}

#[tokio::test]
async fn test_remote_progress_matches_local_formula() {
    let h = OrchestratorHarness::new();
    let tasks = vec![
        test_task("t1", "a"),
        test_task("t2", "b"),
        test_task("t3", "c"),
        test_task("t4", "d"),
    ];
    h.bridge.mirror_write(tasks.clone()).await;
    for (id, status) in [("t1", "completed"), ("t2", "completed"), ("t3", "failed")] {
        h.remote
            .call(SyncRequest::UpdateStatus {
                task_id: id.into(),
                status: status.into(),
            })
            .await
            .unwrap();
    }

    let remote_stats = match h.remote.call(SyncRequest::Stats).await.unwrap() {
        SyncResponse::Stats(stats) => stats,
        other => panic!("unexpected response: {other:?}"),
    };

    let mut local = TaskStore::new();
    local.set_tasks(tasks);
    local.update_task_status(&"t1".into(), TaskStatus::Completed);
    local.update_task_status(&"t2".into(), TaskStatus::Completed);
    local.update_task_status(&"t3".into(), TaskStatus::Failed);

    // 2 of 4 completed, integer floor: 50
    assert_eq!(remote_stats.progress, 50);
    assert_eq!(local.progress(), remote_stats.progress);
}
