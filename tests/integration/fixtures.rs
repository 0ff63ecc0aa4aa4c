//! Shared fixtures for the integration suite.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use conductor::approval::ApprovalGate;
use conductor::core::{Task, TaskStore};
use conductor::dispatch::{CollaboratorRegistry, Dispatcher, SimulatedCollaborator};
use conductor::run_loop::RunLoop;
use conductor::sync::{InMemoryRemote, SyncBridge};

pub fn test_task(id: &str, title: &str) -> Task {
    Task::with_id(id, title, "")
}

/// A fully wired orchestration stack: shared store, in-memory remote,
/// sync bridge, and a dispatcher backed by one simulated collaborator
/// bound to every intent action.
pub struct OrchestratorHarness {
    pub store: Arc<RwLock<TaskStore>>,
    pub remote: Arc<InMemoryRemote>,
    pub bridge: Arc<SyncBridge>,
    pub sim: Arc<SimulatedCollaborator>,
    pub registry: Arc<CollaboratorRegistry>,
    pub cancel: CancellationToken,
}

impl OrchestratorHarness {
    pub fn new() -> Self {
        let sim = Arc::new(SimulatedCollaborator::new());
        let mut registry = CollaboratorRegistry::new();
        for action in [
            "web-search",
            "image-generation",
            "video-generation",
            "code-generation",
            "generic-completion",
            "read-file",
            "merge-config",
            "write-file",
            "remove-config",
        ] {
            registry.bind(action, sim.clone());
        }

        let store = Arc::new(RwLock::new(TaskStore::new()));
        let remote = InMemoryRemote::shared();
        let bridge = Arc::new(SyncBridge::new(
            remote.clone(),
            store.clone(),
            Duration::from_millis(50),
            true,
        ));

        Self {
            store,
            remote,
            bridge,
            sim,
            registry: Arc::new(registry),
            cancel: CancellationToken::new(),
        }
    }

    /// Submit and approve a plan, mirroring the write to the remote.
    pub async fn plan_and_approve(&self, tasks: Vec<Task>) -> ApprovalGate {
        let mut gate = ApprovalGate::new();
        {
            let mut guard = self.store.write().await;
            gate.submit_plan(&mut guard, tasks.clone()).unwrap();
        }
        self.bridge.mirror_write(tasks).await;
        gate.approve().unwrap();
        gate
    }

    pub fn run_loop(&self) -> RunLoop {
        RunLoop::new(
            self.store.clone(),
            self.bridge.clone(),
            Dispatcher::new(self.registry.clone()),
            Duration::from_millis(1),
            self.cancel.clone(),
        )
    }
}
