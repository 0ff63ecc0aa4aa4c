//! The remote task service seam and an in-memory implementation.
//!
//! [`RemoteTaskService`] is the only way the rest of the system reaches
//! the remote: one async call carrying a [`SyncRequest`] and returning a
//! [`SyncResponse`]. [`InMemoryRemote`] implements the full vocabulary
//! for tests and the demo scenario.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::store::TaskStore;
use crate::core::task::{Task, TaskId, TaskStatus};
use crate::error::{Error, Result};
use crate::sync::protocol::{status_from_remote, SyncRequest, SyncResponse};

/// The narrow seam to the remote mirror. Transports implement this once;
/// everything above it works in terms of requests and responses.
#[async_trait]
pub trait RemoteTaskService: Send + Sync {
    async fn call(&self, request: SyncRequest) -> Result<SyncResponse>;
}

struct RemoteState {
    store: TaskStore,
    next_id: usize,
}

/// A complete in-process remote holding its own task list.
pub struct InMemoryRemote {
    state: Mutex<RemoteState>,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RemoteState {
                store: TaskStore::new(),
                next_id: 1,
            }),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn write(state: &mut RemoteState, tasks: Vec<Task>) -> SyncResponse {
        let mut created = 0;
        for mut task in tasks {
            if task.id.as_str().is_empty() {
                task.id = TaskId::new(format!("task-{}", state.next_id));
                state.next_id += 1;
            }
            if !state.store.contains(&task.id) {
                created += 1;
            }
            state.store.add_task(task);
        }
        SyncResponse::WriteAck {
            success: true,
            created,
            tasks: state.store.all_tasks().to_vec(),
        }
    }

    fn update_status(state: &mut RemoteState, task_id: &str, label: &str) -> Result<SyncResponse> {
        let status = status_from_remote(label)?;
        let id = TaskId::from(task_id);
        let task = state
            .store
            .update_task_status(&id, status)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
        Ok(SyncResponse::UpdateAck {
            success: true,
            task,
            stats: state.store.stats(),
        })
    }

    /// Next actionable task: pending with every dependency completed,
    /// dependency-free tasks offered before dependent ones.
    fn get_next(state: &RemoteState) -> SyncResponse {
        let store = &state.store;
        let actionable = |task: &&Task| {
            task.status == TaskStatus::Pending
                && task.dependencies.iter().all(|dep| {
                    store
                        .get(dep)
                        .map(|d| d.status == TaskStatus::Completed)
                        .unwrap_or(false)
                })
        };
        let next = store
            .all_tasks()
            .iter()
            .filter(actionable)
            .find(|t| t.dependencies.is_empty())
            .or_else(|| store.all_tasks().iter().find(actionable));

        // remaining_count is the full pending count, offered task included
        SyncResponse::NextTask {
            has_next: next.is_some(),
            task: next.cloned(),
            remaining_count: store.tasks_by_status(TaskStatus::Pending).len(),
        }
    }
}

#[async_trait]
impl RemoteTaskService for InMemoryRemote {
    async fn call(&self, request: SyncRequest) -> Result<SyncResponse> {
        let mut state = self.state.lock().await;
        match request {
            SyncRequest::Write { tasks } => Ok(Self::write(&mut state, tasks)),
            SyncRequest::Read => Ok(SyncResponse::ReadResult {
                tasks: state.store.all_tasks().to_vec(),
                stats: state.store.stats(),
            }),
            SyncRequest::UpdateStatus { task_id, status } => {
                Self::update_status(&mut state, &task_id, &status)
            }
            SyncRequest::GetNext => Ok(Self::get_next(&state)),
            SyncRequest::Stats => Ok(SyncResponse::Stats(state.store.stats())),
            SyncRequest::Clear => {
                let count = state.store.len();
                state.store.clear();
                state.next_id = 1;
                Ok(SyncResponse::ClearAck {
                    success: true,
                    message: format!("Cleared {count} tasks"),
                })
            }
        }
    }
}
