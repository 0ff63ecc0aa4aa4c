//! Keeps the local task store and the remote mirror converging.
//!
//! Two flows: local writes and status changes are mirrored to the remote
//! as they happen, and a periodic pull fetches the remote list and
//! replaces local state wholesale. Sync failures are logged and
//! swallowed; the local store keeps working without the remote.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::store::TaskStore;
use crate::core::task::{Task, TaskId, TaskStatus};
use crate::error::Result;
use crate::sync::protocol::{status_to_remote, SyncRequest, SyncResponse};
use crate::sync::remote::RemoteTaskService;
use crate::{clog, clog_debug, clog_warn};

pub struct SyncBridge {
    remote: Arc<dyn RemoteTaskService>,
    store: Arc<RwLock<TaskStore>>,
    interval: Duration,
    mirror_writes: bool,
}

impl SyncBridge {
    pub fn new(
        remote: Arc<dyn RemoteTaskService>,
        store: Arc<RwLock<TaskStore>>,
        interval: Duration,
        mirror_writes: bool,
    ) -> Self {
        Self {
            remote,
            store,
            interval,
            mirror_writes,
        }
    }

    /// Mirror a bulk task write to the remote. Failure is logged and
    /// swallowed so local work never stalls on the mirror.
    pub async fn mirror_write(&self, tasks: Vec<Task>) {
        if !self.mirror_writes {
            return;
        }
        match self.remote.call(SyncRequest::Write { tasks }).await {
            Ok(SyncResponse::WriteAck { created, .. }) => {
                clog_debug!("Mirrored task write ({} created remotely)", created);
            }
            Ok(other) => {
                clog_warn!("Unexpected response to mirrored write: {:?}", other);
            }
            Err(e) => {
                clog_warn!("Failed to mirror task write: {}", e);
            }
        }
    }

    /// Mirror a single status change to the remote, same failure policy
    /// as [`mirror_write`](Self::mirror_write).
    pub async fn mirror_status(&self, id: &TaskId, status: TaskStatus) {
        if !self.mirror_writes {
            return;
        }
        let request = SyncRequest::UpdateStatus {
            task_id: id.as_str().to_string(),
            status: status_to_remote(status),
        };
        if let Err(e) = self.remote.call(request).await {
            clog_warn!("Failed to mirror status of {}: {}", id, e);
        }
    }

    /// Pull the remote task list and replace local state wholesale.
    /// Returns how many tasks the store now holds.
    pub async fn pull_once(&self) -> Result<usize> {
        let response = self.remote.call(SyncRequest::Read).await?;
        let tasks = match response {
            SyncResponse::ReadResult { tasks, .. } => tasks,
            other => {
                clog_warn!("Unexpected response to pull: {:?}", other);
                return Ok(self.store.read().await.len());
            }
        };
        let count = tasks.len();
        self.store.write().await.set_tasks(tasks);
        clog_debug!("Pulled {} tasks from remote", count);
        Ok(count)
    }

    /// Spawn the periodic pull loop. Runs until the token is cancelled;
    /// individual pull failures are logged and the loop keeps ticking.
    pub fn spawn_puller(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let interval = self.interval;
        tokio::spawn(async move {
            clog!("Sync puller started (every {:?})", interval);
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // the first tick fires immediately
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        clog!("Sync puller stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.pull_once().await {
                            clog_warn!("Periodic pull failed: {}", e);
                        }
                    }
                }
            }
        })
    }
}
