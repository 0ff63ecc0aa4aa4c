//! The autonomous run loop: pick, dispatch, record, repeat.
//!
//! One task is in flight at a time. Each iteration asks the scheduler for
//! the next eligible task, claims it as in-progress, dispatches it, then
//! records completed or failed. Every status change is mirrored through
//! the sync bridge. The loop stops when the scheduler yields nothing or
//! the cancellation token fires; cancellation is cooperative and never
//! interrupts a dispatch already in flight.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::approval::ApprovalGate;
use crate::core::scheduler;
use crate::core::store::{TaskStats, TaskStore};
use crate::core::task::{Task, TaskStatus};
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::sync::SyncBridge;
use crate::{clog, clog_error, clog_warn};

/// What a finished run accomplished.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Tasks this run moved to completed.
    pub completed: usize,
    /// Tasks this run moved to failed.
    pub failed: usize,
    /// Pending tasks left behind with unmet dependencies.
    pub blocked: usize,
    /// Whether the run stopped because of cancellation.
    pub cancelled: bool,
    /// Store statistics at the moment the loop stopped.
    pub stats: TaskStats,
}

pub struct RunLoop {
    store: Arc<RwLock<TaskStore>>,
    bridge: Arc<SyncBridge>,
    dispatcher: Dispatcher,
    delay: Duration,
    cancel: CancellationToken,
}

impl RunLoop {
    pub fn new(
        store: Arc<RwLock<TaskStore>>,
        bridge: Arc<SyncBridge>,
        dispatcher: Dispatcher,
        delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            bridge,
            dispatcher,
            delay,
            cancel,
        }
    }

    /// Drive the store to quiescence, one task at a time.
    ///
    /// Refuses to start unless the gate has been approved. Returns a
    /// summary of what the run accomplished.
    pub async fn run(&self, gate: &ApprovalGate) -> Result<RunOutcome> {
        if !gate.execution_allowed() {
            return Err(Error::ExecutionNotApproved {
                state: gate.state().to_string(),
            });
        }

        clog!("Run loop starting");
        let mut completed = 0;
        let mut failed = 0;
        let mut cancelled = false;

        loop {
            if self.cancel.is_cancelled() {
                clog!("Run loop cancelled before next pick");
                cancelled = true;
                break;
            }

            let next = {
                let store = self.store.read().await;
                scheduler::next_eligible(&store).cloned()
            };
            let Some(task) = next else {
                break;
            };

            self.mark(&task, TaskStatus::InProgress).await;
            clog!("Executing task {}: {}", task.id, task.title);

            match self.dispatcher.dispatch(&task).await {
                Ok(_) => {
                    self.mark(&task, TaskStatus::Completed).await;
                    completed += 1;
                }
                Err(e) => {
                    clog_error!("Task {} failed: {}", task.id, e);
                    self.mark(&task, TaskStatus::Failed).await;
                    failed += 1;
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    clog!("Run loop cancelled during pacing delay");
                    cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
        }

        let (blocked, stats) = {
            let store = self.store.read().await;
            (scheduler::blocked_pending(&store), store.stats())
        };
        if blocked > 0 {
            clog_warn!(
                "Run loop stopped with {} pending tasks blocked on unmet dependencies",
                blocked
            );
        }
        clog!(
            "Run loop finished: {} completed, {} failed, {} blocked",
            completed,
            failed,
            blocked
        );

        Ok(RunOutcome {
            completed,
            failed,
            blocked,
            cancelled,
            stats,
        })
    }

    /// Apply a status change locally, then mirror it.
    async fn mark(&self, task: &Task, status: TaskStatus) {
        {
            let mut store = self.store.write().await;
            store.update_task_status(&task.id, status);
        }
        self.bridge.mirror_status(&task.id, status).await;
    }
}
