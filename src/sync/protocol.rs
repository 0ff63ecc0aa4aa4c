//! Wire protocol for the remote task service.
//!
//! The remote speaks a narrow request/response vocabulary over a single
//! call seam. Requests and responses are plain serde types so a transport
//! can carry them as JSON without further shaping.

use serde::{Deserialize, Serialize};

use crate::core::store::TaskStats;
use crate::core::task::{Task, TaskStatus};
use crate::error::{Error, Result};

/// Requests understood by the remote task service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SyncRequest {
    /// Replace or create tasks in bulk.
    Write { tasks: Vec<Task> },
    /// Fetch the full remote task list with statistics.
    Read,
    /// Move one task to a new status.
    UpdateStatus { task_id: String, status: String },
    /// Ask for the next actionable task.
    GetNext,
    /// Fetch statistics alone.
    Stats,
    /// Remove all remote tasks.
    Clear,
}

/// Responses produced by the remote task service, one per request kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SyncResponse {
    WriteAck {
        success: bool,
        created: usize,
        tasks: Vec<Task>,
    },
    ReadResult {
        tasks: Vec<Task>,
        stats: TaskStats,
    },
    UpdateAck {
        success: bool,
        task: Task,
        stats: TaskStats,
    },
    NextTask {
        has_next: bool,
        task: Option<Task>,
        remaining_count: usize,
    },
    Stats(TaskStats),
    ClearAck {
        success: bool,
        message: String,
    },
}

/// Render a local status in the remote's vocabulary. The mapping is
/// identity on the wire; this is the single place it would change if the
/// remote ever diverged.
pub fn status_to_remote(status: TaskStatus) -> String {
    status.to_string()
}

/// Parse a remote status label. Accepts `in_progress` as an alias for
/// `in-progress` on ingress; everything else must match exactly.
pub fn status_from_remote(label: &str) -> Result<TaskStatus> {
    match label {
        "pending" => Ok(TaskStatus::Pending),
        "in-progress" | "in_progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        "failed" => Ok(TaskStatus::Failed),
        "need-help" => Ok(TaskStatus::NeedHelp),
        other => Err(Error::Validation(format!(
            "unknown remote task status: {other}"
        ))),
    }
}
