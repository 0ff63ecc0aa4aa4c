//! Task data model for planned agent work.
//!
//! Tasks are the units of planned work produced by the planning phase.
//! Each task tracks its status, priority, dependencies on other tasks,
//! and an ordered list of owned subtasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique identifier for a task.
///
/// Ids arriving from the planning phase or the remote service are kept
/// verbatim; locally-minted ids use UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Task status in its lifecycle.
///
/// Transitions are one-directional: pending -> in-progress ->
/// {completed | failed | need-help}. Skipping in-progress is allowed;
/// leaving a terminal state is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task created but not yet started.
    #[default]
    Pending,
    /// Task is currently being executed.
    #[serde(alias = "in_progress")]
    InProgress,
    /// Task completed successfully.
    Completed,
    /// Task failed with an error.
    Failed,
    /// Task needs human intervention.
    NeedHelp,
}

impl TaskStatus {
    /// Check whether the status is terminal (Completed, Failed or NeedHelp).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::NeedHelp
        )
    }

    /// Check whether a transition to `target` moves forward in the lifecycle.
    ///
    /// Re-asserting the current status counts as valid (a no-op update).
    pub fn can_transition(&self, target: TaskStatus) -> bool {
        if *self == target {
            return true;
        }
        match self {
            TaskStatus::Pending => true,
            TaskStatus::InProgress => target != TaskStatus::Pending,
            // Terminal states never transition
            _ => false,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in-progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::NeedHelp => write!(f, "need-help"),
        }
    }
}

/// Task priority.
///
/// Priority is carried for display and reporting; the scheduler selects
/// by insertion order, not priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// A subtask owned by a parent task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Names of the actions this subtask needs.
    #[serde(default)]
    pub tools: Vec<String>,
}

impl Subtask {
    pub fn new(id: impl Into<TaskId>, title: &str) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            tools: Vec::new(),
        }
    }
}

/// A unit of planned work with a status and optional dependencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for this task.
    pub id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Detailed description of what the task should accomplish.
    #[serde(default)]
    pub description: String,
    /// Current lifecycle status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Priority for display and reporting.
    #[serde(default)]
    pub priority: Priority,
    /// Ids of tasks that must complete before this one is eligible.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    /// Ordered subtasks owned by this task.
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending task with a generated id.
    pub fn new(title: &str, description: &str) -> Self {
        Self::with_id(TaskId::generate(), title, description)
    }

    /// Create a new pending task with an explicit id.
    pub fn with_id(id: impl Into<TaskId>, title: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.to_string(),
            description: description.to_string(),
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            dependencies: Vec::new(),
            subtasks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style dependency attachment.
    pub fn depends_on(mut self, ids: &[&str]) -> Self {
        self.dependencies = ids.iter().map(|s| TaskId::from(*s)).collect();
        self
    }

    /// Builder-style priority attachment.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Check if the task is in a terminal state.
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
