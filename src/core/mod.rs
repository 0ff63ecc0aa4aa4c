//! Core task model, store and scheduling.

pub mod scheduler;
pub mod store;
pub mod task;

pub use store::{TaskStats, TaskStore};
pub use task::{Priority, Subtask, Task, TaskId, TaskStatus};
