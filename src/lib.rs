pub mod approval;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod log;
pub mod run_loop;
pub mod sync;

pub use crate::core::{Task, TaskId, TaskStats, TaskStatus, TaskStore};
pub use error::{Error, Result};
