//! Dependency-aware task selection.
//!
//! The scheduler surfaces the next eligible task: the first pending task,
//! in insertion order, whose dependencies have all completed. A dependency
//! id absent from the store counts as unmet; selection fails closed, not
//! open. Marking a task in-progress is a claim; it is never re-offered.
//!
//! Known limitation: "all tasks done" and "all remaining tasks blocked"
//! both yield `None`. Callers that care can consult [`blocked_pending`]
//! for a diagnostic count.

use crate::core::store::TaskStore;
use crate::core::task::{Task, TaskStatus};

/// Check whether every dependency of `task` has completed in `store`.
///
/// A dependency id that does not resolve to a task is unmet.
fn dependencies_met(task: &Task, store: &TaskStore) -> bool {
    task.dependencies.iter().all(|dep| {
        store
            .get(dep)
            .map(|t| t.status == TaskStatus::Completed)
            .unwrap_or(false)
    })
}

/// Return the next eligible task, or `None` when nothing qualifies.
pub fn next_eligible<'a>(store: &'a TaskStore) -> Option<&'a Task> {
    store
        .all_tasks()
        .iter()
        .find(|t| t.status == TaskStatus::Pending && dependencies_met(t, store))
}

/// Count pending tasks held back by an unmet or missing dependency.
///
/// Purely diagnostic: lets a caller log why `next_eligible` returned
/// `None` while pending tasks remain.
pub fn blocked_pending(store: &TaskStore) -> usize {
    store
        .all_tasks()
        .iter()
        .filter(|t| t.status == TaskStatus::Pending && !dependencies_met(t, store))
        .count()
}
