//! Canonical in-memory task collection.
//!
//! The store preserves insertion order (which is display order) and owns
//! the task state machine: status changes go through
//! [`TaskStore::update_task_status`] so forward-only transitions are
//! enforced in one place. Tasks are never deleted individually; only
//! [`TaskStore::clear`] removes them.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::clog_warn;
use crate::core::task::{Task, TaskId, TaskStatus};

/// Aggregate counters over the store, as reported by `stats` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub failed: usize,
    pub need_help: usize,
    /// Completion percentage, integer-floored. 0 when the store is empty.
    pub progress: u8,
}

/// Canonical in-memory collection of tasks.
#[derive(Debug, Default)]
pub struct TaskStore {
    /// Tasks in insertion order.
    tasks: Vec<Task>,
    /// Index from task id to position in `tasks`.
    index: HashMap<TaskId, usize>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection.
    ///
    /// Insertion order of `tasks` becomes the display (and scheduling)
    /// order. A later duplicate id replaces the earlier entry in place.
    /// Cyclic dependencies are tolerated but logged: tasks in a cycle
    /// never become eligible.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks.clear();
        self.index.clear();
        for task in tasks {
            self.add_task(task);
        }
        if self.has_dependency_cycle() {
            clog_warn!(
                "Task list of {} contains a dependency cycle; cyclic tasks will never be scheduled",
                self.tasks.len()
            );
        }
    }

    /// Append a task, or update in place on id collision.
    pub fn add_task(&mut self, task: Task) {
        match self.index.get(&task.id) {
            Some(&pos) => self.tasks[pos] = task,
            None => {
                self.index.insert(task.id.clone(), self.tasks.len());
                self.tasks.push(task);
            }
        }
    }

    /// Apply a status transition to a task.
    ///
    /// Returns `None` when the id is unknown (the not-found signal).
    /// A transition out of a terminal state, or backwards to pending, is a
    /// documented no-op: the store logs a warning and returns the task
    /// unchanged. Applied transitions bump `updated_at`; completing a task
    /// completes all of its subtasks.
    pub fn update_task_status(&mut self, id: &TaskId, status: TaskStatus) -> Option<Task> {
        let pos = *self.index.get(id)?;
        let task = &mut self.tasks[pos];

        if !task.status.can_transition(status) {
            clog_warn!(
                "Ignoring status transition {} -> {} for task {}",
                task.status,
                status,
                id
            );
            return Some(task.clone());
        }

        if task.status != status {
            task.status = status;
            task.updated_at = chrono::Utc::now();
            if status == TaskStatus::Completed {
                for subtask in &mut task.subtasks {
                    subtask.status = TaskStatus::Completed;
                }
            }
        }
        Some(task.clone())
    }

    /// Apply a status change to a subtask.
    ///
    /// When every subtask reaches completed, the parent task is completed
    /// as well. Returns `None` when either id is unknown.
    pub fn update_subtask_status(
        &mut self,
        task_id: &TaskId,
        subtask_id: &TaskId,
        status: TaskStatus,
    ) -> Option<Task> {
        let pos = *self.index.get(task_id)?;
        let task = &mut self.tasks[pos];

        let subtask = task.subtasks.iter_mut().find(|st| &st.id == subtask_id)?;
        subtask.status = status;
        task.updated_at = chrono::Utc::now();

        let all_done = !task.subtasks.is_empty()
            && task.subtasks.iter().all(|st| st.status == TaskStatus::Completed);
        if all_done && task.status.can_transition(TaskStatus::Completed) {
            task.status = TaskStatus::Completed;
        }
        Some(task.clone())
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.index.get(id).map(|&pos| &self.tasks[pos])
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.index.contains_key(id)
    }

    /// All tasks in insertion order.
    pub fn all_tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks_by_status(TaskStatus::Completed).len()
    }

    /// Completion percentage = completed / total, integer-floored.
    /// 0 when the store is empty.
    pub fn progress(&self) -> u8 {
        if self.tasks.is_empty() {
            return 0;
        }
        (self.completed_count() * 100 / self.tasks.len()) as u8
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats {
            total: self.tasks.len(),
            completed: self.completed_count(),
            in_progress: self.tasks_by_status(TaskStatus::InProgress).len(),
            pending: self.tasks_by_status(TaskStatus::Pending).len(),
            failed: self.tasks_by_status(TaskStatus::Failed).len(),
            need_help: self.tasks_by_status(TaskStatus::NeedHelp).len(),
            progress: self.progress(),
        }
    }

    /// Remove every task. The only operation that deletes tasks.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.index.clear();
    }

    /// Check the dependency graph for cycles.
    ///
    /// Dependencies on unknown ids are ignored here; they make a task
    /// unschedulable but cannot form a cycle.
    pub fn has_dependency_cycle(&self) -> bool {
        let mut graph: DiGraph<(), ()> = DiGraph::new();
        let nodes: HashMap<&TaskId, _> = self
            .tasks
            .iter()
            .map(|t| (&t.id, graph.add_node(())))
            .collect();
        for task in &self.tasks {
            for dep in &task.dependencies {
                if let Some(&dep_node) = nodes.get(dep) {
                    graph.add_edge(dep_node, nodes[&task.id], ());
                }
            }
        }
        is_cyclic_directed(&graph)
    }
}
