//! Two-phase approval gate with validated state transitions.
//!
//! Phase 1 (planning) writes pending tasks into the store and ends by
//! awaiting approval; phase 2 (execution) may begin only after an explicit
//! approval signal. The gate holds an explicit [`PlanState`] the run loop
//! consults before scheduling; the task store itself never blocks status
//! updates while approval is pending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clog;
use crate::core::store::TaskStore;
use crate::core::task::{Task, TaskStatus};
use crate::error::{Error, Result};

/// Lifecycle of a plan with respect to approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PlanState {
    /// The plan is being drafted; tasks may still change.
    #[default]
    Drafting,
    /// Planning finished; waiting for an external approval signal.
    AwaitingApproval,
    /// Execution may begin.
    Approved,
    /// The plan was rejected before any task left pending.
    Rejected,
}

impl std::fmt::Display for PlanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanState::Drafting => write!(f, "drafting"),
            PlanState::AwaitingApproval => write!(f, "awaiting-approval"),
            PlanState::Approved => write!(f, "approved"),
            PlanState::Rejected => write!(f, "rejected"),
        }
    }
}

/// A record of a state transition with timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateHistoryEntry {
    pub state: PlanState,
    pub entered_at: DateTime<Utc>,
}

/// Gates when execution may begin, enforcing valid state transitions.
///
/// Valid transitions:
/// Drafting -> AwaitingApproval -> {Approved | Rejected}; Rejected ->
/// Drafting (re-plan). Approved is terminal for one plan's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalGate {
    state: PlanState,
    history: Vec<StateHistoryEntry>,
}

impl Default for ApprovalGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalGate {
    pub fn new() -> Self {
        Self {
            state: PlanState::Drafting,
            history: vec![StateHistoryEntry {
                state: PlanState::Drafting,
                entered_at: Utc::now(),
            }],
        }
    }

    pub fn state(&self) -> PlanState {
        self.state
    }

    /// History of all states visited, in order.
    pub fn history(&self) -> &[StateHistoryEntry] {
        &self.history
    }

    /// Whether the run loop may call the scheduler.
    pub fn execution_allowed(&self) -> bool {
        self.state == PlanState::Approved
    }

    /// Check if a transition to the target state is valid.
    pub fn can_transition(&self, target: PlanState) -> bool {
        matches!(
            (self.state, target),
            (PlanState::Drafting, PlanState::AwaitingApproval)
                | (PlanState::AwaitingApproval, PlanState::Approved)
                | (PlanState::AwaitingApproval, PlanState::Rejected)
                | (PlanState::Rejected, PlanState::Drafting)
        )
    }

    /// Attempt to transition to a new state.
    pub fn transition(&mut self, target: PlanState) -> Result<()> {
        if !self.can_transition(target) {
            return Err(Error::InvalidPlanTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        self.state = target;
        self.history.push(StateHistoryEntry {
            state: target,
            entered_at: Utc::now(),
        });
        Ok(())
    }

    /// Finish planning: write the drafted tasks as pending and await
    /// approval. Nothing is dispatched here.
    pub fn submit_plan(&mut self, store: &mut TaskStore, tasks: Vec<Task>) -> Result<()> {
        if self.state != PlanState::Drafting {
            return Err(Error::InvalidPlanTransition {
                from: self.state.to_string(),
                to: PlanState::AwaitingApproval.to_string(),
            });
        }
        let count = tasks.len();
        let pending = tasks
            .into_iter()
            .map(|mut task| {
                task.status = TaskStatus::Pending;
                task
            })
            .collect();
        store.set_tasks(pending);
        self.transition(PlanState::AwaitingApproval)?;
        clog!("Plan submitted with {} tasks; awaiting approval", count);
        Ok(())
    }

    /// External approval signal: execution may begin.
    pub fn approve(&mut self) -> Result<()> {
        self.transition(PlanState::Approved)?;
        clog!("Plan approved; execution permitted");
        Ok(())
    }

    /// External rejection signal: abort before any task leaves pending
    /// and clear the drafted plan.
    pub fn reject(&mut self, store: &mut TaskStore) -> Result<()> {
        self.transition(PlanState::Rejected)?;
        store.clear();
        clog!("Plan rejected; drafted tasks cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> Task {
        Task::with_id(id, id, "")
    }

    #[test]
    fn test_gate_starts_drafting() {
        let gate = ApprovalGate::new();
        assert_eq!(gate.state(), PlanState::Drafting);
        assert!(!gate.execution_allowed());
        assert_eq!(gate.history().len(), 1);
    }

    #[test]
    fn test_valid_transition_sequence() {
        let mut gate = ApprovalGate::new();
        gate.transition(PlanState::AwaitingApproval).unwrap();
        gate.transition(PlanState::Approved).unwrap();

        assert!(gate.execution_allowed());
        let states: Vec<PlanState> = gate.history().iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![
                PlanState::Drafting,
                PlanState::AwaitingApproval,
                PlanState::Approved
            ]
        );
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut gate = ApprovalGate::new();

        // Cannot approve straight from drafting
        let err = gate.transition(PlanState::Approved).unwrap_err();
        assert!(matches!(err, Error::InvalidPlanTransition { .. }));

        // Cannot go back to drafting from awaiting approval
        gate.transition(PlanState::AwaitingApproval).unwrap();
        assert!(gate.transition(PlanState::Drafting).is_err());

        // Approved is terminal
        gate.transition(PlanState::Approved).unwrap();
        assert!(gate.transition(PlanState::Rejected).is_err());
        assert!(gate.transition(PlanState::AwaitingApproval).is_err());
    }

    #[test]
    fn test_rejected_allows_replanning() {
        let mut gate = ApprovalGate::new();
        gate.transition(PlanState::AwaitingApproval).unwrap();
        gate.transition(PlanState::Rejected).unwrap();
        gate.transition(PlanState::Drafting).unwrap();

        assert_eq!(gate.state(), PlanState::Drafting);
    }

    #[test]
    fn test_submit_plan_writes_pending_tasks() {
        let mut gate = ApprovalGate::new();
        let mut store = TaskStore::new();

        let mut dirty = task("t1");
        dirty.status = TaskStatus::InProgress; // planner must not pre-start tasks
        gate.submit_plan(&mut store, vec![dirty, task("t2")]).unwrap();

        assert_eq!(gate.state(), PlanState::AwaitingApproval);
        assert_eq!(store.len(), 2);
        assert!(store
            .all_tasks()
            .iter()
            .all(|t| t.status == TaskStatus::Pending));
    }

    #[test]
    fn test_submit_plan_requires_drafting() {
        let mut gate = ApprovalGate::new();
        let mut store = TaskStore::new();
        gate.submit_plan(&mut store, vec![task("t1")]).unwrap();

        let err = gate.submit_plan(&mut store, vec![task("t2")]).unwrap_err();
        assert!(matches!(err, Error::InvalidPlanTransition { .. }));
    }

    #[test]
    fn test_approve_permits_execution() {
        let mut gate = ApprovalGate::new();
        let mut store = TaskStore::new();
        gate.submit_plan(&mut store, vec![task("t1")]).unwrap();

        gate.approve().unwrap();
        assert!(gate.execution_allowed());
    }

    #[test]
    fn test_reject_clears_plan_before_execution() {
        let mut gate = ApprovalGate::new();
        let mut store = TaskStore::new();
        gate.submit_plan(&mut store, vec![task("t1"), task("t2")]).unwrap();

        gate.reject(&mut store).unwrap();

        assert_eq!(gate.state(), PlanState::Rejected);
        assert!(!gate.execution_allowed());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_does_not_block_updates_while_awaiting() {
        // The gate gates the run loop, not the store.
        let mut gate = ApprovalGate::new();
        let mut store = TaskStore::new();
        gate.submit_plan(&mut store, vec![task("t1")]).unwrap();

        let updated = store
            .update_task_status(&"t1".into(), TaskStatus::InProgress)
            .unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
    }
}
