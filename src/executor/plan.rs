//! Execution plans: ordered steps with verification and error policy.
//!
//! A plan is built on demand for one multi-step operation, consumed once
//! by the sequential executor, and discarded. Steps name a collaborator
//! action plus arguments; an optional verification re-invokes a second
//! action and checks its result against a predicate.

use serde_json::{json, Value};
use std::sync::Arc;

/// What to do when a step has exhausted its retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Retry up to `max_retries`; once exhausted, behaves like Continue.
    #[default]
    Retry,
    /// Record the failure, skip this step's result, proceed.
    Continue,
    /// Stop the whole plan immediately. Rollback is not run automatically.
    Abort,
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorPolicy::Retry => write!(f, "retry"),
            ErrorPolicy::Continue => write!(f, "continue"),
            ErrorPolicy::Abort => write!(f, "abort"),
        }
    }
}

/// A collaborator action reference: name + arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct StepAction {
    pub action: String,
    pub args: Value,
}

impl StepAction {
    pub fn new(action: &str, args: Value) -> Self {
        Self {
            action: action.to_string(),
            args,
        }
    }
}

/// Predicate over a verification action's result.
pub type ExpectedResult = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A second action whose result must satisfy a predicate for the owning
/// step to count as succeeded. Without a predicate, a successful
/// verification call is enough.
#[derive(Clone)]
pub struct Verification {
    pub action: StepAction,
    pub expected: Option<ExpectedResult>,
}

impl std::fmt::Debug for Verification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verification")
            .field("action", &self.action)
            .field("expected", &self.expected.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

/// One atomic step inside an execution plan.
#[derive(Debug, Clone)]
pub struct Step {
    pub id: String,
    pub description: String,
    pub action: StepAction,
    pub verification: Option<Verification>,
    pub on_error: ErrorPolicy,
    /// Attempt ceiling. 1 means no retry.
    pub max_retries: usize,
}

impl Step {
    pub fn new(id: &str, description: &str, action: &str, args: Value) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            action: StepAction::new(action, args),
            verification: None,
            on_error: ErrorPolicy::default(),
            max_retries: 1,
        }
    }

    /// Attach a verification action without a predicate.
    pub fn verify_with(mut self, action: &str, args: Value) -> Self {
        self.verification = Some(Verification {
            action: StepAction::new(action, args),
            expected: None,
        });
        self
    }

    /// Attach a verification action with an expected-result predicate.
    pub fn verify_expecting<F>(mut self, action: &str, args: Value, expected: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.verification = Some(Verification {
            action: StepAction::new(action, args),
            expected: Some(Arc::new(expected)),
        });
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    pub fn max_retries(mut self, max: usize) -> Self {
        self.max_retries = max;
        self
    }
}

/// An ordered, disposable sequence of steps for one multi-step operation.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub name: String,
    pub description: String,
    pub steps: Vec<Step>,
    /// Compensating steps, run only on explicit request.
    pub rollback: Vec<Step>,
}

impl ExecutionPlan {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            steps: Vec::new(),
            rollback: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn rollback_step(mut self, step: Step) -> Self {
        self.rollback.push(step);
        self
    }
}

/// Prebuilt plans for common configuration operations.
pub mod plans {
    use super::*;

    /// Plan to register a collaborator endpoint in a config file:
    /// read, merge, write (retried), then verify the name appears.
    pub fn register_collaborator(name: &str, endpoint: Value, config_path: &str) -> ExecutionPlan {
        let verify_name = name.to_string();
        ExecutionPlan::new(
            &format!("Register {} collaborator", name),
            &format!("Sequential plan to register the {} endpoint", name),
        )
        .step(Step::new(
            "read-config",
            "Read current collaborator configuration",
            "read-file",
            json!({ "path": config_path }),
        ))
        .step(Step::new(
            "merge-config",
            "Merge new endpoint into configuration",
            "merge-config",
            json!({ "name": name, "endpoint": endpoint }),
        ))
        .step(
            Step::new(
                "write-config",
                "Write updated configuration",
                "write-file",
                json!({ "path": config_path }),
            )
            .on_error(ErrorPolicy::Retry)
            .max_retries(3),
        )
        .step(
            Step::new(
                "verify-registration",
                "Verify the endpoint was registered",
                "read-file",
                json!({ "path": config_path }),
            )
            .verify_expecting(
                "read-file",
                json!({ "path": config_path }),
                move |result| result.to_string().contains(&verify_name),
            ),
        )
        .rollback_step(Step::new(
            "rollback-remove",
            "Remove the endpoint that was being registered",
            "remove-config",
            json!({ "name": name }),
        ))
        .rollback_step(
            Step::new(
                "rollback-write",
                "Write restored configuration",
                "write-file",
                json!({ "path": config_path }),
            )
            .max_retries(3),
        )
    }

    /// Plan to remove a collaborator endpoint from a config file.
    pub fn remove_collaborator(name: &str, config_path: &str) -> ExecutionPlan {
        let verify_name = name.to_string();
        ExecutionPlan::new(
            &format!("Remove {} collaborator", name),
            &format!("Sequential plan to remove the {} endpoint", name),
        )
        .step(Step::new(
            "read-config",
            "Read current collaborator configuration",
            "read-file",
            json!({ "path": config_path }),
        ))
        .step(Step::new(
            "remove-config",
            "Remove endpoint from configuration",
            "remove-config",
            json!({ "name": name }),
        ))
        .step(
            Step::new(
                "write-config",
                "Write updated configuration",
                "write-file",
                json!({ "path": config_path }),
            )
            .on_error(ErrorPolicy::Retry)
            .max_retries(3),
        )
        .step(
            Step::new(
                "verify-removal",
                "Verify the endpoint was removed",
                "read-file",
                json!({ "path": config_path }),
            )
            .verify_expecting(
                "read-file",
                json!({ "path": config_path }),
                move |result| !result.to_string().contains(&verify_name),
            ),
        )
    }
}
