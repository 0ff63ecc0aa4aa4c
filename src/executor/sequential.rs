//! Sequential plan execution with retry, verification and error policy.
//!
//! Each step must complete (and verify, when a verification is attached)
//! before the next one starts. Failures are collected in the returned
//! report rather than raised; only the report's `success` flag and error
//! list tell the caller how the run went.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::clog_debug;
use crate::dispatch::collaborator::Collaborator;
use crate::executor::plan::{ErrorPolicy, ExecutionPlan, Step};

/// Outcome of one step in the execution log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Success,
    /// Failed and aborted the plan.
    Failed,
    /// Failed but the plan moved on.
    Skipped,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Success => write!(f, "success"),
            StepStatus::Failed => write!(f, "failed"),
            StepStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// One entry in the accumulated execution log.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub step_id: String,
    pub description: String,
    pub status: StepStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Result of executing a plan.
///
/// `success` is true exactly when no step failed. On abort, `results`
/// holds the steps that completed before the aborting step.
#[derive(Debug, Clone, Default)]
pub struct PlanReport {
    pub success: bool,
    pub results: Vec<Value>,
    pub errors: Vec<String>,
    /// True when an Abort policy terminated the plan early.
    pub aborted: bool,
}

/// Runs execution plans one step at a time.
///
/// The execution log accumulates across runs and is cleared only by
/// [`SequentialExecutor::clear_log`].
#[derive(Default)]
pub struct SequentialExecutor {
    log: Vec<ExecutionRecord>,
}

impl SequentialExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a plan's steps in order.
    ///
    /// A step succeeds only if its primary action completes and, when a
    /// verification is attached, the verification satisfies its
    /// expected-result predicate. Failed attempts are retried up to the
    /// step's `max_retries`; once exhausted the step's error policy
    /// decides: Abort stops the plan immediately (rollback steps are NOT
    /// run automatically), Continue and Retry record the failure and
    /// proceed.
    pub async fn execute_plan(
        &mut self,
        plan: &ExecutionPlan,
        collaborator: &dyn Collaborator,
    ) -> PlanReport {
        clog_debug!("Executing plan: {}", plan.name);
        self.execute_steps(&plan.steps, collaborator).await
    }

    /// Execute a plan's rollback steps. Explicit, never automatic.
    pub async fn run_rollback(
        &mut self,
        plan: &ExecutionPlan,
        collaborator: &dyn Collaborator,
    ) -> PlanReport {
        clog_debug!("Running rollback for plan: {}", plan.name);
        self.execute_steps(&plan.rollback, collaborator).await
    }

    async fn execute_steps(
        &mut self,
        steps: &[Step],
        collaborator: &dyn Collaborator,
    ) -> PlanReport {
        let mut results = Vec::new();
        let mut errors = Vec::new();

        for step in steps {
            clog_debug!("Executing step: {}", step.description);

            let max_attempts = step.max_retries.max(1);
            let mut succeeded = false;
            let mut step_result = None;
            let mut last_error = None;

            let mut attempts = 0;
            while attempts < max_attempts && !succeeded {
                attempts += 1;

                match collaborator
                    .invoke(&step.action.action, &step.action.args)
                    .await
                {
                    Ok(result) => {
                        match self.verify_step(step, collaborator).await {
                            Ok(()) => {
                                succeeded = true;
                                step_result = Some(result);
                            }
                            Err(reason) => last_error = Some(reason),
                        }
                    }
                    Err(err) => last_error = Some(err.to_string()),
                }
            }

            if succeeded {
                let result = step_result.unwrap_or(Value::Null);
                self.log.push(ExecutionRecord {
                    step_id: step.id.clone(),
                    description: step.description.clone(),
                    status: StepStatus::Success,
                    result: Some(result.clone()),
                    error: None,
                    timestamp: Utc::now(),
                });
                results.push(result);
                continue;
            }

            let reason = last_error.unwrap_or_else(|| "unknown failure".to_string());
            errors.push(format!("Step \"{}\" failed: {}", step.description, reason));

            if step.on_error == ErrorPolicy::Abort {
                self.log.push(ExecutionRecord {
                    step_id: step.id.clone(),
                    description: step.description.clone(),
                    status: StepStatus::Failed,
                    result: None,
                    error: Some(reason),
                    timestamp: Utc::now(),
                });
                // Later steps are not attempted; rollback is not run here.
                return PlanReport {
                    success: false,
                    results,
                    errors,
                    aborted: true,
                };
            }

            // Continue, and Retry once exhausted, both move on.
            self.log.push(ExecutionRecord {
                step_id: step.id.clone(),
                description: step.description.clone(),
                status: StepStatus::Skipped,
                result: None,
                error: Some(reason),
                timestamp: Utc::now(),
            });
        }

        PlanReport {
            success: errors.is_empty(),
            results,
            errors,
            aborted: false,
        }
    }

    /// Run a step's verification, if any. `Ok(())` means verified.
    async fn verify_step(
        &self,
        step: &Step,
        collaborator: &dyn Collaborator,
    ) -> std::result::Result<(), String> {
        let Some(verification) = &step.verification else {
            return Ok(());
        };

        clog_debug!("Running verification for step: {}", step.description);
        let result = collaborator
            .invoke(&verification.action.action, &verification.action.args)
            .await
            .map_err(|e| format!("verification call failed: {}", e))?;

        match &verification.expected {
            Some(expected) if !expected(&result) => {
                Err("verification predicate not satisfied".to_string())
            }
            _ => Ok(()),
        }
    }

    /// The accumulated execution log, oldest first.
    pub fn execution_log(&self) -> &[ExecutionRecord] {
        &self.log
    }

    /// Drop all accumulated log entries.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}
