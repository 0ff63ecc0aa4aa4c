//! Sequential execution of disposable multi-step plans.

pub mod plan;
pub mod sequential;

pub use plan::{plans, ErrorPolicy, ExecutionPlan, Step, StepAction, Verification};
pub use sequential::{ExecutionRecord, PlanReport, SequentialExecutor, StepStatus};
