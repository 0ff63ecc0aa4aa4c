//! Task dispatch to collaborators.
//!
//! The dispatcher classifies a task's intent, extracts the free-text
//! parameter, and invokes the responsible collaborator with a bounded
//! wait. It mutates no local state and performs no retry of its own; a
//! failure propagates to the caller as the task's failure.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::clog_debug;
use crate::core::task::Task;
use crate::dispatch::collaborator::Collaborator;
use crate::dispatch::intent::{extract_parameter, Intent, IntentClassifier, KeywordClassifier};
use crate::error::{Error, Result};

/// Default ceiling for a single collaborator invocation.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Classifies tasks and invokes the responsible collaborator.
pub struct Dispatcher {
    classifier: Box<dyn IntentClassifier>,
    collaborator: Arc<dyn Collaborator>,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher with the default keyword classifier.
    pub fn new(collaborator: Arc<dyn Collaborator>) -> Self {
        Self {
            classifier: Box::new(KeywordClassifier::new()),
            collaborator,
            timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    /// Swap in a different classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Override the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify a task without dispatching it.
    pub fn classify(&self, task: &Task) -> Intent {
        let text = format!("{} {}", task.title, task.description);
        self.classifier.classify(&text)
    }

    /// Classify the task and invoke the matching collaborator action.
    ///
    /// The wait is bounded by the dispatcher's timeout; a timeout is
    /// reported as [`Error::Timeout`], any collaborator failure as
    /// [`Error::Invoke`].
    pub async fn dispatch(&self, task: &Task) -> Result<Value> {
        let intent = self.classify(task);
        let parameter = extract_parameter(intent, &task.title, &task.description);
        let action = intent.action_name();

        clog_debug!(
            "Dispatching task {} as {} (parameter: {})",
            task.id,
            action,
            parameter
        );

        let args = json!({
            "task_id": task.id,
            "prompt": parameter,
        });

        match tokio::time::timeout(self.timeout, self.collaborator.invoke(action, &args)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }
}
