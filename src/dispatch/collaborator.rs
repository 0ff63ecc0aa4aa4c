//! Collaborator contract and bindings.
//!
//! A collaborator is an external capability invoked by action name and
//! JSON arguments. The dispatcher and the sequential executor both speak
//! this contract; what sits behind it (a search API, a generation service,
//! a chat model) is opaque here.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{Error, Result};

/// An external capability invoked by name + arguments.
///
/// `invoke` is an opaque asynchronous call; a failure is reported as
/// [`Error::Invoke`] with the action name and a reason.
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn invoke(&self, action: &str, args: &Value) -> Result<Value>;
}

/// Routes actions by name to their bound collaborator.
///
/// The registry itself implements [`Collaborator`], so callers holding a
/// single `Arc<dyn Collaborator>` can fan out across every binding.
#[derive(Default)]
pub struct CollaboratorRegistry {
    bindings: HashMap<String, Arc<dyn Collaborator>>,
}

impl CollaboratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an action name to a collaborator. Rebinding replaces.
    pub fn bind(&mut self, action: &str, collaborator: Arc<dyn Collaborator>) {
        self.bindings.insert(action.to_string(), collaborator);
    }

    pub fn is_bound(&self, action: &str) -> bool {
        self.bindings.contains_key(action)
    }

    pub fn bound_actions(&self) -> Vec<&str> {
        self.bindings.keys().map(String::as_str).collect()
    }
}

#[async_trait]
impl Collaborator for CollaboratorRegistry {
    async fn invoke(&self, action: &str, args: &Value) -> Result<Value> {
        let collaborator = self.bindings.get(action).ok_or_else(|| Error::Invoke {
            action: action.to_string(),
            reason: "no collaborator bound".to_string(),
        })?;
        collaborator.invoke(action, args).await
    }
}

/// Call record kept by [`SimulatedCollaborator`].
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRecord {
    pub action: String,
    pub args: Value,
}

/// A collaborator that simulates work for the demo binary and tests.
///
/// Responses can be canned per action, and the first N calls to an action
/// can be scripted to fail.
#[derive(Default)]
pub struct SimulatedCollaborator {
    delay: Option<Duration>,
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<InvokeRecord>>,
}

impl SimulatedCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate latency on every invoke.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Return `response` whenever `action` is invoked.
    pub fn respond_with(self, action: &str, response: Value) -> Self {
        self.set_response(action, response);
        self
    }

    /// Same as [`respond_with`](Self::respond_with) for an already shared
    /// instance.
    pub fn set_response(&self, action: &str, response: Value) {
        self.responses
            .lock()
            .expect("responses lock")
            .insert(action.to_string(), response);
    }

    /// Fail the next `count` invocations of `action`.
    pub fn fail_times(self, action: &str, count: usize) -> Self {
        self.set_failures(action, count);
        self
    }

    /// Same as [`fail_times`](Self::fail_times) for an already shared
    /// instance.
    pub fn set_failures(&self, action: &str, count: usize) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(action.to_string(), count);
    }

    /// Every invocation observed so far, in order.
    pub fn calls(&self) -> Vec<InvokeRecord> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl Collaborator for SimulatedCollaborator {
    async fn invoke(&self, action: &str, args: &Value) -> Result<Value> {
        self.calls.lock().expect("calls lock").push(InvokeRecord {
            action: action.to_string(),
            args: args.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        {
            let mut failures = self.failures.lock().expect("failures lock");
            if let Some(remaining) = failures.get_mut(action) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(Error::Invoke {
                        action: action.to_string(),
                        reason: "simulated failure".to_string(),
                    });
                }
            }
        }

        let canned = self
            .responses
            .lock()
            .expect("responses lock")
            .get(action)
            .cloned();
        Ok(canned.unwrap_or_else(|| json!({ "action": action, "status": "ok" })))
    }
}
