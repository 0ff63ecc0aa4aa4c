//! Action dispatch: intent classification and collaborator invocation.

pub mod collaborator;
pub mod dispatcher;
pub mod intent;

pub use collaborator::{Collaborator, CollaboratorRegistry, SimulatedCollaborator};
pub use dispatcher::Dispatcher;
pub use intent::{Intent, IntentClassifier, KeywordClassifier};
