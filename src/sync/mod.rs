//! Remote mirroring: wire protocol, service seam, and the sync bridge.

pub mod bridge;
pub mod protocol;
pub mod remote;

pub use bridge::SyncBridge;
pub use protocol::{status_from_remote, status_to_remote, SyncRequest, SyncResponse};
pub use remote::{InMemoryRemote, RemoteTaskService};
