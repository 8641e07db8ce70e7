//! Snapshots module split into submodules:
//! - manager.rs: SnapshotManager (repository contract), SnapshotCriteria, InMemorySnapshotManager.
//! - registry.rs: snapshots JSON file load/save (atomic tmp+rename).
//! - proxy.rs: SnapshotPageProxy (lazy page over a snapshot), ProxyRecord.
//! - children.rs: SnapshotChildren (deferred children collection).

mod children;
mod manager;
mod proxy;
mod registry;

pub use children::SnapshotChildren;
pub use manager::{is_published, InMemorySnapshotManager, SnapshotCriteria, SnapshotManager};
pub use proxy::{ProxyRecord, SnapshotPageProxy};
