//! pagesnap: pages served from published snapshots.
//!
//! A `SnapshotPageProxy` stands in for a page and reconstructs it lazily from
//! stored snapshot content: the page itself, its target, parent chain, blocks
//! and children are each resolved on first use.

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod snapshots;
pub mod transformer;
pub mod util;

pub mod ajax;
pub mod cli;
pub mod cms;

// Re-exports
pub use config::PageSnapConfig;
pub use error::{is_unsupported, SnapshotError};
pub use model::{
    Block, BlockDescriptor, Page, PageChildren, PageHandle, PageLike, ParentLevel, Site, Snapshot,
    SnapshotContent,
};
pub use snapshots::{
    InMemorySnapshotManager, ProxyRecord, SnapshotChildren, SnapshotCriteria, SnapshotManager,
    SnapshotPageProxy,
};
pub use transformer::{JsonTransformer, Transformer};
