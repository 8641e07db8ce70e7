//! Page-shaped domain model:
//! - page.rs: Page (shared handle over PageRecord), flags, headers, live parent chain.
//! - block.rs: Block (shared handle over BlockRecord), weak page back-reference.
//! - site.rs: Site record.
//! - snapshot.rs: Snapshot, SnapshotContent, BlockDescriptor.
//! - handle.rs: PageHandle / WeakPageHandle, ParentLevel, PageChildren.
//! - page_like.rs: PageLike, the full page contract shared by live pages and snapshot proxies.

mod block;
mod handle;
mod page;
mod page_like;
mod site;
mod snapshot;

pub use block::{Block, BlockRecord};
pub use handle::{PageChildren, PageHandle, ParentLevel, WeakPageHandle};
pub use page::{Page, PageRecord, REQUEST_METHODS};
pub use page_like::PageLike;
pub use site::Site;
pub use snapshot::{BlockDescriptor, Snapshot, SnapshotContent};

pub type PageId = u64;
pub type SnapshotId = u64;
pub type BlockId = u64;
pub type SiteId = u64;
