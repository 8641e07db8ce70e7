//! Typed errors for the snapshot page layer.
//!
//! Most APIs return `anyhow::Result`; the variants below are the failures a
//! caller may want to match on (via `err.downcast_ref::<SnapshotError>()`).

use thiserror::Error;

use crate::model::{BlockId, PageId};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
    #[error("invalid snapshot content: {0}")]
    InvalidContent(String),
    #[error("owning page proxy is gone")]
    OwnerDropped,
    #[error("Unable to find block identified by \"{0}\".")]
    BlockNotFound(BlockId),
    #[error("Unable to find page identified by \"{0}\".")]
    PageNotFound(PageId),
}

/// True when `err` carries `SnapshotError::UnsupportedOperation`.
pub fn is_unsupported(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<SnapshotError>(),
        Some(SnapshotError::UnsupportedOperation(_))
    )
}
