//! Snapshots JSON file.
//!
//! Format:
//! {
//!   "snapshots": [
//!     {"id": 9, "page_id": 5, "enabled": true, "url": "/", "content": {...}},
//!     ...
//!   ]
//! }
//!
//! Writes are atomic via tmp+rename.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::model::Snapshot;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
}

/// Read snapshots from `path`. A missing file is an empty set.
pub(crate) fn load_snapshots(path: &Path) -> Result<Vec<Snapshot>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let file: SnapshotFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse snapshots file {}", path.display()))?;
    Ok(file.snapshots)
}

pub(crate) fn save_snapshots(path: &Path, snapshots: &[Snapshot]) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
    }
    let mut tmp_os = path.as_os_str().to_owned();
    tmp_os.push(".tmp");
    let tmp = Path::new(&tmp_os);

    let mut f = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(tmp)
        .with_context(|| format!("open {}", tmp.display()))?;

    let file = SnapshotFile {
        snapshots: snapshots.to_vec(),
    };
    let data = serde_json::to_vec_pretty(&file).context("serialize snapshots file")?;
    f.write_all(&data)?;
    let _ = f.sync_all();

    fs::rename(tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
