// tests/snapshot_file.rs
//
// Run only this file:
//   cargo test --test snapshot_file -- --nocapture
//
// Covers:
// 1) InMemorySnapshotManager save/open roundtrip through a snapshots JSON file.
// 2) A missing file opens as an empty repository.
// 3) Publication windows and the "latest start wins" rule after reload.
// 4) Proxies built over a reopened file resolve parents and blocks.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use pagesnap::model::Site;
use pagesnap::{
    InMemorySnapshotManager, JsonTransformer, PageLike, Snapshot, SnapshotContent,
    SnapshotCriteria, SnapshotManager, SnapshotPageProxy,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("pagesnap-file-{prefix}-{pid}-{t}-{id}"))
}

fn snap(id: u64, page_id: u64, content: serde_json::Value) -> Result<Snapshot> {
    Ok(Snapshot::new(id, page_id, SnapshotContent::from_value(content)?))
}

#[test]
fn save_and_open_roundtrip() -> Result<()> {
    let root = unique_root("roundtrip");
    fs::create_dir_all(&root)?;
    let path = root.join("snapshots.json");

    let mut home = snap(10, 1, json!({"id": 1, "name": "Home", "url": "/"}))?;
    home.url = Some("/".into());
    home.site = Some(Site::new(1, "main"));
    let about = snap(
        20,
        2,
        json!({
            "id": 2,
            "name": "About",
            "parent_id": 1,
            "blocks": [{"id": 7, "name": "text", "type": "sonata.block.service.text"}]
        }),
    )?;

    let mut mgr = InMemorySnapshotManager::new();
    mgr.add(home);
    mgr.add(about);
    mgr.save(&path)?;
    assert!(path.exists());

    let reopened = InMemorySnapshotManager::open(&path)?;
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.snapshots(), mgr.snapshots());

    let by_url = reopened
        .find_enabled_snapshot(&SnapshotCriteria::url("/").with_site(Some(1)))?
        .ok_or_else(|| anyhow!("home by url"))?;
    assert_eq!(by_url.page_id, Some(1));

    let about = reopened
        .find_enabled_snapshot(&SnapshotCriteria::page(2))?
        .ok_or_else(|| anyhow!("about"))?;
    let m: Rc<dyn SnapshotManager> = Rc::new(reopened);
    let p = SnapshotPageProxy::new(Some(m), Rc::new(JsonTransformer::new()), about);
    let parents = p.parents()?;
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0].name()?.as_deref(), Some("Home"));
    assert_eq!(p.blocks()?.len(), 1);

    fs::remove_dir_all(&root)?;
    Ok(())
}

#[test]
fn missing_file_is_empty() -> Result<()> {
    let root = unique_root("missing");
    let mgr = InMemorySnapshotManager::open(&root.join("nope.json"))?;
    assert!(mgr.is_empty());
    assert!(mgr.find_enabled_snapshot(&SnapshotCriteria::page(1))?.is_none());
    Ok(())
}

#[test]
fn publication_window_after_reload() -> Result<()> {
    let root = unique_root("window");
    fs::create_dir_all(&root)?;
    let path = root.join("snapshots.json");

    let now = Utc
        .timestamp_opt(1_700_000_000, 0)
        .single()
        .ok_or_else(|| anyhow!("timestamp"))?;

    let mut old = snap(1, 5, json!({"name": "v1"}))?;
    old.publication_date_start = Some(now - Duration::days(10));
    let mut current = snap(2, 5, json!({"name": "v2"}))?;
    current.publication_date_start = Some(now - Duration::days(1));
    let mut future = snap(3, 5, json!({"name": "v3"}))?;
    future.publication_date_start = Some(now + Duration::days(1));
    let mut expired = snap(4, 6, json!({"name": "gone"}))?;
    expired.publication_date_end = Some(now - Duration::hours(1));
    let mut disabled = snap(5, 7, json!({"name": "off"}))?;
    disabled.enabled = false;

    InMemorySnapshotManager::from_snapshots(vec![old, current, future, expired, disabled])
        .save(&path)?;

    let mgr = InMemorySnapshotManager::open(&path)?.with_now(now);
    let live = mgr
        .find_enabled_snapshot(&SnapshotCriteria::page(5))?
        .ok_or_else(|| anyhow!("page 5"))?;
    assert_eq!(live.id, 2);
    assert!(mgr.find_enabled_snapshot(&SnapshotCriteria::page(6))?.is_none());
    assert!(mgr.find_enabled_snapshot(&SnapshotCriteria::page(7))?.is_none());

    fs::remove_dir_all(&root)?;
    Ok(())
}
