// tests/config_builder.rs
//
// Covers PageSnapConfig defaults, env overrides and the fluent builder, plus
// the depth limit actually reaching proxies created for parents.

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use serde_json::json;

use pagesnap::config::DEFAULT_MAX_PARENT_DEPTH;
use pagesnap::{
    InMemorySnapshotManager, JsonTransformer, PageLike, PageSnapConfig, Snapshot,
    SnapshotContent, SnapshotManager, SnapshotPageProxy,
};

#[test]
fn defaults_and_builder() {
    let cfg = PageSnapConfig::default();
    assert_eq!(cfg.max_parent_depth, DEFAULT_MAX_PARENT_DEPTH);
    assert!(cfg.snapshots_path.is_none());
    assert!(cfg.site_id.is_none());

    let cfg = PageSnapConfig::default()
        .with_max_parent_depth(5)
        .with_snapshots_path(Some("/tmp/snaps.json"))
        .with_site_id(Some(3))
        .build();
    assert_eq!(cfg.max_parent_depth, 5);
    assert_eq!(cfg.snapshots_path, Some(PathBuf::from("/tmp/snaps.json")));
    assert_eq!(cfg.site_id, Some(3));
    assert!(cfg.to_string().contains("max_parent_depth: 5"));
}

#[test]
fn env_overrides() {
    std::env::set_var("PS_MAX_PARENT_DEPTH", "7");
    std::env::set_var("PS_SNAPSHOTS_PATH", "/srv/snapshots.json");
    std::env::set_var("PS_SITE_ID", "not-a-number");

    let cfg = PageSnapConfig::from_env();
    assert_eq!(cfg.max_parent_depth, 7);
    assert_eq!(cfg.snapshots_path, Some(PathBuf::from("/srv/snapshots.json")));
    assert_eq!(cfg.site_id, None, "unparsable values keep the default");

    std::env::remove_var("PS_MAX_PARENT_DEPTH");
    std::env::remove_var("PS_SNAPSHOTS_PATH");
    std::env::remove_var("PS_SITE_ID");
}

#[test]
fn depth_limit_is_shared_with_related_proxies() -> Result<()> {
    // 5 -> 4 -> 3 -> 2 -> 1
    let mut snaps = Vec::new();
    for id in 1..=5u64 {
        let parent = if id > 1 { Some(id - 1) } else { None };
        snaps.push(Snapshot::new(
            id * 10,
            id,
            SnapshotContent::from_value(json!({"id": id, "parent_id": parent}))?,
        ));
    }
    let leaf = snaps[4].clone();
    let m: Rc<dyn SnapshotManager> = Rc::new(InMemorySnapshotManager::from_snapshots(snaps));
    let cfg = Rc::new(PageSnapConfig::default().with_max_parent_depth(2));
    let p = SnapshotPageProxy::with_config(Some(m), Rc::new(JsonTransformer::new()), leaf, cfg.clone());

    let parents = p.parents()?;
    assert_eq!(parents.len(), 2);

    // the nearest parent (page 4) climbs with the same limit
    let direct = parents[1]
        .as_snapshot()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("snapshot parent"))?;
    assert!(Rc::ptr_eq(direct.config(), &cfg));
    assert_eq!(direct.parents()?.len(), 2);
    Ok(())
}
