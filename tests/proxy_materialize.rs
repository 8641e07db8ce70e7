// tests/proxy_materialize.rs
//
// Run only this file:
//   cargo test --test proxy_materialize -- --nocapture
//
// Covers:
// 1) Nothing is materialized at construction; the first accessor loads the page.
// 2) The transformer runs at most once however many accessors are used.
// 3) Setters write through to the materialized page.
// 4) Display: page name, or "-" when unnamed or when loading fails.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use serde_json::json;

use pagesnap::model::{Block, BlockDescriptor, PageHandle};
use pagesnap::{
    InMemorySnapshotManager, JsonTransformer, Page, PageLike, Snapshot, SnapshotContent,
    SnapshotManager, SnapshotPageProxy, Transformer,
};

struct CountingTransformer {
    inner: JsonTransformer,
    loads: Cell<usize>,
}

impl CountingTransformer {
    fn new() -> Self {
        Self {
            inner: JsonTransformer::new(),
            loads: Cell::new(0),
        }
    }
}

impl Transformer for CountingTransformer {
    fn load(&self, snapshot: &Snapshot) -> Result<Page> {
        self.loads.set(self.loads.get() + 1);
        self.inner.load(snapshot)
    }

    fn load_block(&self, descriptor: &BlockDescriptor, owner: &PageHandle) -> Result<Block> {
        self.inner.load_block(descriptor, owner)
    }
}

struct FailingTransformer;

impl Transformer for FailingTransformer {
    fn load(&self, snapshot: &Snapshot) -> Result<Page> {
        Err(anyhow!("snapshot {} is corrupt", snapshot.id))
    }

    fn load_block(&self, _descriptor: &BlockDescriptor, _owner: &PageHandle) -> Result<Block> {
        Err(anyhow!("no blocks"))
    }
}

fn snapshot(id: u64, page_id: u64, content: serde_json::Value) -> Result<Snapshot> {
    Ok(Snapshot::new(id, page_id, SnapshotContent::from_value(content)?))
}

fn manager(snapshots: Vec<Snapshot>) -> Option<Rc<dyn SnapshotManager>> {
    Some(Rc::new(InMemorySnapshotManager::from_snapshots(snapshots)) as Rc<dyn SnapshotManager>)
}

#[test]
fn page_is_materialized_once_on_first_access() -> Result<()> {
    let s = snapshot(
        10,
        1,
        json!({
            "id": 1,
            "name": "Home",
            "title": "Welcome",
            "url": "/",
            "route_name": "page_slug",
            "enabled": true,
            "position": 3,
            "request_method": "GET|POST",
        }),
    )?;
    let t = Rc::new(CountingTransformer::new());
    let proxy = SnapshotPageProxy::new(manager(vec![s.clone()]), t.clone(), s);

    assert_eq!(t.loads.get(), 0, "construction must not materialize");
    assert!(!proxy.is_loaded());

    assert_eq!(proxy.id()?, Some(1));
    assert_eq!(proxy.name()?.as_deref(), Some("Home"));
    assert_eq!(proxy.title()?.as_deref(), Some("Welcome"));
    assert_eq!(proxy.url()?.as_deref(), Some("/"));
    assert_eq!(proxy.position()?, 3);
    assert!(proxy.enabled()?);
    assert!(proxy.is_cms()?);
    assert!(proxy.has_request_method("post")?);
    assert!(!proxy.has_request_method("DELETE")?);

    assert_eq!(t.loads.get(), 1, "transformer must run exactly once");
    assert!(proxy.is_loaded());

    // page() hands out the same materialized page
    let a = proxy.page()?;
    let b = proxy.page()?;
    assert!(Page::ptr_eq(&a, &b));
    assert_eq!(t.loads.get(), 1);
    Ok(())
}

#[test]
fn relation_lookups_do_not_materialize() -> Result<()> {
    let s = snapshot(10, 2, json!({"name": "About", "parent_id": 1, "target_id": 3}))?;
    let t = Rc::new(CountingTransformer::new());
    let proxy = SnapshotPageProxy::new(manager(vec![s.clone()]), t.clone(), s);

    assert!(proxy.target()?.is_none());
    assert!(proxy.parents()?.is_empty());
    assert_eq!(t.loads.get(), 0);
    Ok(())
}

#[test]
fn setters_write_through_to_materialized_page() -> Result<()> {
    let s = snapshot(10, 1, json!({"name": "Old"}))?;
    let t = Rc::new(CountingTransformer::new());
    let proxy = SnapshotPageProxy::new(manager(vec![s.clone()]), t.clone(), s);

    proxy.set_name("New".to_string())?;
    proxy.set_slug(Some("new".to_string()))?;
    proxy.set_enabled(false)?;
    proxy.add_header("Cache-Control", "no-cache")?;

    assert_eq!(proxy.name()?.as_deref(), Some("New"));
    assert_eq!(proxy.slug()?.as_deref(), Some("new"));
    assert!(!proxy.enabled()?);
    assert_eq!(
        proxy.headers()?.get("Cache-Control").map(String::as_str),
        Some("no-cache")
    );
    assert_eq!(proxy.page()?.name().as_deref(), Some("New"));

    // the snapshot itself is untouched
    assert_eq!(proxy.snapshot().content().get("name"), Some(&json!("Old")));
    assert_eq!(t.loads.get(), 1);
    Ok(())
}

#[test]
fn display_uses_page_name_or_dash() -> Result<()> {
    let named = snapshot(10, 1, json!({"name": "Contact"}))?;
    let unnamed = snapshot(11, 2, json!({}))?;
    let t: Rc<dyn Transformer> = Rc::new(JsonTransformer::new());

    let p1 = SnapshotPageProxy::new(None, t.clone(), named);
    let p2 = SnapshotPageProxy::new(None, t, unnamed);
    assert_eq!(p1.to_string(), "Contact");
    assert_eq!(p1.display_name()?, "Contact");
    assert_eq!(p2.to_string(), "-");
    Ok(())
}

#[test]
fn transformer_failure_propagates_and_display_degrades() -> Result<()> {
    let s = snapshot(10, 1, json!({"name": "Broken"}))?;
    let proxy = SnapshotPageProxy::new(None, Rc::new(FailingTransformer), s);

    let err = proxy.name().unwrap_err();
    assert!(format!("{:#}", err).contains("corrupt"));
    assert_eq!(proxy.to_string(), "-");
    assert!(!proxy.is_loaded());
    Ok(())
}
