// tests/ajax_fetch.rs
//
// Run only this file:
//   cargo test --test ajax_fetch -- --nocapture
//
// Covers:
// 1) Unknown block: the selector is asked once, BlockNotFound is returned.
// 2) Known block: context and renderer are each called once, output is private.
// 3) End to end over SnapshotCmsManager with the default context manager.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use serde_json::json;

use pagesnap::ajax::{
    BlockContext, BlockContextManager, BlockFetchHandler, BlockRenderer, CmsManagerSelector,
    DefaultBlockContextManager, RenderedBlock,
};
use pagesnap::cms::{CmsManager, SnapshotCmsManager};
use pagesnap::model::{BlockId, PageHandle, PageId};
use pagesnap::{
    Block, InMemorySnapshotManager, JsonTransformer, Snapshot, SnapshotContent, SnapshotError,
};

struct StubCms {
    block: Option<Block>,
    lookups: Cell<usize>,
}

impl CmsManager for StubCms {
    fn page_by_id(&self, id: PageId) -> Result<PageHandle> {
        Err(SnapshotError::PageNotFound(id).into())
    }

    fn block(&self, _id: BlockId) -> Option<Block> {
        self.lookups.set(self.lookups.get() + 1);
        self.block.clone()
    }
}

struct StubSelector {
    cms: Rc<dyn CmsManager>,
    calls: Cell<usize>,
}

impl CmsManagerSelector for StubSelector {
    fn retrieve(&self) -> Result<Rc<dyn CmsManager>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.cms.clone())
    }
}

#[derive(Default)]
struct CountingContexts {
    calls: Cell<usize>,
}

impl BlockContextManager for CountingContexts {
    fn context(&self, block: &Block) -> Result<BlockContext> {
        self.calls.set(self.calls.get() + 1);
        Ok(BlockContext::new(block.clone()))
    }
}

/// Renders `<name>:<content setting>`.
#[derive(Default)]
struct TextRenderer {
    calls: Cell<usize>,
}

impl BlockRenderer for TextRenderer {
    fn render(&self, context: &BlockContext) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        let content = context
            .setting("content")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        Ok(format!(
            "{}:{}",
            context.block.name().unwrap_or_default(),
            content
        ))
    }
}

#[test]
fn unknown_block_is_not_found() -> Result<()> {
    let cms = Rc::new(StubCms {
        block: None,
        lookups: Cell::new(0),
    });
    let selector = Rc::new(StubSelector {
        cms: cms.clone(),
        calls: Cell::new(0),
    });
    let renderer = Rc::new(TextRenderer::default());
    let contexts = Rc::new(CountingContexts::default());
    let handler = BlockFetchHandler::new(selector.clone(), renderer.clone(), contexts.clone());

    let err = handler.execute(10, 12).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SnapshotError>(),
        Some(SnapshotError::BlockNotFound(12))
    ));
    assert_eq!(err.to_string(), "Unable to find block identified by \"12\".");

    assert_eq!(selector.calls.get(), 1);
    assert_eq!(cms.lookups.get(), 1);
    assert_eq!(contexts.calls.get(), 0);
    assert_eq!(renderer.calls.get(), 0);
    Ok(())
}

#[test]
fn known_block_is_rendered_privately() -> Result<()> {
    let block = Block::new();
    block.set_name("teaser".to_string());
    block.set_setting("content", json!("hi"));

    let cms = Rc::new(StubCms {
        block: Some(block),
        lookups: Cell::new(0),
    });
    let selector = Rc::new(StubSelector {
        cms: cms.clone(),
        calls: Cell::new(0),
    });
    let renderer = Rc::new(TextRenderer::default());
    let contexts = Rc::new(CountingContexts::default());
    let handler = BlockFetchHandler::new(selector.clone(), renderer.clone(), contexts.clone());

    let out = handler.execute(10, 12)?;
    assert_eq!(
        out,
        RenderedBlock {
            body: "teaser:hi".into(),
            private: true
        }
    );
    assert_eq!(selector.calls.get(), 1);
    assert_eq!(cms.lookups.get(), 1);
    assert_eq!(contexts.calls.get(), 1);
    assert_eq!(renderer.calls.get(), 1);
    Ok(())
}

#[test]
fn fetch_from_snapshot_pages() -> Result<()> {
    let snap = Snapshot::new(
        10,
        1,
        SnapshotContent::from_value(json!({
            "id": 1,
            "name": "Home",
            "blocks": [
                {"id": 100, "name": "main", "type": "sonata.page.block.container", "blocks": [
                    {"id": 101, "name": "intro", "type": "sonata.block.service.text",
                     "settings": {"content": "Welcome"}}
                ]}
            ]
        }))?,
    );
    let snapshot_cms = Rc::new(SnapshotCmsManager::new(
        Rc::new(InMemorySnapshotManager::from_snapshots(vec![snap])),
        Rc::new(JsonTransformer::new()),
    ));
    snapshot_cms.page(1)?;

    let selector = Rc::new(StubSelector {
        cms: snapshot_cms,
        calls: Cell::new(0),
    });
    let handler = BlockFetchHandler::new(
        selector,
        Rc::new(TextRenderer::default()),
        Rc::new(DefaultBlockContextManager),
    );

    assert_eq!(handler.execute(1, 101)?.body, "intro:Welcome");
    assert!(handler.execute(1, 999).is_err());
    Ok(())
}
