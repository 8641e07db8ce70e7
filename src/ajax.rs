//! Single-block fetch: resolve a block through the selected CMS manager and
//! render it. Transport-agnostic; a web layer maps `RenderedBlock` to a response.

use std::rc::Rc;

use anyhow::Result;
use log::debug;
use serde_json::{Map, Value};

use crate::cms::CmsManager;
use crate::error::SnapshotError;
use crate::model::{Block, BlockId, PageId};

/// Picks the CMS manager for the current request (snapshot vs. editor view).
pub trait CmsManagerSelector {
    fn retrieve(&self) -> Result<Rc<dyn CmsManager>>;
}

pub trait BlockContextManager {
    fn context(&self, block: &Block) -> Result<BlockContext>;
}

pub trait BlockRenderer {
    fn render(&self, context: &BlockContext) -> Result<String>;
}

/// A block plus the settings it renders with.
#[derive(Debug, Clone)]
pub struct BlockContext {
    pub block: Block,
    pub settings: Map<String, Value>,
}

impl BlockContext {
    /// Context with the block's own settings.
    pub fn new(block: Block) -> Self {
        let settings = block.settings();
        Self { block, settings }
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }
}

/// Rendered output. Block fragments are never shared-cacheable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub body: String,
    pub private: bool,
}

pub struct BlockFetchHandler {
    selector: Rc<dyn CmsManagerSelector>,
    renderer: Rc<dyn BlockRenderer>,
    contexts: Rc<dyn BlockContextManager>,
}

impl BlockFetchHandler {
    pub fn new(
        selector: Rc<dyn CmsManagerSelector>,
        renderer: Rc<dyn BlockRenderer>,
        contexts: Rc<dyn BlockContextManager>,
    ) -> Self {
        Self {
            selector,
            renderer,
            contexts,
        }
    }

    pub fn execute(&self, page_id: PageId, block_id: BlockId) -> Result<RenderedBlock> {
        let cms = self.selector.retrieve()?;
        let block = cms
            .block(block_id)
            .ok_or(SnapshotError::BlockNotFound(block_id))?;

        let context = self.contexts.context(&block)?;
        let body = self.renderer.render(&context)?;
        debug!(
            "ajax: rendered block {} for page {} ({} bytes)",
            block_id,
            page_id,
            body.len()
        );
        Ok(RenderedBlock {
            body,
            private: true,
        })
    }
}

/// Context manager that uses the block's stored settings as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBlockContextManager;

impl BlockContextManager for DefaultBlockContextManager {
    fn context(&self, block: &Block) -> Result<BlockContext> {
        Ok(BlockContext::new(block.clone()))
    }
}
