//! CMS manager over published snapshots.
//!
//! `SnapshotCmsManager` turns page ids/urls into snapshot proxies, keeps them
//! for the lifetime of the manager (one request) and indexes every block of a
//! loaded page by id so `block(id)` can answer without a page reference.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use log::{debug, info};

use crate::config::PageSnapConfig;
use crate::error::SnapshotError;
use crate::model::{Block, BlockId, PageHandle, PageId, PageLike};
use crate::snapshots::{ProxyRecord, SnapshotCriteria, SnapshotManager, SnapshotPageProxy};
use crate::transformer::Transformer;

/// What the block fetch path needs from a CMS manager.
pub trait CmsManager {
    fn page_by_id(&self, id: PageId) -> Result<PageHandle>;

    /// Blocks of pages this manager has loaded; `None` for anything else.
    fn block(&self, id: BlockId) -> Option<Block>;
}

pub struct SnapshotCmsManager {
    manager: Rc<dyn SnapshotManager>,
    transformer: Rc<dyn Transformer>,
    config: Rc<PageSnapConfig>,
    pages: RefCell<HashMap<PageId, Rc<SnapshotPageProxy>>>,
    blocks: RefCell<HashMap<BlockId, Block>>,
}

impl SnapshotCmsManager {
    pub fn new(manager: Rc<dyn SnapshotManager>, transformer: Rc<dyn Transformer>) -> Self {
        Self::with_config(manager, transformer, PageSnapConfig::default())
    }

    pub fn with_config(
        manager: Rc<dyn SnapshotManager>,
        transformer: Rc<dyn Transformer>,
        config: PageSnapConfig,
    ) -> Self {
        Self {
            manager,
            transformer,
            config: Rc::new(config),
            pages: RefCell::new(HashMap::new()),
            blocks: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &PageSnapConfig {
        &self.config
    }

    /// Proxy for the enabled snapshot of page `id`. Cached per manager.
    pub fn page(&self, id: PageId) -> Result<Rc<SnapshotPageProxy>> {
        if let Some(proxy) = self.pages.borrow().get(&id) {
            return Ok(proxy.clone());
        }
        let criteria = SnapshotCriteria::page(id).with_site(self.config.site_id);
        let proxy = self.load(&criteria)?.ok_or(SnapshotError::PageNotFound(id))?;
        Ok(proxy)
    }

    /// Proxy for the enabled snapshot published at `url`, if any.
    pub fn page_by_url(&self, url: &str) -> Result<Option<Rc<SnapshotPageProxy>>> {
        let criteria = SnapshotCriteria::url(url).with_site(self.config.site_id);
        self.load(&criteria)
    }

    /// Re-resolve a serialized proxy record. Empty records resolve to nothing.
    pub fn restore(&self, record: &ProxyRecord) -> Result<Option<Rc<SnapshotPageProxy>>> {
        match record.page_id {
            Some(id) => match self.page(id) {
                Ok(proxy) => Ok(Some(proxy)),
                Err(e) if matches!(
                    e.downcast_ref::<SnapshotError>(),
                    Some(SnapshotError::PageNotFound(_))
                ) =>
                {
                    Ok(None)
                }
                Err(e) => Err(e),
            },
            None => Ok(None),
        }
    }

    pub fn loaded_pages(&self) -> usize {
        self.pages.borrow().len()
    }

    fn load(&self, criteria: &SnapshotCriteria) -> Result<Option<Rc<SnapshotPageProxy>>> {
        let snapshot = match self.manager.find_enabled_snapshot(criteria)? {
            Some(s) => s,
            None => {
                debug!("cms: no enabled snapshot for {:?}", criteria);
                return Ok(None);
            }
        };

        if let Some(cached) = snapshot.page_id.and_then(|id| self.pages.borrow().get(&id).cloned()) {
            return Ok(Some(cached));
        }

        let proxy = SnapshotPageProxy::with_config(
            Some(self.manager.clone()),
            self.transformer.clone(),
            snapshot,
            self.config.clone(),
        );
        self.index_blocks(&proxy)?;
        if let Some(id) = proxy.snapshot().page_id {
            self.pages.borrow_mut().insert(id, proxy.clone());
        }
        Ok(Some(proxy))
    }

    fn index_blocks(&self, proxy: &SnapshotPageProxy) -> Result<()> {
        let mut indexed = 0usize;
        let mut blocks = self.blocks.borrow_mut();
        for block in proxy.blocks()? {
            block.walk(&mut |b| {
                if let Some(id) = b.id() {
                    blocks.insert(id, b.clone());
                    indexed += 1;
                }
            });
        }
        info!(
            "cms: loaded page {:?} (snapshot {}), {} block(s) indexed",
            proxy.snapshot().page_id,
            proxy.snapshot().id,
            indexed
        );
        Ok(())
    }
}

impl CmsManager for SnapshotCmsManager {
    fn page_by_id(&self, id: PageId) -> Result<PageHandle> {
        Ok(PageHandle::Snapshot(self.page(id)?))
    }

    fn block(&self, id: BlockId) -> Option<Block> {
        self.blocks.borrow().get(&id).cloned()
    }
}
