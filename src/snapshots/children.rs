//! Lazy children collection for snapshot pages.
//!
//! Installed by `SnapshotPageProxy::children()`. Enumeration happens on first
//! access: the owner's manager is asked for enabled child snapshots and each is
//! wrapped in a proxy. Clones share the loaded list.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::Result;
use log::debug;

use crate::error::SnapshotError;
use crate::model::{PageHandle, PageLike};
use crate::transformer::Transformer;

use super::proxy::SnapshotPageProxy;

#[derive(Clone)]
pub struct SnapshotChildren {
    inner: Rc<ChildrenInner>,
}

struct ChildrenInner {
    transformer: Rc<dyn Transformer>,
    // weak: the owner's page holds this collection
    owner: Weak<SnapshotPageProxy>,
    loaded: RefCell<Option<Vec<PageHandle>>>,
}

impl SnapshotChildren {
    pub fn new(transformer: Rc<dyn Transformer>, owner: Weak<SnapshotPageProxy>) -> Self {
        Self {
            inner: Rc::new(ChildrenInner {
                transformer,
                owner,
                loaded: RefCell::new(None),
            }),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.borrow().is_some()
    }

    /// Child pages in manager order; enumerated once.
    pub fn load(&self) -> Result<Vec<PageHandle>> {
        if let Some(children) = self.inner.loaded.borrow().as_ref() {
            return Ok(children.clone());
        }

        let owner = self.inner.owner.upgrade().ok_or(SnapshotError::OwnerDropped)?;
        let mut children: Vec<PageHandle> = Vec::new();
        if let (Some(manager), Some(page_id)) = (owner.manager(), owner.id()?) {
            for snapshot in manager.find_enabled_children(page_id)? {
                let child = SnapshotPageProxy::with_config(
                    Some(manager.clone()),
                    self.inner.transformer.clone(),
                    snapshot,
                    owner.config().clone(),
                );
                children.push(PageHandle::Snapshot(child));
            }
            debug!("children: page {} has {} child snapshot(s)", page_id, children.len());
        }

        *self.inner.loaded.borrow_mut() = Some(children.clone());
        Ok(children)
    }

    /// Appends after enumerating, so the explicit child joins the loaded list.
    pub fn push(&self, child: PageHandle) -> Result<()> {
        self.load()?;
        if let Some(children) = self.inner.loaded.borrow_mut().as_mut() {
            children.push(child);
        }
        Ok(())
    }
}
