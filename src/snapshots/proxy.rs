//! SnapshotPageProxy: a page reconstructed lazily from snapshot content.
//!
//! The proxy wraps a published `Snapshot` and answers the whole `PageLike`
//! contract. Nothing is built up front:
//! - the page is materialized through the transformer on first access (once);
//! - the target is resolved through the manager on first `target()` call and
//!   cached, including a definitive "no target";
//! - the ancestor chain is climbed once via `parent_id` links and cached root first;
//! - blocks are materialized from content the first time the page has none;
//! - children are installed as a deferred collection.
//!
//! Proxies are request-scoped and single-threaded (`Rc` + `RefCell`). Related
//! proxies (parents, target, children) are new instances sharing the manager,
//! transformer and config; each materializes its own page independently.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use anyhow::Result;
use log::{debug, warn};
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Serialize, Serializer};

use crate::config::PageSnapConfig;
use crate::error::SnapshotError;
use crate::metrics::{
    record_blocks_materialized, record_children_installed, record_materialization,
    record_parent_lookup, record_target_lookup,
};
use crate::model::{
    Block, Page, PageChildren, PageHandle, PageId, PageLike, ParentLevel, Snapshot, SnapshotId,
};
use crate::transformer::Transformer;

use super::children::SnapshotChildren;
use super::manager::{SnapshotCriteria, SnapshotManager};

#[derive(Clone)]
enum TargetState {
    Unresolved,
    Absent,
    Present(PageHandle),
}

pub struct SnapshotPageProxy {
    manager: Option<Rc<dyn SnapshotManager>>,
    transformer: Rc<dyn Transformer>,
    snapshot: Snapshot,
    config: Rc<PageSnapConfig>,
    this: Weak<SnapshotPageProxy>,

    // lazy state
    page: RefCell<Option<Page>>,
    target: RefCell<TargetState>,
    parents: RefCell<Option<Vec<PageHandle>>>,
}

/// Compact serialized form: `{"pageId": .., "snapshotId": ..}` or `{}`.
/// A record with a snapshot but no page id keeps both keys (`"pageId": null`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProxyRecord {
    #[serde(rename = "pageId", default)]
    pub page_id: Option<PageId>,
    #[serde(rename = "snapshotId", default)]
    pub snapshot_id: Option<SnapshotId>,
}

impl Serialize for ProxyRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_empty() {
            return serializer.serialize_map(Some(0))?.end();
        }
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("pageId", &self.page_id)?;
        map.serialize_entry("snapshotId", &self.snapshot_id)?;
        map.end()
    }
}

impl ProxyRecord {
    pub fn is_empty(&self) -> bool {
        self.page_id.is_none() && self.snapshot_id.is_none()
    }
}

impl SnapshotPageProxy {
    pub fn new(
        manager: Option<Rc<dyn SnapshotManager>>,
        transformer: Rc<dyn Transformer>,
        snapshot: Snapshot,
    ) -> Rc<Self> {
        Self::with_config(manager, transformer, snapshot, Rc::new(PageSnapConfig::default()))
    }

    pub fn with_config(
        manager: Option<Rc<dyn SnapshotManager>>,
        transformer: Rc<dyn Transformer>,
        snapshot: Snapshot,
        config: Rc<PageSnapConfig>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            manager,
            transformer,
            snapshot,
            config,
            this: this.clone(),
            page: RefCell::new(None),
            target: RefCell::new(TargetState::Unresolved),
            parents: RefCell::new(None),
        })
    }

    /// New proxy for a related snapshot, sharing manager, transformer and config.
    fn wrap(&self, snapshot: Snapshot) -> Rc<Self> {
        Self::with_config(
            self.manager.clone(),
            self.transformer.clone(),
            snapshot,
            self.config.clone(),
        )
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn manager(&self) -> Option<&Rc<dyn SnapshotManager>> {
        self.manager.as_ref()
    }

    pub fn transformer(&self) -> &Rc<dyn Transformer> {
        &self.transformer
    }

    pub fn config(&self) -> &Rc<PageSnapConfig> {
        &self.config
    }

    /// Whether the page has been materialized already.
    pub fn is_loaded(&self) -> bool {
        self.page.borrow().is_some()
    }

    /// This proxy as a `PageHandle` (what blocks and children point back to).
    pub fn handle(&self) -> Result<PageHandle> {
        self.this
            .upgrade()
            .map(PageHandle::Snapshot)
            .ok_or_else(|| SnapshotError::OwnerDropped.into())
    }

    fn load(&self) -> Result<Page> {
        if let Some(page) = self.page.borrow().as_ref() {
            return Ok(page.clone());
        }
        // no borrow is held across the transformer call
        let page = self.transformer.load(&self.snapshot)?;
        record_materialization();
        debug!(
            "proxy: materialized page {:?} from snapshot {}",
            page.id(),
            self.snapshot.id
        );
        *self.page.borrow_mut() = Some(page.clone());
        Ok(page)
    }

    fn resolve_target(&self) -> Result<Option<PageHandle>> {
        let target_id = match self.snapshot.content().target_id() {
            Some(id) => id,
            None => return Ok(None),
        };
        let manager = match &self.manager {
            Some(m) => m,
            None => return Ok(None),
        };

        record_target_lookup();
        debug!("proxy: snapshot {} looks up target page {}", self.snapshot.id, target_id);
        match manager.find_enabled_snapshot(&SnapshotCriteria::page(target_id))? {
            Some(snapshot) => Ok(Some(PageHandle::Snapshot(self.wrap(snapshot)))),
            None => {
                debug!("proxy: target page {} has no enabled snapshot", target_id);
                Ok(None)
            }
        }
    }

    /// Climb `parent_id` links. A missing snapshot, a repeated page id or the
    /// depth limit ends the climb; the chain collected so far is the result.
    fn resolve_parents(&self) -> Result<Vec<PageHandle>> {
        let mut nearest_first: Vec<PageHandle> = Vec::new();
        let manager = match &self.manager {
            Some(m) => m,
            None => return Ok(nearest_first),
        };

        let mut visited: HashSet<PageId> = self.snapshot.page_id.into_iter().collect();
        let mut next = self.snapshot.content().parent_id();

        while let Some(parent_id) = next {
            if nearest_first.len() >= self.config.max_parent_depth {
                warn!(
                    "proxy: snapshot {} parent chain cut at depth {}",
                    self.snapshot.id, self.config.max_parent_depth
                );
                break;
            }
            if !visited.insert(parent_id) {
                warn!(
                    "proxy: snapshot {} parent chain loops back to page {}",
                    self.snapshot.id, parent_id
                );
                break;
            }

            record_parent_lookup();
            let snapshot = match manager.find_enabled_snapshot(&SnapshotCriteria::page(parent_id))? {
                Some(s) => s,
                None => {
                    debug!(
                        "proxy: snapshot {} parent page {} has no enabled snapshot, chain ends",
                        self.snapshot.id, parent_id
                    );
                    break;
                }
            };
            next = snapshot.content().parent_id();
            nearest_first.push(PageHandle::Snapshot(self.wrap(snapshot)));
        }

        nearest_first.reverse();
        Ok(nearest_first)
    }

    /// Compact record; materializes the page to read its id.
    pub fn to_record(&self) -> Result<ProxyRecord> {
        if self.manager.is_none() {
            return Ok(ProxyRecord::default());
        }
        Ok(ProxyRecord {
            page_id: self.load()?.id(),
            snapshot_id: Some(self.snapshot.id),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record()?)?)
    }

    /// Restoring a proxy needs a fresh lookup by page/snapshot id, which is
    /// the caller's job (see `SnapshotCmsManager::restore`).
    pub fn unserialize(&self, _serialized: &str) -> Result<()> {
        Err(SnapshotError::UnsupportedOperation("SnapshotPageProxy::unserialize").into())
    }
}

impl PageLike for SnapshotPageProxy {
    fn page(&self) -> Result<Page> {
        self.load()
    }

    fn target(&self) -> Result<Option<PageHandle>> {
        let state = self.target.borrow().clone();
        match state {
            TargetState::Present(t) => return Ok(Some(t)),
            TargetState::Absent => return Ok(None),
            TargetState::Unresolved => {}
        }

        let resolved = self.resolve_target()?;
        *self.target.borrow_mut() = match &resolved {
            Some(t) => TargetState::Present(t.clone()),
            None => TargetState::Absent,
        };
        Ok(resolved)
    }

    /// Pre-seeds the target; `None` pins "no target".
    fn set_target(&self, target: Option<PageHandle>) -> Result<()> {
        *self.target.borrow_mut() = match target {
            Some(t) => TargetState::Present(t),
            None => TargetState::Absent,
        };
        Ok(())
    }

    fn parent(&self, level: ParentLevel) -> Result<Option<PageHandle>> {
        Ok(level.pick(&self.parents()?))
    }

    fn parents(&self) -> Result<Vec<PageHandle>> {
        if let Some(parents) = self.parents.borrow().as_ref() {
            return Ok(parents.clone());
        }
        let chain = self.resolve_parents()?;
        *self.parents.borrow_mut() = Some(chain.clone());
        Ok(chain)
    }

    fn set_parents(&self, parents: Vec<PageHandle>) -> Result<()> {
        *self.parents.borrow_mut() = Some(parents);
        Ok(())
    }

    fn children(&self) -> Result<PageChildren> {
        let page = self.load()?;
        if !page.children().is_populated() {
            page.set_children(PageChildren::Deferred(SnapshotChildren::new(
                self.transformer.clone(),
                self.this.clone(),
            )));
            record_children_installed();
        }
        Ok(page.children())
    }

    fn blocks(&self) -> Result<Vec<Block>> {
        let page = self.load()?;
        if !page.has_blocks() {
            let owner = self.handle()?;
            let descriptors = self.snapshot.content().blocks()?;
            // all or nothing: a failed load leaves the page empty for the next call
            let loaded = descriptors
                .iter()
                .map(|d| self.transformer.load_block(d, &owner))
                .collect::<Result<Vec<Block>>>()?;
            for block in loaded {
                block.set_page(Some(&owner));
                page.add_blocks(block);
            }
            record_blocks_materialized(descriptors.len());
            debug!(
                "proxy: snapshot {} materialized {} block(s)",
                self.snapshot.id,
                descriptors.len()
            );
        }
        Ok(page.blocks())
    }
}

impl Serialize for SnapshotPageProxy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_record()
            .map_err(|e| S::Error::custom(format!("{:#}", e)))?
            .serialize(serializer)
    }
}

impl fmt::Display for SnapshotPageProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.load() {
            Ok(page) => write!(f, "{}", page),
            Err(e) => {
                warn!("proxy: snapshot {} failed to load for display: {:#}", self.snapshot.id, e);
                f.write_str("-")
            }
        }
    }
}

impl fmt::Debug for SnapshotPageProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotPageProxy")
            .field("snapshot_id", &self.snapshot.id)
            .field("page_id", &self.snapshot.page_id)
            .field("loaded", &self.is_loaded())
            .field("has_manager", &self.manager.is_some())
            .finish()
    }
}
