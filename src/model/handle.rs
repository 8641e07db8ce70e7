use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use anyhow::Result;

use crate::snapshots::{SnapshotChildren, SnapshotPageProxy};

use super::{Block, Page, PageLike, PageRecord};

/// Anything page-shaped: a live page or a snapshot proxy.
#[derive(Clone)]
pub enum PageHandle {
    Live(Page),
    Snapshot(Rc<SnapshotPageProxy>),
}

impl PageHandle {
    pub fn ptr_eq(a: &PageHandle, b: &PageHandle) -> bool {
        match (a, b) {
            (PageHandle::Live(x), PageHandle::Live(y)) => Page::ptr_eq(x, y),
            (PageHandle::Snapshot(x), PageHandle::Snapshot(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }

    pub fn downgrade(&self) -> WeakPageHandle {
        match self {
            PageHandle::Live(p) => WeakPageHandle::Live(p.downgrade()),
            PageHandle::Snapshot(s) => WeakPageHandle::Snapshot(Rc::downgrade(s)),
        }
    }

    pub fn as_live(&self) -> Option<&Page> {
        match self {
            PageHandle::Live(p) => Some(p),
            PageHandle::Snapshot(_) => None,
        }
    }

    pub fn as_snapshot(&self) -> Option<&Rc<SnapshotPageProxy>> {
        match self {
            PageHandle::Snapshot(s) => Some(s),
            PageHandle::Live(_) => None,
        }
    }
}

impl From<Page> for PageHandle {
    fn from(p: Page) -> Self {
        PageHandle::Live(p)
    }
}

impl From<Rc<SnapshotPageProxy>> for PageHandle {
    fn from(s: Rc<SnapshotPageProxy>) -> Self {
        PageHandle::Snapshot(s)
    }
}

// Relations dispatch to the proxy so its lazy resolution stays in effect.
impl PageLike for PageHandle {
    fn page(&self) -> Result<Page> {
        match self {
            PageHandle::Live(p) => Ok(p.clone()),
            PageHandle::Snapshot(s) => s.page(),
        }
    }

    fn target(&self) -> Result<Option<PageHandle>> {
        match self {
            PageHandle::Live(p) => Ok(p.target()),
            PageHandle::Snapshot(s) => s.target(),
        }
    }

    fn set_target(&self, target: Option<PageHandle>) -> Result<()> {
        match self {
            PageHandle::Live(p) => PageLike::set_target(p, target),
            PageHandle::Snapshot(s) => s.set_target(target),
        }
    }

    fn parent(&self, level: ParentLevel) -> Result<Option<PageHandle>> {
        match self {
            PageHandle::Live(p) => p.parent(level),
            PageHandle::Snapshot(s) => s.parent(level),
        }
    }

    fn parents(&self) -> Result<Vec<PageHandle>> {
        match self {
            PageHandle::Live(p) => p.parents(),
            PageHandle::Snapshot(s) => s.parents(),
        }
    }

    fn set_parents(&self, parents: Vec<PageHandle>) -> Result<()> {
        match self {
            PageHandle::Live(p) => PageLike::set_parents(p, parents),
            PageHandle::Snapshot(s) => s.set_parents(parents),
        }
    }

    fn children(&self) -> Result<PageChildren> {
        match self {
            PageHandle::Live(p) => Ok(p.children()),
            PageHandle::Snapshot(s) => s.children(),
        }
    }

    fn blocks(&self) -> Result<Vec<Block>> {
        match self {
            PageHandle::Live(p) => Ok(p.blocks()),
            PageHandle::Snapshot(s) => s.blocks(),
        }
    }
}

impl fmt::Debug for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageHandle::Live(p) => f.debug_tuple("Live").field(p).finish(),
            PageHandle::Snapshot(s) => f.debug_tuple("Snapshot").field(s).finish(),
        }
    }
}

/// Non-owning page reference (block -> page, children collection -> owner).
#[derive(Clone)]
pub enum WeakPageHandle {
    Live(Weak<RefCell<PageRecord>>),
    Snapshot(Weak<SnapshotPageProxy>),
}

impl WeakPageHandle {
    pub fn upgrade(&self) -> Option<PageHandle> {
        match self {
            WeakPageHandle::Live(w) => w.upgrade().map(|rc| PageHandle::Live(Page::from_rc(rc))),
            WeakPageHandle::Snapshot(w) => w.upgrade().map(PageHandle::Snapshot),
        }
    }
}

/// Addressing into an ancestor chain (root first).
///
/// `FromEnd(1)` is the direct parent. Conversion from `isize` keeps the
/// slice-style convention: `-1` is the last entry, `0` the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLevel {
    FromRoot(usize),
    FromEnd(usize),
}

impl ParentLevel {
    pub const DIRECT: ParentLevel = ParentLevel::FromEnd(1);

    /// Index into a chain of `len` entries, `None` when out of range.
    pub fn index(self, len: usize) -> Option<usize> {
        match self {
            ParentLevel::FromRoot(i) if i < len => Some(i),
            ParentLevel::FromEnd(n) if n >= 1 && n <= len => Some(len - n),
            _ => None,
        }
    }

    pub fn pick<T: Clone>(self, items: &[T]) -> Option<T> {
        self.index(items.len()).map(|i| items[i].clone())
    }
}

impl Default for ParentLevel {
    fn default() -> Self {
        ParentLevel::DIRECT
    }
}

impl From<isize> for ParentLevel {
    fn from(level: isize) -> Self {
        if level < 0 {
            ParentLevel::FromEnd(level.unsigned_abs())
        } else {
            ParentLevel::FromRoot(level as usize)
        }
    }
}

impl From<i32> for ParentLevel {
    fn from(level: i32) -> Self {
        ParentLevel::from(level as isize)
    }
}

/// Children collection of a page.
#[derive(Clone)]
pub enum PageChildren {
    Loaded(Vec<PageHandle>),
    /// Enumerated on first access (snapshot pages).
    Deferred(SnapshotChildren),
}

impl Default for PageChildren {
    fn default() -> Self {
        PageChildren::Loaded(Vec::new())
    }
}

impl PageChildren {
    /// A deferred collection counts as populated without being enumerated.
    pub fn is_populated(&self) -> bool {
        match self {
            PageChildren::Loaded(v) => !v.is_empty(),
            PageChildren::Deferred(_) => true,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, PageChildren::Deferred(_))
    }

    pub fn to_vec(&self) -> Result<Vec<PageHandle>> {
        match self {
            PageChildren::Loaded(v) => Ok(v.clone()),
            PageChildren::Deferred(c) => c.load(),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.to_vec()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn push(&mut self, child: PageHandle) -> Result<()> {
        match self {
            PageChildren::Loaded(v) => {
                v.push(child);
                Ok(())
            }
            PageChildren::Deferred(c) => c.push(child),
        }
    }
}

impl fmt::Debug for PageChildren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageChildren::Loaded(v) => write!(f, "Loaded({})", v.len()),
            PageChildren::Deferred(_) => f.write_str("Deferred"),
        }
    }
}
