use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::{BlockId, PageHandle, WeakPageHandle};

/// Plain block data. Held behind a `Block` handle.
#[derive(Default)]
pub struct BlockRecord {
    pub id: Option<BlockId>,
    pub name: Option<String>,
    pub block_type: Option<String>,
    pub enabled: bool,
    pub position: i64,
    pub settings: Map<String, Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub children: Vec<Block>,
    pub(crate) parent: Option<Weak<RefCell<BlockRecord>>>,
    // weak: the owning page holds the block strongly
    pub(crate) page: Option<WeakPageHandle>,
}

/// Shared block handle; clones point at the same block.
#[derive(Clone, Default)]
pub struct Block(Rc<RefCell<BlockRecord>>);

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: BlockRecord) -> Self {
        Self(Rc::new(RefCell::new(record)))
    }

    pub fn ptr_eq(a: &Block, b: &Block) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn id(&self) -> Option<BlockId> {
        self.0.borrow().id
    }

    pub fn set_id(&self, id: Option<BlockId>) {
        self.0.borrow_mut().id = id;
    }

    pub fn name(&self) -> Option<String> {
        self.0.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<Option<String>>) {
        self.0.borrow_mut().name = name.into();
    }

    pub fn block_type(&self) -> Option<String> {
        self.0.borrow().block_type.clone()
    }

    pub fn set_block_type(&self, block_type: impl Into<Option<String>>) {
        self.0.borrow_mut().block_type = block_type.into();
    }

    pub fn enabled(&self) -> bool {
        self.0.borrow().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.0.borrow_mut().enabled = enabled;
    }

    pub fn position(&self) -> i64 {
        self.0.borrow().position
    }

    pub fn set_position(&self, position: i64) {
        self.0.borrow_mut().position = position;
    }

    pub fn settings(&self) -> Map<String, Value> {
        self.0.borrow().settings.clone()
    }

    pub fn setting(&self, key: &str) -> Option<Value> {
        self.0.borrow().settings.get(key).cloned()
    }

    pub fn set_setting(&self, key: &str, value: Value) {
        self.0.borrow_mut().settings.insert(key.to_string(), value);
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.0.borrow().created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.0.borrow().updated_at
    }

    pub fn children(&self) -> Vec<Block> {
        self.0.borrow().children.clone()
    }

    /// Appends `child` and points its parent link at this block.
    pub fn add_child(&self, child: Block) {
        child.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));
        self.0.borrow_mut().children.push(child);
    }

    pub fn parent(&self) -> Option<Block> {
        self.0
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Block)
    }

    /// Owning page, if it is still alive.
    pub fn page(&self) -> Option<PageHandle> {
        self.0.borrow().page.as_ref().and_then(WeakPageHandle::upgrade)
    }

    pub fn has_page(&self) -> bool {
        self.page().is_some()
    }

    pub fn set_page(&self, page: Option<&PageHandle>) {
        self.0.borrow_mut().page = page.map(PageHandle::downgrade);
    }

    /// Depth-first walk over this block and all nested children.
    pub fn walk(&self, f: &mut dyn FnMut(&Block)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0.borrow();
        f.debug_struct("Block")
            .field("id", &r.id)
            .field("name", &r.name)
            .field("type", &r.block_type)
            .field("position", &r.position)
            .field("children", &r.children.len())
            .finish()
    }
}
