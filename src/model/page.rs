//! Live page entity.
//!
//! `Page` is a cheap, cloneable handle over a `PageRecord`; clones share the
//! same record, so identity (`Page::ptr_eq`) matches the semantics of a
//! persisted entity. Setters take `&self`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use anyhow::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::{Block, PageChildren, PageHandle, PageId, PageLike, ParentLevel, Site};

/// Request methods a page may be restricted to.
pub const REQUEST_METHODS: [&str; 5] = ["PUT", "POST", "GET", "DELETE", "HEAD"];

const CMS_ROUTE: &str = "page_slug";
const INTERNAL_ROUTE_MARK: &str = "_page_internal_";
const ERROR_ROUTE_MARK: &str = "_page_internal_error_";

/// Page fields and relations.
#[derive(Debug, Default)]
pub struct PageRecord {
    pub id: Option<PageId>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub custom_url: Option<String>,
    pub route_name: Option<String>,
    pub page_alias: Option<String>,
    pub page_type: Option<String>,
    pub enabled: bool,
    pub position: i64,
    pub decorate: bool,
    pub edited: bool,
    pub template_code: Option<String>,
    pub meta_keyword: Option<String>,
    pub meta_description: Option<String>,
    pub javascript: Option<String>,
    pub stylesheet: Option<String>,
    pub raw_headers: Option<String>,
    pub headers: IndexMap<String, String>,
    pub request_method: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub site: Option<Site>,
    pub parent: Option<PageHandle>,
    pub parents: Option<Vec<PageHandle>>,
    pub target: Option<PageHandle>,
    pub children: PageChildren,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Default)]
pub struct Page(Rc<RefCell<PageRecord>>);

impl Page {
    pub fn new() -> Self {
        Self::from_record(PageRecord {
            decorate: true,
            ..PageRecord::default()
        })
    }

    pub fn from_record(record: PageRecord) -> Self {
        Self(Rc::new(RefCell::new(record)))
    }

    pub fn ptr_eq(a: &Page, b: &Page) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<PageRecord>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<PageRecord>>) -> Self {
        Self(rc)
    }

    // ----- scalar fields -----

    pub fn id(&self) -> Option<PageId> {
        self.0.borrow().id
    }

    pub fn set_id(&self, id: Option<PageId>) {
        self.0.borrow_mut().id = id;
    }

    pub fn title(&self) -> Option<String> {
        self.0.borrow().title.clone()
    }

    pub fn set_title(&self, title: impl Into<Option<String>>) {
        self.0.borrow_mut().title = title.into();
    }

    pub fn name(&self) -> Option<String> {
        self.0.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<Option<String>>) {
        self.0.borrow_mut().name = name.into();
    }

    pub fn slug(&self) -> Option<String> {
        self.0.borrow().slug.clone()
    }

    pub fn set_slug(&self, slug: impl Into<Option<String>>) {
        self.0.borrow_mut().slug = slug.into();
    }

    pub fn url(&self) -> Option<String> {
        self.0.borrow().url.clone()
    }

    pub fn set_url(&self, url: impl Into<Option<String>>) {
        self.0.borrow_mut().url = url.into();
    }

    pub fn custom_url(&self) -> Option<String> {
        self.0.borrow().custom_url.clone()
    }

    pub fn set_custom_url(&self, custom_url: impl Into<Option<String>>) {
        self.0.borrow_mut().custom_url = custom_url.into();
    }

    pub fn route_name(&self) -> Option<String> {
        self.0.borrow().route_name.clone()
    }

    pub fn set_route_name(&self, route_name: impl Into<Option<String>>) {
        self.0.borrow_mut().route_name = route_name.into();
    }

    pub fn page_alias(&self) -> Option<String> {
        self.0.borrow().page_alias.clone()
    }

    pub fn set_page_alias(&self, page_alias: impl Into<Option<String>>) {
        self.0.borrow_mut().page_alias = page_alias.into();
    }

    pub fn page_type(&self) -> Option<String> {
        self.0.borrow().page_type.clone()
    }

    pub fn set_page_type(&self, page_type: impl Into<Option<String>>) {
        self.0.borrow_mut().page_type = page_type.into();
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

    pub fn decorate(&self) -> bool {
        self.0.borrow().decorate
    }

    pub fn set_decorate(&self, decorate: bool) {
        self.0.borrow_mut().decorate = decorate;
    }

    pub fn edited(&self) -> bool {
        self.0.borrow().edited
    }

    pub fn set_edited(&self, edited: bool) {
        self.0.borrow_mut().edited = edited;
    }

    pub fn template_code(&self) -> Option<String> {
        self.0.borrow().template_code.clone()
    }

    pub fn set_template_code(&self, template_code: impl Into<Option<String>>) {
        self.0.borrow_mut().template_code = template_code.into();
    }

    pub fn meta_keyword(&self) -> Option<String> {
        self.0.borrow().meta_keyword.clone()
    }

    pub fn set_meta_keyword(&self, meta_keyword: impl Into<Option<String>>) {
        self.0.borrow_mut().meta_keyword = meta_keyword.into();
    }

    pub fn meta_description(&self) -> Option<String> {
        self.0.borrow().meta_description.clone()
    }

    pub fn set_meta_description(&self, meta_description: impl Into<Option<String>>) {
        self.0.borrow_mut().meta_description = meta_description.into();
    }

    pub fn javascript(&self) -> Option<String> {
        self.0.borrow().javascript.clone()
    }

    pub fn set_javascript(&self, javascript: impl Into<Option<String>>) {
        self.0.borrow_mut().javascript = javascript.into();
    }

    pub fn stylesheet(&self) -> Option<String> {
        self.0.borrow().stylesheet.clone()
    }

    pub fn set_stylesheet(&self, stylesheet: impl Into<Option<String>>) {
        self.0.borrow_mut().stylesheet = stylesheet.into();
    }

    pub fn request_method(&self) -> Option<String> {
        self.0.borrow().request_method.clone()
    }

    pub fn set_request_method(&self, method: impl Into<Option<String>>) {
        self.0.borrow_mut().request_method = method.into();
    }

    /// An unrestricted page (no request method set) accepts every known method.
    pub fn has_request_method(&self, method: &str) -> bool {
        let method = method.trim().to_ascii_uppercase();
        if !REQUEST_METHODS.contains(&method.as_str()) {
            return false;
        }
        match self.0.borrow().request_method.as_deref() {
            None | Some("") => true,
            Some(allowed) => allowed.to_ascii_uppercase().contains(&method),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.0.borrow().created_at
    }

    pub fn set_created_at(&self, at: Option<DateTime<Utc>>) {
        self.0.borrow_mut().created_at = at;
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.0.borrow().updated_at
    }

    pub fn set_updated_at(&self, at: Option<DateTime<Utc>>) {
        self.0.borrow_mut().updated_at = at;
    }

    pub fn site(&self) -> Option<Site> {
        self.0.borrow().site.clone()
    }

    pub fn set_site(&self, site: Option<Site>) {
        self.0.borrow_mut().site = site;
    }

    // ----- headers -----

    pub fn headers(&self) -> IndexMap<String, String> {
        self.0.borrow().headers.clone()
    }

    pub fn raw_headers(&self) -> Option<String> {
        self.0.borrow().raw_headers.clone()
    }

    /// Replaces all headers.
    pub fn set_headers(&self, headers: IndexMap<String, String>) {
        {
            let mut r = self.0.borrow_mut();
            r.headers.clear();
            r.raw_headers = None;
        }
        for (name, value) in headers {
            self.add_header(&name, &value);
        }
    }

    /// Sets one header and keeps the raw text form in sync.
    pub fn add_header(&self, name: &str, value: &str) {
        let mut r = self.0.borrow_mut();
        r.headers.insert(name.to_string(), value.to_string());
        r.raw_headers = Some(headers_to_raw(&r.headers));
    }

    /// Parses `Name: value` lines; lines without a colon are ignored.
    pub fn set_raw_headers(&self, raw: &str) {
        self.set_headers(parse_raw_headers(raw));
    }

    // ----- classification -----

    pub fn is_internal(&self) -> bool {
        self.route_contains(INTERNAL_ROUTE_MARK)
    }

    pub fn is_error(&self) -> bool {
        self.route_contains(ERROR_ROUTE_MARK)
    }

    pub fn is_cms(&self) -> bool {
        self.route_is_cms() && !self.is_internal()
    }

    pub fn is_hybrid(&self) -> bool {
        !self.route_is_cms() && !self.is_internal()
    }

    pub fn is_dynamic(&self) -> bool {
        self.is_hybrid()
            && self
                .0
                .borrow()
                .url
                .as_deref()
                .map(|u| u.contains('{'))
                .unwrap_or(false)
    }

    fn route_is_cms(&self) -> bool {
        self.0.borrow().route_name.as_deref() == Some(CMS_ROUTE)
    }

    fn route_contains(&self, mark: &str) -> bool {
        self.0
            .borrow()
            .route_name
            .as_deref()
            .map(|r| r.contains(mark))
            .unwrap_or(false)
    }

    // ----- relations -----

    pub fn target(&self) -> Option<PageHandle> {
        self.0.borrow().target.clone()
    }

    pub fn set_target(&self, target: Option<PageHandle>) {
        self.0.borrow_mut().target = target;
    }

    /// `ParentLevel::DIRECT` reads the parent link; other levels index `parents()`.
    pub fn parent(&self, level: ParentLevel) -> Result<Option<PageHandle>> {
        if level == ParentLevel::DIRECT {
            return Ok(self.0.borrow().parent.clone());
        }
        Ok(level.pick(&self.parents()?))
    }

    pub fn set_parent(&self, parent: Option<PageHandle>) {
        let mut r = self.0.borrow_mut();
        r.parent = parent;
        r.parents = None;
    }

    /// Ancestors, root first. Built once from the parent links.
    pub fn parents(&self) -> Result<Vec<PageHandle>> {
        if let Some(parents) = self.0.borrow().parents.clone() {
            return Ok(parents);
        }

        let mut chain: Vec<PageHandle> = Vec::new();
        let mut current = self.0.borrow().parent.clone();
        while let Some(p) = current {
            // cyclic links end the climb
            if chain.iter().any(|seen| PageHandle::ptr_eq(seen, &p))
                || p.as_live().map(|l| Page::ptr_eq(l, self)).unwrap_or(false)
            {
                break;
            }
            current = p.parent(ParentLevel::DIRECT)?;
            chain.push(p);
        }
        chain.reverse();

        self.0.borrow_mut().parents = Some(chain.clone());
        Ok(chain)
    }

    pub fn set_parents(&self, parents: Vec<PageHandle>) {
        self.0.borrow_mut().parents = Some(parents);
    }

    pub fn children(&self) -> PageChildren {
        self.0.borrow().children.clone()
    }

    pub fn set_children(&self, children: PageChildren) {
        self.0.borrow_mut().children = children;
    }

    pub fn add_children(&self, child: PageHandle) -> Result<()> {
        let mut children = self.children();
        children.push(child)?;
        self.set_children(children);
        Ok(())
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.0.borrow().blocks.clone()
    }

    pub fn has_blocks(&self) -> bool {
        !self.0.borrow().blocks.is_empty()
    }

    pub fn add_blocks(&self, block: Block) {
        self.0.borrow_mut().blocks.push(block);
    }
}

impl PageLike for Page {
    fn page(&self) -> Result<Page> {
        Ok(self.clone())
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.borrow().name.as_deref() {
            Some(name) if !name.is_empty() => f.write_str(name),
            _ => f.write_str("-"),
        }
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0.borrow();
        f.debug_struct("Page")
            .field("id", &r.id)
            .field("name", &r.name)
            .field("url", &r.url)
            .field("route_name", &r.route_name)
            .field("blocks", &r.blocks.len())
            .finish()
    }
}

pub(crate) fn parse_raw_headers(raw: &str) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    for line in raw.lines() {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            out.insert(name.to_string(), value.trim().to_string());
        }
    }
    out
}

fn headers_to_raw(headers: &IndexMap<String, String>) -> String {
    headers
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_by_route_name() {
        let p = Page::new();
        p.set_route_name("page_slug".to_string());
        assert!(p.is_cms());
        assert!(!p.is_hybrid());
        assert!(!p.is_internal());

        p.set_route_name("_page_internal_error_not_found".to_string());
        assert!(p.is_internal());
        assert!(p.is_error());
        assert!(!p.is_cms());
        assert!(!p.is_hybrid());

        p.set_route_name("catalog_index".to_string());
        p.set_url("/catalog/{page}".to_string());
        assert!(p.is_hybrid());
        assert!(p.is_dynamic());

        p.set_url("/catalog".to_string());
        assert!(!p.is_dynamic());
    }

    #[test]
    fn request_method_constraint() {
        let p = Page::new();
        assert!(p.has_request_method("get"));
        assert!(!p.has_request_method("PATCH"));

        p.set_request_method("GET|POST".to_string());
        assert!(p.has_request_method("post"));
        assert!(!p.has_request_method("DELETE"));
    }

    #[test]
    fn raw_headers_roundtrip_keeps_order() {
        let p = Page::new();
        p.set_raw_headers("X-Frame-Options: DENY\nbogus line\nCache-Control: no-cache, private\n");
        let h = p.headers();
        let keys: Vec<&str> = h.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["X-Frame-Options", "Cache-Control"]);
        assert_eq!(h["Cache-Control"], "no-cache, private");

        p.add_header("X-Extra", "1");
        assert_eq!(
            p.raw_headers().as_deref(),
            Some("X-Frame-Options: DENY\r\nCache-Control: no-cache, private\r\nX-Extra: 1")
        );
    }

    #[test]
    fn display_falls_back_to_dash() {
        let p = Page::new();
        assert_eq!(p.to_string(), "-");
        p.set_name("Home".to_string());
        assert_eq!(p.to_string(), "Home");
    }

    #[test]
    fn live_parents_follow_links_root_first() {
        let root = Page::new();
        root.set_name("root".to_string());
        let mid = Page::new();
        mid.set_name("mid".to_string());
        mid.set_parent(Some(PageHandle::Live(root.clone())));
        let leaf = Page::new();
        leaf.set_parent(Some(PageHandle::Live(mid.clone())));

        let names: Vec<String> = leaf
            .parents()
            .unwrap()
            .iter()
            .map(|p| p.page().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["root", "mid"]);

        let direct = leaf.parent(ParentLevel::DIRECT).unwrap().unwrap();
        assert!(Page::ptr_eq(&direct.page().unwrap(), &mid));
        let first = leaf.parent(ParentLevel::FromRoot(0)).unwrap().unwrap();
        assert!(Page::ptr_eq(&first.page().unwrap(), &root));
    }
}
