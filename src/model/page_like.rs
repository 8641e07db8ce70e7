//! The page contract.
//!
//! Every operation a renderer may call on a page is listed here. Implementors
//! only have to provide `page()`; the default bodies forward to the
//! materialized `Page`. Snapshot proxies override the relationship accessors
//! (target, parents, children, blocks) to resolve them lazily from snapshot
//! content. All methods are fallible because materialization is.

use anyhow::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::{Block, Page, PageChildren, PageHandle, PageId, ParentLevel, Site};

pub trait PageLike {
    /// The materialized page backing this view.
    fn page(&self) -> Result<Page>;

    fn id(&self) -> Result<Option<PageId>> {
        Ok(self.page()?.id())
    }

    fn set_id(&self, id: Option<PageId>) -> Result<()> {
        self.page()?.set_id(id);
        Ok(())
    }

    fn title(&self) -> Result<Option<String>> {
        Ok(self.page()?.title())
    }

    fn set_title(&self, title: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_title(title);
        Ok(())
    }

    fn name(&self) -> Result<Option<String>> {
        Ok(self.page()?.name())
    }

    fn set_name(&self, name: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_name(name);
        Ok(())
    }

    fn slug(&self) -> Result<Option<String>> {
        Ok(self.page()?.slug())
    }

    fn set_slug(&self, slug: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_slug(slug);
        Ok(())
    }

    fn url(&self) -> Result<Option<String>> {
        Ok(self.page()?.url())
    }

    fn set_url(&self, url: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_url(url);
        Ok(())
    }

    fn custom_url(&self) -> Result<Option<String>> {
        Ok(self.page()?.custom_url())
    }

    fn set_custom_url(&self, custom_url: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_custom_url(custom_url);
        Ok(())
    }

    fn route_name(&self) -> Result<Option<String>> {
        Ok(self.page()?.route_name())
    }

    fn set_route_name(&self, route_name: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_route_name(route_name);
        Ok(())
    }

    fn page_alias(&self) -> Result<Option<String>> {
        Ok(self.page()?.page_alias())
    }

    fn set_page_alias(&self, page_alias: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_page_alias(page_alias);
        Ok(())
    }

    fn page_type(&self) -> Result<Option<String>> {
        Ok(self.page()?.page_type())
    }

    fn set_page_type(&self, page_type: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_page_type(page_type);
        Ok(())
    }

    fn enabled(&self) -> Result<bool> {
        Ok(self.page()?.enabled())
    }

    fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.page()?.set_enabled(enabled);
        Ok(())
    }

    fn position(&self) -> Result<i64> {
        Ok(self.page()?.position())
    }

    fn set_position(&self, position: i64) -> Result<()> {
        self.page()?.set_position(position);
        Ok(())
    }

    fn decorate(&self) -> Result<bool> {
        Ok(self.page()?.decorate())
    }

    fn set_decorate(&self, decorate: bool) -> Result<()> {
        self.page()?.set_decorate(decorate);
        Ok(())
    }

    fn edited(&self) -> Result<bool> {
        Ok(self.page()?.edited())
    }

    fn set_edited(&self, edited: bool) -> Result<()> {
        self.page()?.set_edited(edited);
        Ok(())
    }

    fn template_code(&self) -> Result<Option<String>> {
        Ok(self.page()?.template_code())
    }

    fn set_template_code(&self, template_code: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_template_code(template_code);
        Ok(())
    }

    fn meta_keyword(&self) -> Result<Option<String>> {
        Ok(self.page()?.meta_keyword())
    }

    fn set_meta_keyword(&self, meta_keyword: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_meta_keyword(meta_keyword);
        Ok(())
    }

    fn meta_description(&self) -> Result<Option<String>> {
        Ok(self.page()?.meta_description())
    }

    fn set_meta_description(&self, meta_description: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_meta_description(meta_description);
        Ok(())
    }

    fn javascript(&self) -> Result<Option<String>> {
        Ok(self.page()?.javascript())
    }

    fn set_javascript(&self, javascript: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_javascript(javascript);
        Ok(())
    }

    fn stylesheet(&self) -> Result<Option<String>> {
        Ok(self.page()?.stylesheet())
    }

    fn set_stylesheet(&self, stylesheet: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_stylesheet(stylesheet);
        Ok(())
    }

    fn request_method(&self) -> Result<Option<String>> {
        Ok(self.page()?.request_method())
    }

    fn set_request_method(&self, method: impl Into<Option<String>>) -> Result<()> {
        self.page()?.set_request_method(method);
        Ok(())
    }

    fn has_request_method(&self, method: &str) -> Result<bool> {
        Ok(self.page()?.has_request_method(method))
    }

    fn headers(&self) -> Result<IndexMap<String, String>> {
        Ok(self.page()?.headers())
    }

    fn set_headers(&self, headers: IndexMap<String, String>) -> Result<()> {
        self.page()?.set_headers(headers);
        Ok(())
    }

    fn add_header(&self, name: &str, value: &str) -> Result<()> {
        self.page()?.add_header(name, value);
        Ok(())
    }

    fn raw_headers(&self) -> Result<Option<String>> {
        Ok(self.page()?.raw_headers())
    }

    fn set_raw_headers(&self, raw: &str) -> Result<()> {
        self.page()?.set_raw_headers(raw);
        Ok(())
    }

    fn created_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.page()?.created_at())
    }

    fn set_created_at(&self, at: Option<DateTime<Utc>>) -> Result<()> {
        self.page()?.set_created_at(at);
        Ok(())
    }

    fn updated_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.page()?.updated_at())
    }

    fn set_updated_at(&self, at: Option<DateTime<Utc>>) -> Result<()> {
        self.page()?.set_updated_at(at);
        Ok(())
    }

    fn site(&self) -> Result<Option<Site>> {
        Ok(self.page()?.site())
    }

    fn set_site(&self, site: Option<Site>) -> Result<()> {
        self.page()?.set_site(site);
        Ok(())
    }

    fn is_dynamic(&self) -> Result<bool> {
        Ok(self.page()?.is_dynamic())
    }

    fn is_cms(&self) -> Result<bool> {
        Ok(self.page()?.is_cms())
    }

    fn is_internal(&self) -> Result<bool> {
        Ok(self.page()?.is_internal())
    }

    fn is_error(&self) -> Result<bool> {
        Ok(self.page()?.is_error())
    }

    fn is_hybrid(&self) -> Result<bool> {
        Ok(self.page()?.is_hybrid())
    }

    // ----- relations -----

    fn target(&self) -> Result<Option<PageHandle>> {
        Ok(self.page()?.target())
    }

    fn set_target(&self, target: Option<PageHandle>) -> Result<()> {
        self.page()?.set_target(target);
        Ok(())
    }

    fn parent(&self, level: ParentLevel) -> Result<Option<PageHandle>> {
        self.page()?.parent(level)
    }

    fn set_parent(&self, parent: Option<PageHandle>) -> Result<()> {
        self.page()?.set_parent(parent);
        Ok(())
    }

    fn parents(&self) -> Result<Vec<PageHandle>> {
        self.page()?.parents()
    }

    fn set_parents(&self, parents: Vec<PageHandle>) -> Result<()> {
        self.page()?.set_parents(parents);
        Ok(())
    }

    fn children(&self) -> Result<PageChildren> {
        Ok(self.page()?.children())
    }

    fn add_children(&self, child: PageHandle) -> Result<()> {
        self.page()?.add_children(child)
    }

    fn blocks(&self) -> Result<Vec<Block>> {
        Ok(self.page()?.blocks())
    }

    fn add_blocks(&self, block: Block) -> Result<()> {
        self.page()?.add_blocks(block);
        Ok(())
    }

    /// Text form: the page name, `-` when unnamed.
    fn display_name(&self) -> Result<String> {
        Ok(self.page()?.to_string())
    }
}
