//! Snapshot content -> domain objects.
//!
//! `Transformer` is the seam between stored snapshot content and live pages and
//! blocks. `JsonTransformer` understands the flat content layout written by the
//! publisher (page scalars at the top level, block descriptors under `blocks`).

use anyhow::Result;
use log::debug;

use crate::model::{Block, BlockDescriptor, BlockRecord, Page, PageHandle, Snapshot};
use crate::util::{json_bool, json_i64, json_str, json_timestamp, json_u64};

pub trait Transformer {
    /// Build a fully populated page from snapshot content.
    /// Must not modify the snapshot and must be deterministic for given content.
    fn load(&self, snapshot: &Snapshot) -> Result<Page>;

    /// Build one block. `owner` is the page the block belongs to; for snapshot
    /// pages this is the proxy itself, not the materialized page.
    fn load_block(&self, descriptor: &BlockDescriptor, owner: &PageHandle) -> Result<Block>;
}

/// Default transformer for JSON snapshot content.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTransformer;

impl JsonTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for JsonTransformer {
    fn load(&self, snapshot: &Snapshot) -> Result<Page> {
        let c = snapshot.content().as_map();
        let page = Page::new();

        page.set_id(json_u64(c, "id").or(snapshot.page_id));
        page.set_title(json_str(c, "title"));
        page.set_name(json_str(c, "name").or_else(|| snapshot.name.clone()));
        page.set_slug(json_str(c, "slug"));
        page.set_url(json_str(c, "url").or_else(|| snapshot.url.clone()));
        page.set_custom_url(json_str(c, "custom_url"));
        page.set_route_name(json_str(c, "route_name").or_else(|| snapshot.route_name.clone()));
        page.set_page_alias(json_str(c, "page_alias").or_else(|| snapshot.page_alias.clone()));
        page.set_page_type(json_str(c, "type"));
        page.set_enabled(json_bool(c, "enabled").unwrap_or(snapshot.enabled));
        page.set_position(json_i64(c, "position").unwrap_or(snapshot.position));
        page.set_decorate(json_bool(c, "decorate").unwrap_or(true));
        page.set_request_method(json_str(c, "request_method"));
        page.set_javascript(json_str(c, "javascript"));
        page.set_stylesheet(json_str(c, "stylesheet"));
        page.set_meta_keyword(json_str(c, "meta_keyword"));
        page.set_meta_description(json_str(c, "meta_description"));
        page.set_template_code(json_str(c, "template_code"));
        page.set_created_at(json_timestamp(c, "created_at"));
        page.set_updated_at(json_timestamp(c, "updated_at"));
        if let Some(raw) = json_str(c, "raw_headers") {
            page.set_raw_headers(&raw);
        }
        page.set_site(snapshot.site.clone());

        debug!(
            "transformer: loaded page {:?} from snapshot {}",
            page.id(),
            snapshot.id
        );
        Ok(page)
    }

    fn load_block(&self, descriptor: &BlockDescriptor, owner: &PageHandle) -> Result<Block> {
        let d = descriptor.as_map();
        let block = Block::from_record(BlockRecord {
            id: json_u64(d, "id"),
            name: json_str(d, "name"),
            block_type: json_str(d, "type"),
            enabled: json_bool(d, "enabled").unwrap_or(true),
            position: json_i64(d, "position").unwrap_or(0),
            settings: d
                .get("settings")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default(),
            created_at: json_timestamp(d, "created_at"),
            updated_at: json_timestamp(d, "updated_at"),
            ..BlockRecord::default()
        });

        for child in descriptor.children() {
            let c = self.load_block(&child, owner)?;
            c.set_page(Some(owner));
            block.add_child(c);
        }
        Ok(block)
    }
}
