use anyhow::Result;
use serde_json::{json, Value};

use crate::cms::SnapshotCmsManager;
use crate::model::{Block, PageHandle, PageLike};

fn label(page: &PageHandle) -> Result<String> {
    Ok(format!(
        "#{} {}",
        page.id()?.map(|id| id.to_string()).unwrap_or_else(|| "?".into()),
        page.display_name()?
    ))
}

pub fn cmd_show(cms: &SnapshotCmsManager, page_id: u64, json: bool) -> Result<()> {
    let proxy = cms.page(page_id)?;
    let parents = proxy.parents()?;
    let target = proxy.target()?;
    let blocks = proxy.blocks()?;

    if json {
        let target_id = match &target {
            Some(t) => t.id()?,
            None => None,
        };
        let parent_ids = parents.iter().map(|p| p.id()).collect::<Result<Vec<_>>>()?;
        let v = json!({
            "id": proxy.id()?,
            "snapshotId": proxy.snapshot().id,
            "name": proxy.name()?,
            "url": proxy.url()?,
            "routeName": proxy.route_name()?,
            "enabled": proxy.enabled()?,
            "cms": proxy.is_cms()?,
            "dynamic": proxy.is_dynamic()?,
            "hybrid": proxy.is_hybrid()?,
            "internal": proxy.is_internal()?,
            "error": proxy.is_error()?,
            "parents": parent_ids,
            "target": target_id,
            "blocks": blocks.len(),
        });
        println!("{}", serde_json::to_string_pretty(&v)?);
        return Ok(());
    }

    println!("Page {} (snapshot {})", page_id, proxy.snapshot().id);
    println!("  name       = {}", proxy.display_name()?);
    println!("  url        = {}", proxy.url()?.unwrap_or_default());
    println!("  route_name = {}", proxy.route_name()?.unwrap_or_default());
    println!("  enabled    = {}", proxy.enabled()?);
    println!(
        "  kind       = cms:{} dynamic:{} hybrid:{} internal:{} error:{}",
        proxy.is_cms()?,
        proxy.is_dynamic()?,
        proxy.is_hybrid()?,
        proxy.is_internal()?,
        proxy.is_error()?
    );
    println!("  parents    = {}", parents.len());
    match &target {
        Some(t) => println!("  target     = {}", label(t)?),
        None => println!("  target     = (none)"),
    }
    println!("  blocks     = {}", blocks.len());
    Ok(())
}

pub fn cmd_parents(cms: &SnapshotCmsManager, page_id: u64) -> Result<()> {
    let proxy = cms.page(page_id)?;
    let parents = proxy.parents()?;
    if parents.is_empty() {
        println!("(root page)");
        return Ok(());
    }
    for (depth, parent) in parents.iter().enumerate() {
        println!("{}{}", "  ".repeat(depth), label(parent)?);
    }
    Ok(())
}

fn block_json(block: &Block) -> Value {
    json!({
        "id": block.id(),
        "name": block.name(),
        "type": block.block_type(),
        "enabled": block.enabled(),
        "position": block.position(),
        "settings": Value::Object(block.settings()),
        "children": block.children().iter().map(block_json).collect::<Vec<_>>(),
    })
}

fn print_block(block: &Block, depth: usize) {
    println!(
        "{}- #{} {} [{}]{}",
        "  ".repeat(depth),
        block.id().map(|id| id.to_string()).unwrap_or_else(|| "?".into()),
        block.name().unwrap_or_else(|| "-".into()),
        block.block_type().unwrap_or_default(),
        if block.enabled() { "" } else { " (disabled)" }
    );
    for child in block.children() {
        print_block(&child, depth + 1);
    }
}

pub fn cmd_blocks(cms: &SnapshotCmsManager, page_id: u64, json: bool) -> Result<()> {
    let blocks = cms.page(page_id)?.blocks()?;
    if json {
        let v: Vec<Value> = blocks.iter().map(block_json).collect();
        println!("{}", serde_json::to_string_pretty(&v)?);
        return Ok(());
    }
    if blocks.is_empty() {
        println!("(no blocks)");
    }
    for block in &blocks {
        print_block(block, 0);
    }
    Ok(())
}

pub fn cmd_record(cms: &SnapshotCmsManager, page_id: u64) -> Result<()> {
    let proxy = cms.page(page_id)?;
    println!("{}", proxy.to_json()?);
    Ok(())
}
