//! Snapshot record and its denormalized content blob.
//!
//! Content is a JSON object produced by an external serializer. Only three keys
//! are interpreted here:
//! - `blocks`: ordered list of block descriptors (objects)
//! - `parent_id`: id of the parent page (null/0/absent = none)
//! - `target_id`: id of the target page (null/absent = none)
//!
//! Everything else is page scalar data consumed by the transformer.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SnapshotError;

use super::{PageId, Site, SnapshotId};

/// Published, versioned, denormalized page record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    #[serde(default)]
    pub page_id: Option<PageId>,
    #[serde(default)]
    pub site: Option<Site>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub page_alias: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub publication_date_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publication_date_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content: SnapshotContent,
}

impl Snapshot {
    pub fn new(id: SnapshotId, page_id: PageId, content: SnapshotContent) -> Self {
        Self {
            id,
            page_id: Some(page_id),
            enabled: true,
            content,
            ..Self::default()
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn content(&self) -> &SnapshotContent {
        &self.content
    }
}

/// Content mapping of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotContent(Map<String, Value>);

impl SnapshotContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds content from a JSON value; anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SnapshotError::InvalidContent(format!(
                "content must be an object, got {}",
                json_kind(&other)
            ))
            .into()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// Fluent variant of `insert`.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Parent page id; null, 0, "" and absent all mean "no parent".
    pub fn parent_id(&self) -> Option<PageId> {
        self.0.get("parent_id").and_then(page_id_of)
    }

    pub fn target_id(&self) -> Option<PageId> {
        self.0.get("target_id").and_then(page_id_of)
    }

    /// Block descriptors in stored order. A missing or null `blocks` key is an empty list.
    pub fn blocks(&self) -> Result<Vec<BlockDescriptor>> {
        match self.0.get("blocks") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(map) => Ok(BlockDescriptor(map.clone())),
                    other => Err(SnapshotError::InvalidContent(format!(
                        "blocks[{}] must be an object, got {}",
                        i,
                        json_kind(other)
                    ))
                    .into()),
                })
                .collect(),
            Some(other) => Err(SnapshotError::InvalidContent(format!(
                "blocks must be a list, got {}",
                json_kind(other)
            ))
            .into()),
        }
    }
}

/// A single serialized block inside snapshot content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockDescriptor(Map<String, Value>);

impl BlockDescriptor {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Nested descriptors (`blocks` key); malformed entries are skipped.
    pub fn children(&self) -> Vec<BlockDescriptor> {
        match self.0.get("blocks") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_object().cloned().map(BlockDescriptor))
                .collect(),
            _ => Vec::new(),
        }
    }
}

// ids may be stored as numbers or numeric strings
fn page_id_of(v: &Value) -> Option<PageId> {
    let id = match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    if id == 0 {
        None
    } else {
        Some(id)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
