//! Snapshot repository.
//!
//! - SnapshotManager: the lookup contract proxies depend on.
//! - SnapshotCriteria: page id / url / route / alias / site filters.
//! - InMemorySnapshotManager: a vector-backed implementation, optionally loaded
//!   from a snapshots JSON file (see registry.rs).

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::debug;

use crate::model::{PageId, SiteId, Snapshot};

use super::registry::{load_snapshots, save_snapshots};

/// Source of published snapshots.
///
/// "None" results are not errors: proxies treat a missing snapshot as the end
/// of a parent chain or as "no target".
pub trait SnapshotManager {
    /// The single enabled snapshot matching `criteria`, if any.
    fn find_enabled_snapshot(&self, criteria: &SnapshotCriteria) -> Result<Option<Snapshot>>;

    /// Enabled snapshots whose content names `parent_id` as parent, ordered by position.
    fn find_enabled_children(&self, _parent_id: PageId) -> Result<Vec<Snapshot>> {
        Ok(Vec::new())
    }
}

/// Lookup filters; every field that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotCriteria {
    pub page_id: Option<PageId>,
    pub url: Option<String>,
    pub route_name: Option<String>,
    pub page_alias: Option<String>,
    pub site_id: Option<SiteId>,
}

impl SnapshotCriteria {
    pub fn page(page_id: PageId) -> Self {
        Self {
            page_id: Some(page_id),
            ..Self::default()
        }
    }

    pub fn url(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn with_route_name(mut self, route_name: &str) -> Self {
        self.route_name = Some(route_name.to_string());
        self
    }

    pub fn with_page_alias(mut self, alias: &str) -> Self {
        self.page_alias = Some(alias.to_string());
        self
    }

    pub fn with_site(mut self, site_id: Option<SiteId>) -> Self {
        self.site_id = site_id;
        self
    }

    pub fn matches(&self, s: &Snapshot) -> bool {
        if let Some(id) = self.page_id {
            if s.page_id != Some(id) {
                return false;
            }
        }
        if let Some(url) = &self.url {
            if s.url.as_deref() != Some(url.as_str()) {
                return false;
            }
        }
        if let Some(route) = &self.route_name {
            if s.route_name.as_deref() != Some(route.as_str()) {
                return false;
            }
        }
        if let Some(alias) = &self.page_alias {
            if s.page_alias.as_deref() != Some(alias.as_str()) {
                return false;
            }
        }
        if let Some(site_id) = self.site_id {
            if s.site.as_ref().and_then(|site| site.id) != Some(site_id) {
                return false;
            }
        }
        true
    }
}

/// Enabled = flag set and `now` inside the publication window.
pub fn is_published(s: &Snapshot, now: DateTime<Utc>) -> bool {
    s.enabled
        && s.publication_date_start.map(|d| d <= now).unwrap_or(true)
        && s.publication_date_end.map(|d| d >= now).unwrap_or(true)
}

/// In-process snapshot repository.
#[derive(Debug, Default, Clone)]
pub struct InMemorySnapshotManager {
    snapshots: Vec<Snapshot>,
    // fixed clock for deterministic lookups; None = Utc::now()
    now: Option<DateTime<Utc>>,
}

impl InMemorySnapshotManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshots(snapshots: Vec<Snapshot>) -> Self {
        Self {
            snapshots,
            now: None,
        }
    }

    /// Load all snapshots from a snapshots JSON file.
    pub fn open(path: &Path) -> Result<Self> {
        let snapshots = load_snapshots(path)?;
        debug!("snapshot manager: loaded {} snapshot(s) from {}", snapshots.len(), path.display());
        Ok(Self::from_snapshots(snapshots))
    }

    /// Write all snapshots back to a JSON file (tmp + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        save_snapshots(path, &self.snapshots)
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn add(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    // latest publication start wins; ties go to the highest snapshot id
    fn pick_latest<'a, I>(candidates: I) -> Option<&'a Snapshot>
    where
        I: Iterator<Item = &'a Snapshot>,
    {
        candidates.max_by(|a, b| {
            a.publication_date_start
                .cmp(&b.publication_date_start)
                .then(a.id.cmp(&b.id))
        })
    }
}

impl SnapshotManager for InMemorySnapshotManager {
    fn find_enabled_snapshot(&self, criteria: &SnapshotCriteria) -> Result<Option<Snapshot>> {
        let now = self.now();
        let found = Self::pick_latest(
            self.snapshots
                .iter()
                .filter(|s| is_published(s, now) && criteria.matches(s)),
        );
        Ok(found.cloned())
    }

    fn find_enabled_children(&self, parent_id: PageId) -> Result<Vec<Snapshot>> {
        let now = self.now();
        let mut page_ids: Vec<PageId> = self
            .snapshots
            .iter()
            .filter(|s| is_published(s, now) && s.content.parent_id() == Some(parent_id))
            .filter_map(|s| s.page_id)
            .collect();
        page_ids.sort_unstable();
        page_ids.dedup();

        let mut out: Vec<Snapshot> = Vec::with_capacity(page_ids.len());
        for pid in page_ids {
            let latest = Self::pick_latest(self.snapshots.iter().filter(|s| {
                s.page_id == Some(pid)
                    && is_published(s, now)
                    && s.content.parent_id() == Some(parent_id)
            }));
            if let Some(s) = latest {
                out.push(s.clone());
            }
        }
        out.sort_by(|a, b| a.position.cmp(&b.position).then(a.page_id.cmp(&b.page_id)));
        Ok(out)
    }
}
