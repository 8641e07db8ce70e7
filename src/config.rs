//! Centralized configuration for the snapshot page layer.
//!
//! - PageSnapConfig::default(): built-in defaults.
//! - PageSnapConfig::from_env(): same defaults, overridden by PS_* env vars.
//! - Fluent `with_*` setters for explicit overrides (tests, embedding code).
//!
//! Every proxy holds an `Rc<PageSnapConfig>` and hands it to the proxies it
//! creates (parents, target, children).

use std::fmt;
use std::path::PathBuf;

use crate::model::SiteId;

/// Default upper bound on a parent climb.
pub const DEFAULT_MAX_PARENT_DEPTH: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSnapConfig {
    /// Maximum number of ancestors collected by a parent climb.
    /// Env: PS_MAX_PARENT_DEPTH (default 64)
    pub max_parent_depth: usize,

    /// Snapshots JSON file used by the CLI when --snapshots is not given.
    /// Env: PS_SNAPSHOTS_PATH
    pub snapshots_path: Option<PathBuf>,

    /// Default site filter for lookups built by the CLI.
    /// Env: PS_SITE_ID
    pub site_id: Option<SiteId>,
}

impl Default for PageSnapConfig {
    fn default() -> Self {
        Self {
            max_parent_depth: DEFAULT_MAX_PARENT_DEPTH,
            snapshots_path: None,
            site_id: None,
        }
    }
}

impl PageSnapConfig {
    /// Load configuration from environment variables on top of defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("PS_MAX_PARENT_DEPTH") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.max_parent_depth = n;
            }
        }

        if let Ok(v) = std::env::var("PS_SNAPSHOTS_PATH") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.snapshots_path = Some(PathBuf::from(s));
            }
        }

        if let Ok(v) = std::env::var("PS_SITE_ID") {
            if let Ok(n) = v.trim().parse::<SiteId>() {
                cfg.site_id = Some(n);
            }
        }

        cfg
    }

    pub fn with_max_parent_depth(mut self, depth: usize) -> Self {
        self.max_parent_depth = depth;
        self
    }

    pub fn with_snapshots_path<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.snapshots_path = path.map(Into::into);
        self
    }

    pub fn with_site_id(mut self, site_id: Option<SiteId>) -> Self {
        self.site_id = site_id;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> Self {
        self
    }
}

impl fmt::Display for PageSnapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PageSnapConfig {{ max_parent_depth: {}, snapshots_path: {}, site_id: {} }}",
            self.max_parent_depth,
            self.snapshots_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string()),
            self.site_id
                .map(|v| v.to_string())
                .unwrap_or_else(|| "any".to_string()),
        )
    }
}
