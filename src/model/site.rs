use serde::{Deserialize, Serialize};

use super::SiteId;

/// Site a page (and its snapshot) belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: Option<SiteId>,
    pub name: Option<String>,
    pub host: Option<String>,
    pub relative_path: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub is_default: bool,
}

impl Site {
    pub fn new(id: SiteId, name: &str) -> Self {
        Self {
            id: Some(id),
            name: Some(name.to_string()),
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }
}
