//! Typed hypermedia links from the Library API `_links` sections

use serde::{Deserialize, Serialize};

/// A hypermedia link: a relative `href` plus optional display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Link {
    /// Build a link from a bare href.
    pub fn from_href(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: None,
            media_type: None,
        }
    }

    /// Version identifier encoded in the trailing path segment,
    /// e.g. `/mdr/sdtmig/3-3` → `3-3`.
    pub fn version(&self) -> Option<&str> {
        self.href.rsplit('/').next().filter(|s| !s.is_empty())
    }
}
