//! Flat page registry handed to the documentation renderer.

use serde::{Deserialize, Serialize};

/// One page per expanded schema node, in walk order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub gid: String,
    pub url: String,
    /// Step the node was first reached by (`color`, `[*]`, `*`, ...).
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_key: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Pages whose parent is `url`, in registry order.
pub fn children_of<'a>(pages: &'a [PageRecord], url: &'a str) -> impl Iterator<Item = &'a PageRecord> {
    pages
        .iter()
        .filter(move |page| page.parent_url.as_deref() == Some(url))
}

pub fn find_by_gid<'a>(pages: &'a [PageRecord], gid: &str) -> Option<&'a PageRecord> {
    pages.iter().find(|page| page.gid == gid)
}
