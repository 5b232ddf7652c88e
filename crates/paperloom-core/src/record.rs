//! Canonical paper record
//!
//! The on-disk JSON shape (camelCase) is shared with the browsing UI, the
//! year partitions, and the index.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

/// Topic labels split by origin: `auto` is replaced on every
/// recategorization, `manual` survives merges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tags {
    #[serde(default)]
    pub auto: Vec<String>,
    #[serde(default)]
    pub manual: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    /// Abstract page, derived from the id.
    pub abs: String,
}

/// One bibliographic entity ingested from the upstream source.
///
/// Identity (`id`) is stable across revisions; classification fields
/// (`categories`, `tags`) mutate over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<Author>,
    /// RFC 3339 submission timestamp as returned by the feed.
    pub published: String,
    /// RFC 3339 timestamp of the latest revision.
    pub updated: String,
    #[serde(default)]
    pub source_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_category: Option<String>,
    pub links: Links,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Tags,
    pub fetched_at: String,
}

impl PaperRecord {
    /// Publication year, the 4-digit prefix of `published`.
    pub fn year(&self) -> Option<i32> {
        let prefix = self.published.get(..4)?;
        if !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        prefix.parse().ok()
    }

    /// Revision recency: `updated` falling back to `published`.
    pub fn revised_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.updated).or_else(|| parse_timestamp(&self.published))
    }
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

/// Collapse whitespace runs (including newlines from the feed) to single
/// spaces and trim.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
