//! Raw entry → canonical record conversion

use std::sync::LazyLock;

use regex::Regex;

use paperloom_core::record::{collapse_ws, Author, Links, PaperRecord, Tags};

use crate::parser::RawEntry;

/// Trailing new-style arXiv id, optional version suffix discarded.
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}\.\d{4,5})(?:v\d+)?$").expect("invalid id regex"));

pub const ABS_BASE_URL: &str = "https://arxiv.org/abs";

/// An entry whose canonical identifier cannot be extracted. Not retried:
/// it indicates an upstream format change, not a transient failure.
#[derive(Debug)]
pub struct MalformedRecord {
    pub id_url: String,
}

impl std::fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot extract arXiv id from {:?}", self.id_url)
    }
}

impl std::error::Error for MalformedRecord {}

/// Extract the version-stripped id from an identifier URL.
pub fn extract_id(id_url: &str) -> Result<String, MalformedRecord> {
    ID_RE
        .captures(id_url)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| MalformedRecord {
            id_url: id_url.to_string(),
        })
}

/// Convert one raw entry into a canonical record. `fetched_at` is stamped
/// by the caller so one page shares a single ingestion timestamp.
pub fn normalize_entry(entry: &RawEntry, fetched_at: &str) -> Result<PaperRecord, MalformedRecord> {
    let id = extract_id(&entry.id_url)?;

    let authors = entry
        .authors
        .iter()
        .map(|a| Author {
            name: collapse_ws(&a.name),
            affiliation: a.affiliation.as_deref().map(collapse_ws),
        })
        .collect();

    let pdf = entry
        .links
        .iter()
        .find(|l| l.title.as_deref() == Some("pdf"))
        .or_else(|| {
            entry
                .links
                .iter()
                .find(|l| l.mime_type.as_deref() == Some("application/pdf"))
        })
        .map(|l| l.href.clone());

    let primary_category = entry
        .primary_category
        .clone()
        .or_else(|| entry.categories.first().cloned());

    Ok(PaperRecord {
        title: collapse_ws(&entry.title),
        abstract_text: collapse_ws(&entry.summary),
        authors,
        published: entry.published.clone(),
        updated: entry.updated.clone(),
        source_categories: entry.categories.clone(),
        primary_category,
        links: Links {
            pdf,
            abs: format!("{ABS_BASE_URL}/{id}"),
        },
        categories: Vec::new(),
        tags: Tags::default(),
        fetched_at: fetched_at.to_string(),
        id,
    })
}
