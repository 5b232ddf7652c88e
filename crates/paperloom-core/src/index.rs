//! Derived cross-year index
//!
//! Disposable and rebuildable at any time from the year partitions, the
//! block-list, and nothing else. The browsing UI reads only this file.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{parse_timestamp, PaperRecord};
use crate::store::write_json_atomic;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMeta {
    pub last_updated: String,
    pub total_papers: usize,
    /// Distinct category ids actually in use, sorted.
    pub categories: Vec<String>,
    /// Distinct years present, descending.
    pub years: Vec<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub published: String,
    pub url: String,
    pub categories: Vec<String>,
    pub year: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Index {
    pub meta: IndexMeta,
    pub papers: Vec<IndexEntry>,
}

impl Index {
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self).context("writing index")
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read index {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("corrupt index {}", path.display()))
    }
}

fn project(record: &PaperRecord, year: i32) -> IndexEntry {
    IndexEntry {
        id: record.id.clone(),
        title: record.title.clone(),
        authors: record.authors.iter().map(|a| a.name.clone()).collect(),
        abstract_text: record.abstract_text.clone(),
        published: record.published.clone(),
        url: record.links.abs.clone(),
        categories: record.categories.clone(),
        year,
    }
}

/// Build the index from all partitions, excluding blocked ids.
///
/// Returns `None` when there are no partitions at all, so the caller can
/// decide to keep a previously good index instead of overwriting it.
pub fn build_index(
    partitions: &[(i32, Vec<PaperRecord>)],
    blocked: &HashSet<String>,
    now: DateTime<Utc>,
) -> Option<Index> {
    if partitions.is_empty() {
        return None;
    }

    let mut entries: Vec<IndexEntry> = partitions
        .iter()
        .flat_map(|(year, papers)| {
            papers
                .iter()
                .filter(|p| !blocked.contains(&p.id))
                .map(|p| project(p, *year))
        })
        .collect();

    // newest first; stable sort keeps original relative order on ties
    entries.sort_by(|a, b| {
        let ta = parse_timestamp(&a.published);
        let tb = parse_timestamp(&b.published);
        tb.cmp(&ta)
    });

    let categories: BTreeSet<String> = entries
        .iter()
        .flat_map(|e| e.categories.iter().cloned())
        .collect();
    let mut years: Vec<i32> = entries
        .iter()
        .map(|e| e.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    years.reverse();

    Some(Index {
        meta: IndexMeta {
            last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            total_papers: entries.len(),
            categories: categories.into_iter().collect(),
            years,
        },
        papers: entries,
    })
}
