//! Batch ingestion: dedup, partition by year, merge into the store
//!
//! Partition writes are independent; a run killed between them is healed by
//! the next run because the merge is idempotent.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::dedup::{deduplicate, merge};
use crate::record::PaperRecord;
use crate::shutdown::is_shutdown_requested;
use crate::store::YearStore;

#[derive(Debug, Default)]
pub struct IngestSummary {
    pub fetched: usize,
    pub unique: usize,
    pub duplicates: usize,
    pub added: usize,
    pub updated: usize,
    /// Years whose partition was written this run.
    pub years: Vec<i32>,
    /// True when a shutdown request stopped the run before all partitions
    /// were written.
    pub interrupted: bool,
}

/// Merge a categorized batch into the year store, one partition at a time.
pub fn ingest(store: &YearStore, records: Vec<PaperRecord>) -> Result<IngestSummary> {
    let mut summary = IngestSummary {
        fetched: records.len(),
        ..Default::default()
    };

    let (unique, duplicates) = deduplicate(records);
    summary.unique = unique.len();
    summary.duplicates = duplicates.len();
    for dup in &duplicates {
        log::info!(
            "duplicate {}: \"{}\" already collected as \"{}\"",
            dup.id,
            dup.title,
            dup.kept_title
        );
    }

    let mut by_year: BTreeMap<i32, Vec<PaperRecord>> = BTreeMap::new();
    for rec in unique {
        match rec.year() {
            Some(year) => by_year.entry(year).or_default().push(rec),
            None => log::warn!(
                "dropping {}: cannot derive year from published date {:?}",
                rec.id,
                rec.published
            ),
        }
    }

    for (year, batch) in by_year {
        if is_shutdown_requested() {
            log::warn!("shutdown requested, stopping before partition {year}");
            summary.interrupted = true;
            break;
        }
        let existing = store.load(year)?;
        let result = merge(existing, batch);
        store.save(year, &result.merged)?;
        log::info!(
            "partition {year}: +{} added, {} updated, {} total",
            result.added,
            result.updated,
            result.merged.len()
        );
        summary.added += result.added;
        summary.updated += result.updated;
        summary.years.push(year);
    }

    Ok(summary)
}
