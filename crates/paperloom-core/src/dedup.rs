//! In-batch deduplication and store merge
//!
//! `merge` is idempotent: applying the same incoming batch twice leaves the
//! store exactly as after the first application.

use std::collections::HashMap;

use crate::record::PaperRecord;

/// Diagnostic for a dropped in-batch duplicate.
#[derive(Debug, Clone)]
pub struct Duplicate {
    pub id: String,
    pub title: String,
    /// Title of the first-seen record that was kept.
    pub kept_title: String,
}

/// First-occurrence-wins dedup by id.
pub fn deduplicate(records: Vec<PaperRecord>) -> (Vec<PaperRecord>, Vec<Duplicate>) {
    let mut unique: Vec<PaperRecord> = Vec::with_capacity(records.len());
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for rec in records {
        match by_id.get(&rec.id) {
            Some(&idx) => duplicates.push(Duplicate {
                id: rec.id,
                title: rec.title,
                kept_title: unique[idx].title.clone(),
            }),
            None => {
                by_id.insert(rec.id.clone(), unique.len());
                unique.push(rec);
            }
        }
    }
    (unique, duplicates)
}

#[derive(Debug)]
pub struct MergeResult {
    pub merged: Vec<PaperRecord>,
    pub added: usize,
    pub updated: usize,
}

/// Merge an incoming batch into an existing partition.
///
/// Ids present on one side only are kept unconditionally. For ids on both
/// sides the incoming record wins only when strictly newer (`updated`
/// falling back to `published`), and the replacement carries the existing
/// record's manual curation forward: `tags.manual` always, and the whole
/// `categories` array whenever the existing one is non-empty.
pub fn merge(existing: Vec<PaperRecord>, incoming: Vec<PaperRecord>) -> MergeResult {
    let mut merged = existing;
    let mut by_id: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.clone(), i))
        .collect();
    let mut added = 0;
    let mut updated = 0;

    for inc in incoming {
        match by_id.get(&inc.id) {
            None => {
                by_id.insert(inc.id.clone(), merged.len());
                merged.push(inc);
                added += 1;
            }
            Some(&idx) => {
                let current = &merged[idx];
                let newer = match (inc.revised_at(), current.revised_at()) {
                    (Some(a), Some(b)) => a > b,
                    (Some(_), None) => true,
                    _ => false,
                };
                if !newer {
                    continue;
                }
                let mut replacement = inc;
                replacement.tags.manual = current.tags.manual.clone();
                if !current.categories.is_empty() {
                    replacement.categories = current.categories.clone();
                }
                merged[idx] = replacement;
                updated += 1;
            }
        }
    }

    MergeResult {
        merged,
        added,
        updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Links, Tags};

    fn record(id: &str, updated: &str) -> PaperRecord {
        PaperRecord {
            id: id.to_string(),
            title: format!("Paper {id}"),
            abstract_text: String::new(),
            authors: Vec::new(),
            published: "2024-01-01T00:00:00Z".to_string(),
            updated: updated.to_string(),
            source_categories: Vec::new(),
            primary_category: None,
            links: Links::default(),
            categories: Vec::new(),
            tags: Tags::default(),
            fetched_at: String::new(),
        }
    }

    #[test]
    fn deduplicate_first_wins() {
        let mut a = record("2401.00001", "2024-01-02T00:00:00Z");
        a.title = "First".to_string();
        let mut a2 = record("2401.00001", "2024-01-02T00:00:00Z");
        a2.title = "Second copy".to_string();
        let b = record("2401.00002", "2024-01-02T00:00:00Z");

        let (unique, dups) = deduplicate(vec![a, a2, b]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "First");
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].id, "2401.00001");
        assert_eq!(dups[0].title, "Second copy");
        assert_eq!(dups[0].kept_title, "First");
    }

    #[test]
    fn merge_adds_new_ids() {
        let existing = vec![record("2401.00001", "2024-01-02T00:00:00Z")];
        let incoming = vec![record("2401.00002", "2024-01-03T00:00:00Z")];
        let res = merge(existing, incoming);
        assert_eq!(res.added, 1);
        assert_eq!(res.updated, 0);
        assert_eq!(res.merged.len(), 2);
    }

    #[test]
    fn merge_replaces_only_strictly_newer() {
        let existing = vec![record("2401.00001", "2024-01-02T00:00:00Z")];

        let same = vec![record("2401.00001", "2024-01-02T00:00:00Z")];
        let res = merge(existing.clone(), same);
        assert_eq!(res.updated, 0);

        let older = vec![record("2401.00001", "2024-01-01T00:00:00Z")];
        let res = merge(existing.clone(), older);
        assert_eq!(res.updated, 0);

        let newer = vec![record("2401.00001", "2024-02-01T00:00:00Z")];
        let res = merge(existing, newer);
        assert_eq!(res.updated, 1);
        assert_eq!(res.merged[0].updated, "2024-02-01T00:00:00Z");
    }

    #[test]
    fn merge_preserves_manual_curation() {
        let mut old = record("2401.00001", "2024-01-02T00:00:00Z");
        old.categories = vec!["agents".to_string()];
        old.tags.manual = vec!["agents".to_string()];
        old.tags.auto = vec!["agents".to_string()];

        let mut new = record("2401.00001", "2024-02-01T00:00:00Z");
        new.categories = vec!["reasoning".to_string()];
        new.tags.auto = vec!["reasoning".to_string()];

        let res = merge(vec![old], vec![new]);
        let rec = &res.merged[0];
        assert_eq!(rec.categories, vec!["agents".to_string()]);
        assert_eq!(rec.tags.manual, vec!["agents".to_string()]);
        assert_eq!(rec.tags.auto, vec!["reasoning".to_string()]);
    }

    #[test]
    fn merge_takes_incoming_categories_when_existing_empty() {
        let old = record("2401.00001", "2024-01-02T00:00:00Z");
        let mut new = record("2401.00001", "2024-02-01T00:00:00Z");
        new.categories = vec!["reasoning".to_string()];

        let res = merge(vec![old], vec![new]);
        assert_eq!(res.merged[0].categories, vec!["reasoning".to_string()]);
    }

    #[test]
    fn merge_is_idempotent() {
        let existing = vec![
            record("2401.00001", "2024-01-02T00:00:00Z"),
            record("2401.00002", "2024-01-02T00:00:00Z"),
        ];
        let incoming = vec![
            record("2401.00002", "2024-02-01T00:00:00Z"),
            record("2401.00003", "2024-01-05T00:00:00Z"),
        ];

        let first = merge(existing, incoming.clone());
        assert_eq!(first.added, 1);
        assert_eq!(first.updated, 1);

        let second = merge(first.merged.clone(), incoming);
        assert_eq!(second.added, 0);
        assert_eq!(second.updated, 0);
        assert_eq!(second.merged, first.merged);
    }

    #[test]
    fn merge_unparsable_incoming_date_never_replaces() {
        let existing = vec![record("2401.00001", "2024-01-02T00:00:00Z")];
        let mut bad = record("2401.00001", "garbage");
        bad.published = "garbage".to_string();
        let res = merge(existing, vec![bad]);
        assert_eq!(res.updated, 0);
        assert_eq!(res.merged[0].updated, "2024-01-02T00:00:00Z");
    }
}
