//! Keyword-based multi-label classification
//!
//! Pure over its inputs: identical (record, categories, threshold) always
//! yields identical labels in identical order, so recategorization can run
//! repeatedly while a user edits keyword sets.

use crate::category::CategorySet;
use crate::record::PaperRecord;

/// Labels for one title+abstract, ordered by descending keyword hit count.
/// Ties keep category definition order.
pub fn labels_for(
    title: &str,
    abstract_text: &str,
    categories: &CategorySet,
    threshold: usize,
) -> Vec<String> {
    let text = format!("{title} {abstract_text}").to_lowercase();
    let mut hits: Vec<(usize, &str)> = categories
        .iter()
        .filter_map(|cat| {
            let count = cat
                .keywords
                .iter()
                .filter(|kw| text.contains(kw.as_str()))
                .count();
            (count >= threshold.max(1)).then_some((count, cat.id.as_str()))
        })
        .collect();
    // stable sort: equal counts keep definition order
    hits.sort_by_key(|(count, _)| std::cmp::Reverse(*count));
    hits.into_iter().map(|(_, id)| id.to_string()).collect()
}

/// Assign `categories` and `tags.auto` for a whole batch.
pub fn categorize(records: &mut [PaperRecord], categories: &CategorySet, threshold: usize) {
    for rec in records {
        let labels = labels_for(&rec.title, &rec.abstract_text, categories, threshold);
        rec.categories = labels.clone();
        rec.tags.auto = labels;
    }
}
