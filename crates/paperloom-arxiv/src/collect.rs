//! Multi-query collection
//!
//! Runs the configured topic queries strictly in order (the shared rate
//! limiter serializes upstream access anyway) and dedups by id as it goes:
//! a record already returned by an earlier query is dropped. One failed
//! query never aborts the batch.

use std::collections::HashSet;

use indicatif::ProgressBar;

use paperloom_core::ratelimit::RateLimiter;
use paperloom_core::record::PaperRecord;
use paperloom_core::shutdown::is_shutdown_requested;

use crate::client::QuerySource;
use crate::fetch::{fetch_query, FetchOptions};

/// One topic query from the configuration.
#[derive(Debug, Clone)]
pub struct TopicQuery {
    pub query: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    pub fetch: FetchOptions,
    /// Cap on the number of queries run (test mode).
    pub max_queries: Option<usize>,
}

/// Run all queries and return the deduplicated union, in query order.
pub fn collect<S: QuerySource>(
    source: &S,
    limiter: &RateLimiter,
    queries: &[TopicQuery],
    opts: &CollectOptions,
    progress: Option<&ProgressBar>,
) -> Vec<PaperRecord> {
    let queries = match opts.max_queries {
        Some(n) => &queries[..n.min(queries.len())],
        None => queries,
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut collected: Vec<PaperRecord> = Vec::new();

    for topic in queries {
        if is_shutdown_requested() {
            log::warn!(
                "shutdown requested, stopping with {} records collected",
                collected.len()
            );
            break;
        }
        if let Some(pb) = progress {
            pb.set_message(topic.description.clone());
        }

        match fetch_query(source, limiter, &topic.query, &opts.fetch) {
            Ok(records) => {
                let fetched = records.len();
                let mut fresh = 0;
                for rec in records {
                    if seen.insert(rec.id.clone()) {
                        collected.push(rec);
                        fresh += 1;
                    }
                }
                log::info!(
                    "{}: {fetched} fetched, {fresh} new",
                    topic.description
                );
            }
            Err(e) => {
                log::warn!("query \"{}\" failed, skipping: {e}", topic.description);
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    collected
}
