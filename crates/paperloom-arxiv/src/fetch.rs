//! Paginated fetch for a single query
//!
//! Pages through the upstream starting at offset 0, applying the rate
//! limiter before every call. An error on the first page is fatal for the
//! query; an error on a later page yields the partial results collected so
//! far.

use chrono::{NaiveDate, SecondsFormat, Utc};

use paperloom_core::ratelimit::RateLimiter;
use paperloom_core::record::PaperRecord;

use crate::client::{ApiError, QueryRequest, QuerySource, SortBy, SortOrder};
use crate::normalize::normalize_entry;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Cap on accumulated records; `None` fetches everything the query
    /// matches.
    pub max_results: Option<usize>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_results: None,
            start_date: None,
            end_date: None,
            page_size: 100,
        }
    }
}

/// The earliest submission date the upstream supports.
fn earliest_supported() -> NaiveDate {
    NaiveDate::from_ymd_opt(1991, 8, 1).expect("valid date")
}

/// Range clause covering `[start 00:00, end 23:59]`, AND-ed with the base
/// query.
pub fn date_range_clause(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "submittedDate:[{}0000 TO {}2359]",
        start.format("%Y%m%d"),
        end.format("%Y%m%d")
    )
}

/// Fetch all pages for one query, up to `max_results`.
pub fn fetch_query<S: QuerySource>(
    source: &S,
    limiter: &RateLimiter,
    query: &str,
    opts: &FetchOptions,
) -> Result<Vec<PaperRecord>, ApiError> {
    let start_date = opts.start_date.unwrap_or_else(earliest_supported);
    let end_date = opts.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let search_query = format!("({query}) AND {}", date_range_clause(start_date, end_date));

    let mut collected: Vec<PaperRecord> = Vec::new();
    let mut offset = 0usize;

    loop {
        let page_size = match opts.max_results {
            Some(max) => {
                let remaining = max.saturating_sub(collected.len());
                if remaining == 0 {
                    break;
                }
                remaining.min(opts.page_size)
            }
            None => opts.page_size,
        };

        limiter.wait();
        let req = QueryRequest {
            search_query: search_query.clone(),
            start: offset,
            max_results: page_size,
            sort_by: SortBy::SubmittedDate,
            sort_order: SortOrder::Descending,
        };
        let feed = match source.query(&req) {
            Ok(feed) => feed,
            Err(e) if offset == 0 => return Err(e),
            Err(e) => {
                log::warn!(
                    "page at offset {offset} failed, keeping {} records: {e}",
                    collected.len()
                );
                break;
            }
        };

        if feed.entries.is_empty() {
            break;
        }

        let page_len = feed.entries.len();
        let fetched_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        for entry in &feed.entries {
            match normalize_entry(entry, &fetched_at) {
                Ok(rec) => collected.push(rec),
                Err(e) => log::warn!("skipping malformed entry: {e}"),
            }
        }
        offset += page_len;

        if let Some(max) = opts.max_results {
            if collected.len() >= max {
                collected.truncate(max);
                break;
            }
        }
        if page_len < page_size {
            // short page signals end of results
            break;
        }
        if feed.total_results > 0 && offset >= feed.total_results {
            break;
        }
    }

    Ok(collected)
}
