//! Integration tests for paperloom-arxiv
//!
//! These tests require network access and are marked #[ignore] by default.
//! Run with: cargo test -p paperloom-arxiv --test integration -- --ignored

use std::time::Duration;

use chrono::NaiveDate;

use paperloom_arxiv::{fetch_query, ArxivClient, FetchOptions, DEFAULT_BASE_URL};
use paperloom_core::RateLimiter;

/// Fetch a handful of records from the live API and check the canonical
/// shape. Keeps the request volume tiny and respects the 3s delay.
#[test]
#[ignore]
fn fetch_small_live_query() {
    let client = ArxivClient::new(DEFAULT_BASE_URL).expect("client");
    let limiter = RateLimiter::new(Duration::from_millis(3000));

    let opts = FetchOptions {
        max_results: Some(5),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
        page_size: 5,
    };
    let records = fetch_query(&client, &limiter, "cat:cs.AI", &opts).expect("fetch should succeed");

    assert!(!records.is_empty(), "expected at least one record");
    assert!(records.len() <= 5);
    for rec in &records {
        assert!(
            rec.id.len() >= 9 && rec.id.contains('.'),
            "unexpected id shape: {}",
            rec.id
        );
        assert!(!rec.title.is_empty());
        assert!(rec.links.abs.ends_with(&rec.id));
        assert_eq!(rec.year(), Some(2024));
    }
}

/// Two pages through the same query must not overlap.
#[test]
#[ignore]
fn pagination_does_not_repeat_records() {
    let client = ArxivClient::new(DEFAULT_BASE_URL).expect("client");
    let limiter = RateLimiter::new(Duration::from_millis(3000));

    let opts = FetchOptions {
        max_results: Some(6),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
        page_size: 3,
    };
    let records = fetch_query(&client, &limiter, "cat:cs.AI", &opts).expect("fetch should succeed");

    let mut ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), records.len(), "pagination returned duplicates");
}
