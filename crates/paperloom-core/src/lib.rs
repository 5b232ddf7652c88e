//! Paperloom Core - shared infrastructure for the paper curation pipeline
//!
//! This crate provides the domain model and the pure pipeline stages:
//! classification, deduplication/merge, the year-partitioned store, and the
//! derived index. Upstream-specific fetching lives in `paperloom-arxiv`.

pub mod category;
pub mod categorize;
pub mod curation;
pub mod dedup;
pub mod index;
pub mod ingest;
pub mod logging;
pub mod ratelimit;
pub mod record;
pub mod shutdown;
pub mod store;

// Re-exports for convenience
pub use category::{Category, CategorySet};
pub use categorize::{categorize, labels_for};
pub use curation::{BlockList, SavedList};
pub use dedup::{deduplicate, merge, Duplicate, MergeResult};
pub use index::{build_index, Index, IndexEntry, IndexMeta};
pub use ingest::{ingest, IngestSummary};
pub use logging::init_logging;
pub use ratelimit::RateLimiter;
pub use record::{collapse_ws, Author, Links, PaperRecord, Tags};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown};
pub use store::{write_json_atomic, YearStore};
