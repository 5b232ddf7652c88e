//! Subcommand implementations and shared pipeline plumbing

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};

use paperloom_arxiv::{ArxivClient, CollectOptions, FetchOptions};
use paperloom_core::{
    categorize, ingest, is_shutdown_requested, CategorySet, IngestSummary, RateLimiter, YearStore,
};

use crate::config::Config;

pub mod collect;
pub mod reindex;
pub mod status;
pub mod update;

/// Result caps applied by `--test` runs.
const TEST_MODE_QUERIES: usize = 2;
const TEST_MODE_RESULTS: usize = 10;

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date {s:?}: {e}"))
}

/// Shared collect/update pipeline: fetch → categorize → ingest → reindex.
pub fn run_collection(
    config: &Config,
    start: NaiveDate,
    end: NaiveDate,
    test_mode: bool,
) -> Result<ExitCode> {
    let queries = config.topic_queries();
    let client = ArxivClient::new(&config.arxiv.base_url)?;
    let limiter = RateLimiter::new(Duration::from_millis(config.arxiv.delay_ms));

    let opts = CollectOptions {
        fetch: FetchOptions {
            max_results: Some(if test_mode {
                TEST_MODE_RESULTS
            } else {
                config.arxiv.max_results
            }),
            start_date: Some(start),
            end_date: Some(end),
            page_size: config.arxiv.page_size,
        },
        max_queries: test_mode.then_some(TEST_MODE_QUERIES),
    };

    log::info!(
        "collecting {} queries over {start}..{end}{}",
        opts.max_queries.unwrap_or(queries.len()).min(queries.len()),
        if test_mode { " (test mode)" } else { "" }
    );

    let pb = ProgressBar::new(queries.len().min(opts.max_queries.unwrap_or(usize::MAX)) as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );
    let mut records =
        paperloom_arxiv::collect(&client, &limiter, &queries, &opts, Some(&pb));
    pb.finish_and_clear();

    if is_shutdown_requested() {
        log::warn!("interrupted during collection, nothing written");
        return Ok(ExitCode::from(130));
    }
    if records.is_empty() {
        log::info!("nothing new to fetch for {start}..{end}");
        return Ok(ExitCode::SUCCESS);
    }

    let categories = CategorySet::load(&config.data.categories_file)?;
    categorize(&mut records, &categories, config.categorize.threshold);

    let store = YearStore::new(&config.data.dir)?;
    let summary = ingest(&store, records)?;
    print_summary(&summary);

    if summary.interrupted {
        log::warn!("interrupted before all partitions were written; next run will self-heal");
        return Ok(ExitCode::from(130));
    }

    // index rebuild only runs once every partition write has succeeded
    rebuild_index(config, &store)?;
    Ok(ExitCode::SUCCESS)
}

/// Rebuild the index from all partitions minus the block-list. Returns
/// false when there was no source data and the old index was left alone.
pub fn rebuild_index(config: &Config, store: &YearStore) -> Result<bool> {
    let partitions = store.load_all()?;
    let blocklist = paperloom_core::BlockList::load(&config.data.blocklist_file)?;
    let blocked = blocklist.id_set();

    match paperloom_core::build_index(&partitions, &blocked, chrono::Utc::now()) {
        Some(index) => {
            index.write_to(&config.index_path())?;
            log::info!(
                "index rebuilt: {} papers, {} blocked, {} years",
                index.meta.total_papers,
                blocked.len(),
                index.meta.years.len()
            );
            Ok(true)
        }
        None => {
            log::warn!("no partitions found, leaving any existing index untouched");
            Ok(false)
        }
    }
}

fn print_summary(summary: &IngestSummary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Stage").fg(Color::Cyan),
            Cell::new("Count").fg(Color::Cyan),
        ]);
    table.add_row(vec!["Fetched", &summary.fetched.to_string()]);
    table.add_row(vec!["Unique", &summary.unique.to_string()]);
    table.add_row(vec!["In-batch duplicates", &summary.duplicates.to_string()]);
    table.add_row(vec!["Added", &summary.added.to_string()]);
    table.add_row(vec!["Updated", &summary.updated.to_string()]);
    table.add_row(vec![
        "Partitions written".to_string(),
        summary
            .years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    ]);
    eprintln!("\n{table}");
}

pub fn print_config(config: &Config) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    table.add_row(vec![
        "Data directory",
        &config.data.dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Categories file",
        &config.data.categories_file.display().to_string(),
    ]);
    table.add_row(vec![
        "Block-list file",
        &config.data.blocklist_file.display().to_string(),
    ]);
    table.add_row(vec!["API base URL", &config.arxiv.base_url]);
    table.add_row(vec!["Request delay", &format!("{}ms", config.arxiv.delay_ms)]);
    table.add_row(vec!["Page size", &config.arxiv.page_size.to_string()]);
    table.add_row(vec![
        "Max results per query",
        &config.arxiv.max_results.to_string(),
    ]);
    table.add_row(vec![
        "Keyword threshold",
        &config.categorize.threshold.to_string(),
    ]);
    table.add_row(vec!["Queries", &config.queries.len().to_string()]);
    eprintln!("\n{table}");
}
