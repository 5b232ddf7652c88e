//! Status subcommand - store, index, and curation stats

use std::process::ExitCode;

use anyhow::Result;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use paperloom_core::{BlockList, Index, SavedList, YearStore};

use crate::config::Config;

pub fn run(config: &Config) -> Result<ExitCode> {
    let store = YearStore::new(&config.data.dir)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Year").fg(Color::Cyan),
            Cell::new("Papers").fg(Color::Cyan),
        ]);

    let mut total = 0usize;
    let mut years = store.years()?;
    years.reverse();
    for year in years {
        let papers = store.load(year)?;
        total += papers.len();
        table.add_row(vec![year.to_string(), papers.len().to_string()]);
    }
    table.add_row(vec!["total".to_string(), total.to_string()]);
    eprintln!("\n{table}");

    let index_path = config.index_path();
    if index_path.exists() {
        let index = Index::read_from(&index_path)?;
        eprintln!(
            "index: {} papers, {} categories in use, last updated {}",
            index.meta.total_papers,
            index.meta.categories.len(),
            index.meta.last_updated
        );
    } else {
        eprintln!("index: not built yet");
    }

    let blocked = BlockList::load(&config.data.blocklist_file)?;
    let saved = SavedList::load(&config.data.savedlist_file)?;
    eprintln!(
        "curation: {} blocked, {} saved",
        blocked.blocked.len(),
        saved.saved.len()
    );

    Ok(ExitCode::SUCCESS)
}
