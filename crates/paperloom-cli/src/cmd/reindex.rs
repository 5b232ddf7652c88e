//! Reindex subcommand - rebuild the index from existing partitions

use std::process::ExitCode;

use anyhow::Result;

use paperloom_core::YearStore;

use crate::config::Config;

pub fn run(config: &Config) -> Result<ExitCode> {
    let store = YearStore::new(&config.data.dir)?;
    super::rebuild_index(config, &store)?;
    Ok(ExitCode::SUCCESS)
}
