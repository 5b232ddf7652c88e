//! Update subcommand - incremental collection over a lookback window

use std::process::ExitCode;

use anyhow::Result;
use chrono::{Days, Utc};
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Lookback window in days
    #[arg(long, default_value_t = 7)]
    pub days: u64,
}

pub fn run(args: UpdateArgs, config: &Config) -> Result<ExitCode> {
    let today = Utc::now().date_naive();
    let start = today
        .checked_sub_days(Days::new(args.days))
        .unwrap_or(today);
    log::info!("incremental update, lookback {} days", args.days);
    super::run_collection(config, start, today, false)
}
