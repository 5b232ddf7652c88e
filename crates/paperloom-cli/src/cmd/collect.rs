//! Collect subcommand - full collection over a date range

use std::process::ExitCode;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Start of the submission date range (YYYY-MM-DD)
    #[arg(long, value_parser = super::parse_date)]
    pub from: NaiveDate,

    /// End of the range (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = super::parse_date)]
    pub to: Option<NaiveDate>,

    /// Test mode: first two queries only, a handful of results each
    #[arg(long)]
    pub test: bool,
}

pub fn run(args: CollectArgs, config: &Config) -> Result<ExitCode> {
    let end = args.to.unwrap_or_else(|| Utc::now().date_naive());
    anyhow::ensure!(
        args.from <= end,
        "start date {} is after end date {end}",
        args.from
    );
    super::run_collection(config, args.from, end, args.test)
}
