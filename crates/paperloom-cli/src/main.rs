//! paperloom - arXiv paper ingestion and categorization pipeline
//!
//! Fetches paper metadata for a set of topic queries, classifies it by
//! keyword, merges it into year-partitioned JSON files, and rebuilds the
//! index consumed by the browsing UI.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "paperloom")]
#[command(about = "arXiv paper ingestion and categorization pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./paperloom.toml or ~/.config/paperloom/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory from the config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Full collection over a submission date range
    Collect(cmd::collect::CollectArgs),
    /// Incremental collection over a lookback window
    Update(cmd::update::UpdateArgs),
    /// Rebuild the index from the existing partitions
    Reindex,
    /// Show store, index, and curation stats
    Status,
    /// Show current configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    paperloom_core::init_logging(cli.debug);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    paperloom_core::install_signal_handlers()?;

    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }

    match cli.command {
        Command::Collect(args) => cmd::collect::run(args, &config),
        Command::Update(args) => cmd::update::run(args, &config),
        Command::Reindex => cmd::reindex::run(&config),
        Command::Status => cmd::status::run(&config),
        Command::Config => {
            cmd::print_config(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}
