//! CLI parser and command dispatch.

mod analyze;
mod clean;
mod pipeline;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;

#[derive(Parser)]
#[command(name = "jobmarket")]
#[command(about = "Scrape, normalize and analyze Vietnamese job postings")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./jobmarket.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl listing and detail pages into the raw CSV
    Scrape {
        /// First listing page (overrides config)
        #[arg(long)]
        url: Option<String>,
        /// Number of listing pages to visit
        #[arg(short, long)]
        pages: Option<usize>,
        /// Stop once this many unique jobs are collected
        #[arg(short, long)]
        max_jobs: Option<usize>,
        /// Jobs taken from each listing page
        #[arg(long)]
        per_page: Option<usize>,
        /// Concurrent browser workers
        #[arg(short, long)]
        workers: Option<usize>,
        /// Raw CSV destination
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize the raw CSV and write processed, filtered and analyst CSVs
    Clean {
        /// Raw CSV to read
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Tag skills in analyst jobs and write frequency tables
    Analyze {
        /// Analyst CSV to read
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Match skills on the original text without translating it
        #[arg(long)]
        no_translate: bool,
    },

    /// Scrape, clean and analyze in one go
    Run {
        /// Match skills on the original text without translating it
        #[arg(long)]
        no_translate: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Scrape {
            url,
            pages,
            max_jobs,
            per_page,
            workers,
            output,
        } => {
            let overrides = scrape::ScrapeOverrides {
                url,
                pages,
                max_jobs,
                per_page,
                workers,
            };
            scrape::cmd_scrape(&settings, overrides, output).await
        }
        Commands::Clean { input } => clean::cmd_clean(&settings, input).await,
        Commands::Analyze {
            input,
            no_translate,
        } => analyze::cmd_analyze(&settings, input, !no_translate).await,
        Commands::Run { no_translate } => pipeline::cmd_run(&settings, !no_translate).await,
    }
}
