//! Clean command.

use std::path::PathBuf;

use console::style;

use crate::cli::helpers::{banner, clean_jobs, finished};
use crate::config::Settings;
use crate::storage;

/// Normalize the raw CSV and write the processed outputs.
pub async fn cmd_clean(settings: &Settings, input: Option<PathBuf>) -> anyhow::Result<()> {
    let started = banner("Cleaning job data");
    let input = input.unwrap_or_else(|| settings.raw_jobs_path());
    let raw = storage::read_raw_jobs(&input)?;
    println!(
        "{} Loaded {} raw records from {}",
        style("→").cyan(),
        raw.len(),
        input.display()
    );
    clean_jobs(settings, raw)?;
    finished(started);
    Ok(())
}
