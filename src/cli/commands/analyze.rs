//! Analyze command.

use std::path::PathBuf;

use console::style;

use crate::cli::helpers::{analyze_jobs, banner, finished};
use crate::config::Settings;
use crate::storage;

/// Tag skills in the analyst CSV and write the count tables.
pub async fn cmd_analyze(
    settings: &Settings,
    input: Option<PathBuf>,
    translate: bool,
) -> anyhow::Result<()> {
    let started = banner("Analyzing skills");
    let input = input.unwrap_or_else(|| settings.analyst_jobs_path());
    let jobs = storage::read_normalized_jobs(&input)?;
    println!(
        "{} Loaded {} analyst jobs from {}",
        style("→").cyan(),
        jobs.len(),
        input.display()
    );
    analyze_jobs(settings, jobs, translate).await?;
    finished(started);
    Ok(())
}
