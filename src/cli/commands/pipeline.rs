//! Full pipeline: scrape, clean, analyze.

use console::style;

use crate::cli::helpers::{analyze_jobs, banner, clean_jobs, finished, format_elapsed, scrape_jobs};
use crate::config::Settings;
use crate::services::CrawlConfig;

pub async fn cmd_run(settings: &Settings, translate: bool) -> anyhow::Result<()> {
    let total = std::time::Instant::now();

    let started = banner("Scraping job listings");
    let report = scrape_jobs(
        settings,
        CrawlConfig::from_settings(settings),
        &settings.raw_jobs_path(),
    )
    .await?;
    finished(started);

    let started = banner("Cleaning job data");
    let analyst_jobs = clean_jobs(settings, report.jobs)?;
    finished(started);

    if analyst_jobs.is_empty() {
        println!("{} No analyst jobs to analyze", style("!").yellow());
        return Ok(());
    }

    let started = banner("Analyzing skills");
    analyze_jobs(settings, analyst_jobs, translate).await?;
    finished(started);

    println!(
        "\n{} Pipeline finished in {}",
        style("✓").green().bold(),
        format_elapsed(total.elapsed())
    );
    Ok(())
}
