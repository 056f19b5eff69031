//! Shared helpers for CLI commands.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use console::style;

use crate::config::Settings;
use crate::models::{NormalizedJobRecord, RawJobRecord, SkillCategory, SkilledJobRecord};
use crate::scrapers::BrowserSessionFactory;
use crate::services::skills::{skill_counts, translator_from_config, NoopTranslator, Translator};
use crate::services::{
    CrawlConfig, CrawlReport, CrawlService, JobNormalizer, SkillExtractor, SkillVocabulary,
    TitleFilter,
};
use crate::storage;

/// Print a step banner and start its timer.
pub fn banner(title: &str) -> Instant {
    println!("\n{}", style(title).bold());
    println!("{}", "-".repeat(40));
    Instant::now()
}

pub fn finished(started: Instant) {
    println!(
        "{} Done in {}",
        style("✓").green(),
        format_elapsed(started.elapsed())
    );
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

pub fn wrote(path: &Path, rows: usize) {
    println!(
        "  {} {} rows → {}",
        style("→").dim(),
        rows,
        path.display()
    );
}

/// Crawl with browser sessions and write the raw CSV.
pub async fn scrape_jobs(
    settings: &Settings,
    config: CrawlConfig,
    output: &Path,
) -> anyhow::Result<CrawlReport> {
    println!(
        "{} Crawling {} ({} pages, {} workers)",
        style("→").cyan(),
        config.start_url,
        config.max_pages,
        config.workers
    );

    let factory = Arc::new(BrowserSessionFactory::new(settings.browser.clone()));
    let report = CrawlService::new(factory, config).crawl().await?;

    if report.failed_pages > 0 {
        println!(
            "{} {} listing pages failed",
            style("!").yellow(),
            report.failed_pages
        );
    }
    println!(
        "  {} {} jobs ({} duplicates, {} without text dropped)",
        style("✓").green(),
        report.jobs.len(),
        report.duplicates,
        report.invalid
    );

    storage::write_raw_jobs(output, &report.jobs)?;
    wrote(output, report.jobs.len());
    Ok(report)
}

/// Normalize raw jobs and write the processed, data-job and analyst CSVs.
///
/// Returns the analyst subset.
pub fn clean_jobs(
    settings: &Settings,
    raw: Vec<RawJobRecord>,
) -> anyhow::Result<Vec<NormalizedJobRecord>> {
    let received = raw.len();
    let normalizer = JobNormalizer::new(settings.usd_to_vnd_rate);
    let processed = normalizer.normalize(raw);
    println!(
        "  {} {} of {} records after normalization",
        style("✓").green(),
        processed.len(),
        received
    );
    storage::write_normalized_jobs(&settings.processed_jobs_path(), &processed)?;
    wrote(&settings.processed_jobs_path(), processed.len());

    let data_jobs = TitleFilter::new(settings.data_keywords.as_slice())?.apply(&processed);
    storage::write_normalized_jobs(&settings.filtered_jobs_path(), &data_jobs)?;
    wrote(&settings.filtered_jobs_path(), data_jobs.len());

    let analyst_jobs = TitleFilter::new(settings.analyst_keywords.as_slice())?.apply(&data_jobs);
    storage::write_normalized_jobs(&settings.analyst_jobs_path(), &analyst_jobs)?;
    wrote(&settings.analyst_jobs_path(), analyst_jobs.len());

    Ok(analyst_jobs)
}

/// Tag skills and write the skills CSV plus one count table per category.
pub async fn analyze_jobs(
    settings: &Settings,
    jobs: Vec<NormalizedJobRecord>,
    translate: bool,
) -> anyhow::Result<Vec<SkilledJobRecord>> {
    let translator: Box<dyn Translator> = if translate {
        translator_from_config(&settings.translator)
    } else {
        Box::new(NoopTranslator)
    };

    let extractor = SkillExtractor::new(SkillVocabulary::builtin(), translator);
    let tagged = extractor.extract(jobs).await;
    storage::write_skilled_jobs(&settings.analyst_skills_path(), &tagged)?;
    wrote(&settings.analyst_skills_path(), tagged.len());

    for category in SkillCategory::ALL {
        let counts = skill_counts(&tagged, category);
        let path = settings.skill_counts_path(category);
        storage::write_skill_counts(&path, &counts)?;
        let top: Vec<String> = counts
            .iter()
            .take(5)
            .map(|c| format!("{} ({})", c.skill, c.count))
            .collect();
        println!(
            "  {} {}: {}",
            style("●").cyan(),
            category.column(),
            if top.is_empty() {
                "none".to_string()
            } else {
                top.join(", ")
            }
        );
        wrote(&path, counts.len());
    }

    Ok(tagged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 05s");
    }
}
