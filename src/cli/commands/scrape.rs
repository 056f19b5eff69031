//! Scrape command.

use std::path::PathBuf;

use crate::cli::helpers::{banner, finished, scrape_jobs};
use crate::config::Settings;
use crate::services::CrawlConfig;

/// Command-line overrides of the crawl settings.
#[derive(Debug, Default)]
pub struct ScrapeOverrides {
    pub url: Option<String>,
    pub pages: Option<usize>,
    pub max_jobs: Option<usize>,
    pub per_page: Option<usize>,
    pub workers: Option<usize>,
}

impl ScrapeOverrides {
    fn apply(self, mut config: CrawlConfig) -> CrawlConfig {
        if let Some(url) = self.url {
            config.start_url = url;
        }
        if let Some(pages) = self.pages {
            config.max_pages = pages;
        }
        if let Some(max_jobs) = self.max_jobs {
            config.max_jobs = max_jobs;
        }
        if let Some(per_page) = self.per_page {
            config.max_jobs_per_page = per_page;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config
    }
}

/// Crawl the job board and write the raw CSV.
pub async fn cmd_scrape(
    settings: &Settings,
    overrides: ScrapeOverrides,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let started = banner("Scraping job listings");
    let config = overrides.apply(CrawlConfig::from_settings(settings));
    let output = output.unwrap_or_else(|| settings.raw_jobs_path());
    scrape_jobs(settings, config, &output).await?;
    finished(started);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_values() {
        let settings = Settings::default();
        let config = ScrapeOverrides {
            pages: Some(2),
            workers: Some(1),
            ..Default::default()
        }
        .apply(CrawlConfig::from_settings(&settings));
        assert_eq!(config.max_pages, 2);
        assert_eq!(config.workers, 1);
        assert_eq!(config.max_jobs, settings.max_jobs);
        assert_eq!(config.start_url, settings.base_url);
        assert_eq!(config.max_jobs_per_page, settings.max_jobs_per_page);
    }

    #[test]
    fn test_per_page_override() {
        let settings = Settings::default();
        let config = ScrapeOverrides {
            per_page: Some(10),
            ..Default::default()
        }
        .apply(CrawlConfig::from_settings(&settings));
        assert_eq!(config.max_jobs_per_page, 10);
        assert_eq!(config.max_pages, settings.max_pages);
    }
}
