//! Crawl service configuration, results and errors.

use std::time::Duration;

use thiserror::Error;

use crate::config::Settings;
use crate::models::RawJobRecord;
use crate::scrapers::{FetchError, FetchOptions};

/// Configuration for a crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: String,
    pub max_pages: usize,
    /// Target for the deduplicated job count; the final output is truncated to it.
    pub max_jobs: usize,
    /// Jobs taken per listing page, also the count below which a page is re-rendered.
    pub max_jobs_per_page: usize,
    pub workers: usize,
    /// Randomized pause between consecutive detail pages.
    pub listing_delay: (Duration, Duration),
    pub listing: FetchOptions,
    pub escalation: FetchOptions,
    pub detail: FetchOptions,
}

impl CrawlConfig {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            max_pages: 10,
            max_jobs: 600,
            max_jobs_per_page: 60,
            workers: 4,
            listing_delay: (Duration::from_millis(100), Duration::from_millis(300)),
            listing: FetchOptions::listing(),
            escalation: FetchOptions::aggressive_listing(),
            detail: FetchOptions::detail(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let [min_delay, max_delay] = settings.listing_delay_ms;
        Self {
            max_pages: settings.max_pages,
            max_jobs: settings.max_jobs,
            max_jobs_per_page: settings.max_jobs_per_page,
            workers: settings.workers,
            listing_delay: (
                Duration::from_millis(min_delay),
                Duration::from_millis(max_delay),
            ),
            ..Self::new(settings.base_url.clone())
        }
    }

    /// Drop retry backoff and courtesy delays.
    pub fn without_delays(mut self) -> Self {
        self.listing_delay = (Duration::ZERO, Duration::ZERO);
        self.listing = self.listing.with_backoff_step(Duration::ZERO);
        self.escalation = self.escalation.with_backoff_step(Duration::ZERO);
        self.detail = self.detail.with_backoff_step(Duration::ZERO);
        self
    }
}

/// Result of a crawl run.
#[derive(Debug)]
pub struct CrawlReport {
    /// Deduplicated, validated records, in merge order.
    pub jobs: Vec<RawJobRecord>,
    /// Listing pages generated from the start URL.
    pub pages: usize,
    /// Pages whose task panicked.
    pub failed_pages: usize,
    /// Records dropped because their link was already collected.
    pub duplicates: usize,
    /// Records dropped by the final description/requirements check.
    pub invalid: usize,
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid start URL {url}: {reason}")]
    InvalidStartUrl { url: String, reason: String },
    #[error("No browser session could be created: {0}")]
    NoSessions(#[source] FetchError),
}
