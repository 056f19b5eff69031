//! Rendering pages through a worker-owned browser session.
//!
//! Each crawl worker owns one [`PageSession`] for its whole lifetime and
//! reuses it for every listing and detail page it visits. [`fetch_page`]
//! wraps a session with retries and linear backoff and never fails: an
//! exhausted fetch is reported as `None`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::FetchError;

/// Selector whose presence marks a rendered listing page.
pub const LISTING_READY_SELECTOR: &str = "div.job-item";

/// How a page is driven after navigation, before its HTML is captured.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    /// Element to wait for. A missed wait is logged and rendering continues.
    pub wait_selector: Option<String>,
    pub wait_budget: Duration,
    /// Incremental scrolls, each to `i / scroll_steps` of the page height.
    pub scroll_steps: u32,
    pub scroll_pause: Duration,
    /// Run the bottom, top, bottom pass after the incremental scrolls.
    pub final_pass: bool,
    /// Click visible buttons whose text contains "more".
    pub click_load_more: bool,
}

/// Render plan plus retry policy for one kind of page.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    pub plan: RenderPlan,
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Sleep before retry `n` (1-based) is `n * backoff_step`.
    pub backoff_step: Duration,
}

impl FetchOptions {
    fn standard(wait_secs: u64, scroll_steps: u32) -> Self {
        Self {
            plan: RenderPlan {
                wait_selector: Some(LISTING_READY_SELECTOR.to_string()),
                wait_budget: Duration::from_secs(wait_secs),
                scroll_steps,
                scroll_pause: Duration::from_millis(800),
                final_pass: true,
                click_load_more: false,
            },
            retries: 2,
            backoff_step: Duration::from_secs(2),
        }
    }

    /// Search-results page.
    pub fn listing() -> Self {
        Self::standard(10, 7)
    }

    /// Single job detail page.
    pub fn detail() -> Self {
        Self::standard(8, 5)
    }

    /// One-shot escalation for a listing page that came back short.
    pub fn aggressive_listing() -> Self {
        Self {
            plan: RenderPlan {
                wait_selector: Some(LISTING_READY_SELECTOR.to_string()),
                wait_budget: Duration::from_secs(15),
                scroll_steps: 10,
                scroll_pause: Duration::from_secs(1),
                final_pass: false,
                click_load_more: true,
            },
            retries: 0,
            backoff_step: Duration::from_secs(2),
        }
    }

    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }
}

/// A long-lived rendering context owned by a single worker.
#[async_trait]
pub trait PageSession: Send {
    /// Navigate to `url`, drive it per `plan` and return the page HTML.
    async fn render(&mut self, url: &str, plan: &RenderPlan) -> Result<String, FetchError>;

    /// Release the session. Called once, at worker teardown.
    async fn close(&mut self);
}

/// Creates one session per crawl worker.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self) -> Result<Box<dyn PageSession>, FetchError>;
}

/// Render `url` with retries. Returns `None` once all attempts fail.
pub async fn fetch_page(
    session: &mut dyn PageSession,
    url: &str,
    options: &FetchOptions,
) -> Option<String> {
    let attempts = options.retries + 1;
    for attempt in 1..=attempts {
        match session.render(url, &options.plan).await {
            Ok(html) => {
                debug!("Rendered {} ({} bytes)", url, html.len());
                return Some(html);
            }
            Err(e) if attempt < attempts => {
                let wait = options.backoff_step * attempt;
                warn!(
                    "Error fetching {}: {}. Retrying in {:?} (attempt {}/{})",
                    url, e, wait, attempt, options.retries
                );
                tokio::time::sleep(wait).await;
            }
            Err(e) => {
                warn!(
                    "Failed to fetch {} after {} retries: {}",
                    url, options.retries, e
                );
            }
        }
    }
    None
}
