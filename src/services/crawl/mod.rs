//! Concurrent multi-page crawl.
//!
//! A fixed pool of workers pulls listing-page URLs from a shared queue. Each
//! worker owns one browser session for its lifetime and, for every page it
//! takes, renders the listing, then visits each listing's detail page in
//! order. Finished pages are sent to a single merge loop which deduplicates by
//! job link and stops the pool once the job target is reached.

mod types;

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use rand::Rng;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::models::{JobDetail, RawJobRecord};
use crate::scrapers::careerviet::{extract_detail, extract_listings, page_urls};
use crate::scrapers::{fetch_page, PageSession, SessionFactory};

pub use types::{CrawlConfig, CrawlError, CrawlReport};

/// Jobs produced by one listing page, or the panic that ended its task.
struct PageOutcome {
    url: String,
    jobs: Result<Vec<RawJobRecord>, String>,
}

/// Service crawling listing pages with a pool of browser-backed workers.
pub struct CrawlService {
    factory: Arc<dyn SessionFactory>,
    config: Arc<CrawlConfig>,
}

impl CrawlService {
    pub fn new(factory: Arc<dyn SessionFactory>, config: CrawlConfig) -> Self {
        Self {
            factory,
            config: Arc::new(config),
        }
    }

    /// Create one session per worker, up front.
    ///
    /// Fails only if not a single session could be created.
    async fn create_sessions(&self, count: usize) -> Result<Vec<Box<dyn PageSession>>, CrawlError> {
        let mut sessions = Vec::with_capacity(count);
        let mut last_error = None;
        for worker_id in 0..count {
            match self.factory.create().await {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    warn!("Worker {} could not start a browser session: {}", worker_id, e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if sessions.is_empty() => Err(CrawlError::NoSessions(e)),
            _ => Ok(sessions),
        }
    }

    /// Crawl from the configured start URL.
    pub async fn crawl(&self) -> Result<CrawlReport, CrawlError> {
        let config = self.config.clone();
        Url::parse(&config.start_url).map_err(|e| CrawlError::InvalidStartUrl {
            url: config.start_url.clone(),
            reason: e.to_string(),
        })?;

        let pages = page_urls(&config.start_url, config.max_pages);
        let target = config
            .max_jobs
            .min(config.max_jobs_per_page.saturating_mul(pages.len()));
        let worker_count = config.workers.clamp(1, pages.len().max(1));
        info!(
            "Crawling {} pages with {} workers for up to {} jobs",
            pages.len(),
            worker_count,
            target
        );

        let sessions = self.create_sessions(worker_count).await?;

        let queue = Arc::new(Mutex::new(pages.iter().cloned().collect::<VecDeque<_>>()));
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::channel::<PageOutcome>(pages.len().max(1));

        let mut handles = Vec::with_capacity(sessions.len());
        for (worker_id, session) in sessions.into_iter().enumerate() {
            let queue = queue.clone();
            let stop = stop.clone();
            let tx = tx.clone();
            let config = config.clone();
            handles.push(tokio::spawn(run_worker(
                worker_id, session, queue, stop, tx, config,
            )));
        }
        drop(tx);

        let mut jobs = Vec::new();
        let mut seen_links = HashSet::new();
        let mut duplicates = 0;
        let mut failed_pages = 0;

        while let Some(outcome) = rx.recv().await {
            let page_jobs = match outcome.jobs {
                Ok(page_jobs) => page_jobs,
                Err(panic) => {
                    error!("Page task for {} failed: {}", outcome.url, panic);
                    failed_pages += 1;
                    continue;
                }
            };

            let received = page_jobs.len();
            let mut added = 0;
            for job in page_jobs {
                if seen_links.insert(job.job_link.clone()) {
                    jobs.push(job);
                    added += 1;
                } else {
                    duplicates += 1;
                }
            }
            info!(
                "Page {}: {} jobs, {} new, {} total",
                outcome.url,
                received,
                added,
                jobs.len()
            );

            if jobs.len() >= config.max_jobs {
                info!(
                    "Reached target of {} jobs, skipping remaining pages",
                    config.max_jobs
                );
                break;
            }
        }

        // Workers finish the page they are on, then exit and close their sessions.
        stop.store(true, Ordering::SeqCst);
        drop(rx);
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Crawl worker ended abnormally: {}", e);
            }
        }

        jobs.truncate(config.max_jobs);
        let collected = jobs.len();
        jobs.retain(|job| {
            let valid = job.has_valid_text();
            if !valid {
                warn!(
                    "Dropping job with empty description or requirements: {}",
                    job.job_title
                );
            }
            valid
        });
        let invalid = collected - jobs.len();

        info!(
            "Collected {} unique jobs, {} valid ({} duplicates, {} failed pages)",
            collected,
            jobs.len(),
            duplicates,
            failed_pages
        );

        Ok(CrawlReport {
            jobs,
            pages: pages.len(),
            failed_pages,
            duplicates,
            invalid,
        })
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "page task panicked".to_string()
    }
}

async fn run_worker(
    worker_id: usize,
    mut session: Box<dyn PageSession>,
    queue: Arc<Mutex<VecDeque<String>>>,
    stop: Arc<AtomicBool>,
    tx: mpsc::Sender<PageOutcome>,
    config: Arc<CrawlConfig>,
) {
    loop {
        if stop.load(Ordering::SeqCst) {
            debug!("Worker {} stopping: job target reached", worker_id);
            break;
        }
        let Some(url) = queue.lock().await.pop_front() else {
            break;
        };

        let jobs = AssertUnwindSafe(scrape_page(session.as_mut(), &url, &config))
            .catch_unwind()
            .await
            .map_err(panic_message);

        if tx.send(PageOutcome { url, jobs }).await.is_err() {
            break;
        }
    }

    session.close().await;
    debug!("Worker {} closed its session", worker_id);
}

async fn courtesy_delay(range: (Duration, Duration)) {
    let (min, max) = range;
    if max.is_zero() {
        return;
    }
    let millis = {
        let (lo, hi) = (min.as_millis() as u64, max.as_millis() as u64);
        rand::rng().random_range(lo.min(hi)..=hi.max(lo))
    };
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// Scrape one listing page and every detail page it links to.
async fn scrape_page(
    session: &mut dyn PageSession,
    page_url: &str,
    config: &CrawlConfig,
) -> Vec<RawJobRecord> {
    info!("Scraping page: {}", page_url);
    let Some(html) = fetch_page(session, page_url, &config.listing).await else {
        warn!("Failed to load listing page {}", page_url);
        return Vec::new();
    };

    let mut listings = extract_listings(&html, page_url);
    info!("Found {} job listings on {}", listings.len(), page_url);

    if listings.len() < config.max_jobs_per_page {
        info!(
            "Fewer jobs than expected ({} < {}), re-rendering {}",
            listings.len(),
            config.max_jobs_per_page,
            page_url
        );
        if let Some(html) = fetch_page(session, page_url, &config.escalation).await {
            let retried = extract_listings(&html, page_url);
            info!("After aggressive rendering, found {} job listings", retried.len());
            if retried.len() > listings.len() {
                listings = retried;
            }
        }
    }

    listings.truncate(config.max_jobs_per_page);

    let mut seen = HashSet::new();
    let mut jobs = Vec::new();
    for listing in listings {
        if !listing.has_link() || !seen.insert(listing.link.clone()) {
            continue;
        }

        let detail = match fetch_page(session, &listing.link, &config.detail).await {
            Some(html) => extract_detail(&html),
            None => JobDetail::unavailable(),
        };
        jobs.push(listing.into_record(detail));

        courtesy_delay(config.listing_delay).await;
    }

    info!("Processed {} jobs from {}", jobs.len(), page_url);
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::{FetchError, RenderPlan};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;

    fn listing_page(ids: &[u32]) -> String {
        let items: String = ids
            .iter()
            .map(|id| {
                format!(
                    r#"<div class="job-item"><div class="title">Data Analyst {id}</div>
                       <a class="job_link" href="/vi/tim-viec-lam/job-{id}.html">x</a></div>"#
                )
            })
            .collect();
        format!("<html><body>{}</body></html>", items)
    }

    /// Serves the first listing page; panics on the second one.
    struct ScriptedSession {
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageSession for ScriptedSession {
        async fn render(&mut self, url: &str, _plan: &RenderPlan) -> Result<String, FetchError> {
            if url.contains("trang-2") {
                panic!("renderer crashed");
            }
            if url.ends_with("data-k-vi.html") {
                return Ok(listing_page(&[1, 2, 3]));
            }
            Ok("<html><body><p>detail</p></body></html>".to_string())
        }

        async fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Factory {
        fail: bool,
        created: AtomicUsize,
        closes: Arc<AtomicUsize>,
    }

    impl Factory {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                created: AtomicUsize::new(0),
                closes: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl SessionFactory for Factory {
        async fn create(&self) -> Result<Box<dyn PageSession>, FetchError> {
            if self.fail {
                return Err(FetchError::Launch("chrome not found".to_string()));
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedSession {
                closes: self.closes.clone(),
            }))
        }
    }

    /// Shows two jobs on the listing page unless asked to click "load more",
    /// which reveals five.
    struct ShortListingSession {
        load_more_plans: Arc<StdMutex<Vec<bool>>>,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageSession for ShortListingSession {
        async fn render(&mut self, url: &str, plan: &RenderPlan) -> Result<String, FetchError> {
            if url.ends_with("data-k-vi.html") {
                self.load_more_plans.lock().unwrap().push(plan.click_load_more);
                return Ok(if plan.click_load_more {
                    listing_page(&[1, 2, 3, 4, 5])
                } else {
                    listing_page(&[1, 2])
                });
            }
            Ok("<html><body><p>detail</p></body></html>".to_string())
        }

        async fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct ShortListingFactory {
        load_more_plans: Arc<StdMutex<Vec<bool>>>,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SessionFactory for ShortListingFactory {
        async fn create(&self) -> Result<Box<dyn PageSession>, FetchError> {
            Ok(Box::new(ShortListingSession {
                load_more_plans: self.load_more_plans.clone(),
                closes: self.closes.clone(),
            }))
        }
    }

    fn config() -> CrawlConfig {
        let mut config = CrawlConfig::new("https://careerviet.vn/viec-lam/data-k-vi.html");
        config.max_pages = 2;
        config.max_jobs = 100;
        config.max_jobs_per_page = 3;
        config.workers = 2;
        config.without_delays()
    }

    #[tokio::test]
    async fn test_panicking_page_contributes_nothing() {
        let service = CrawlService::new(Arc::new(Factory::new(false)), config());
        let report = service.crawl().await.unwrap();
        assert_eq!(report.pages, 2);
        assert_eq!(report.failed_pages, 1);
        assert_eq!(report.jobs.len(), 3);
        // detail pages without content still yield sentinel text
        assert!(report.jobs.iter().all(|j| j.has_valid_text()));
    }

    #[tokio::test]
    async fn test_every_session_is_closed_after_a_panic() {
        let factory = Arc::new(Factory::new(false));
        let mut config = config();
        config.workers = 4;
        let service = CrawlService::new(factory.clone(), config);
        let report = service.crawl().await.unwrap();

        assert_eq!(report.failed_pages, 1);
        // worker count is clamped to the number of pages
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert_eq!(factory.closes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_short_listing_is_rerendered_once() {
        let load_more_plans = Arc::new(StdMutex::new(Vec::new()));
        let closes = Arc::new(AtomicUsize::new(0));
        let factory = ShortListingFactory {
            load_more_plans: load_more_plans.clone(),
            closes: closes.clone(),
        };
        let mut config = config();
        config.max_pages = 1;
        config.max_jobs_per_page = 5;
        let service = CrawlService::new(Arc::new(factory), config);
        let report = service.crawl().await.unwrap();

        assert_eq!(*load_more_plans.lock().unwrap(), vec![false, true]);
        assert_eq!(report.jobs.len(), 5);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_full_listing_is_not_rerendered() {
        let load_more_plans = Arc::new(StdMutex::new(Vec::new()));
        let factory = ShortListingFactory {
            load_more_plans: load_more_plans.clone(),
            closes: Arc::new(AtomicUsize::new(0)),
        };
        let mut config = config();
        config.max_pages = 1;
        config.max_jobs_per_page = 2;
        let service = CrawlService::new(Arc::new(factory), config);
        let report = service.crawl().await.unwrap();

        assert_eq!(*load_more_plans.lock().unwrap(), vec![false]);
        assert_eq!(report.jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_no_sessions_is_fatal() {
        let service = CrawlService::new(Arc::new(Factory::new(true)), config());
        let err = service.crawl().await.unwrap_err();
        assert!(matches!(err, CrawlError::NoSessions(_)));
    }

    #[tokio::test]
    async fn test_invalid_start_url() {
        let mut config = config();
        config.start_url = "not a url".to_string();
        let service = CrawlService::new(Arc::new(Factory::new(false)), config);
        assert!(matches!(
            service.crawl().await,
            Err(CrawlError::InvalidStartUrl { .. })
        ));
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("boom".to_string())), "boom");
        assert_eq!(panic_message(Box::new(42)), "page task panicked");
    }
}
