//! Browser-backed page sessions for the JavaScript-rendered job board.
//!
//! Uses chromiumoxide (CDP). Each session owns one Chrome instance, or one
//! connection to a remote DevTools endpoint, and renders pages in fresh tabs.

mod config;

pub use config::{BrowserEngineConfig, DEFAULT_USER_AGENT};

use async_trait::async_trait;

use super::error::FetchError;
use super::fetch::{PageSession, SessionFactory};

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use super::fetch::RenderPlan;

/// Clicks visible, enabled buttons mentioning "more" and returns how many were clicked.
#[cfg(feature = "browser")]
const CLICK_LOAD_MORE_SCRIPT: &str = r#"
    (() => {
        let clicked = 0;
        for (const button of document.querySelectorAll('button')) {
            const visible = button.offsetParent !== null;
            if (visible && !button.disabled && button.textContent.includes('more')) {
                button.click();
                clicked += 1;
            }
        }
        return clicked;
    })()
"#;

#[cfg(feature = "browser")]
fn scroll_script(fraction: f64) -> String {
    format!(
        "window.scrollTo(0, document.body.scrollHeight * {});",
        fraction
    )
}

/// A single Chrome instance owned by one crawl worker.
#[cfg(feature = "browser")]
pub struct BrowserSession {
    config: BrowserEngineConfig,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    remote: bool,
}

#[cfg(feature = "browser")]
impl BrowserSession {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Find Chrome executable.
    fn find_chrome() -> Result<std::path::PathBuf, FetchError> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        // Check if in PATH via `which`
        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        debug!("Found Chrome in PATH: {}", path);
                        return Ok(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        Err(FetchError::Launch(
            "Chrome/Chromium not found. Install it or set BROWSER_URL to a remote DevTools endpoint"
                .to_string(),
        ))
    }

    /// Launch a browser, or connect to the configured remote one.
    pub async fn start(config: BrowserEngineConfig) -> Result<Self, FetchError> {
        if let Some(remote_url) = config.remote_url.clone() {
            return Self::connect_remote(config, &remote_url).await;
        }

        info!("Launching browser (headless={})", config.headless);
        let chrome_path = Self::find_chrome()?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(config.timeout));

        // with_head means NOT headless
        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--blink-settings=imagesEnabled=false")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-sandbox")
            .arg("--disable-extensions")
            .arg("--disable-notifications")
            .arg("--disable-popup-blocking")
            .arg(format!("--user-agent={}", config.user_agent));

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let browser_config = builder
            .build()
            .map_err(|e| FetchError::Launch(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            config,
            browser: Some(browser),
            handler: Some(handler),
            remote: false,
        })
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(config: BrowserEngineConfig, url: &str) -> Result<Self, FetchError> {
        info!(
            "Connecting to remote browser at {} (timeout: {}s)",
            url, config.timeout
        );

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let launch_err = |e: reqwest::Error| FetchError::Launch(e.to_string());
        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .map_err(launch_err)?
            .json()
            .await
            .map_err(launch_err)?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| FetchError::Launch("No webSocketDebuggerUrl in response".to_string()))?;

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(config.timeout),
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            config,
            browser: Some(browser),
            handler: Some(handler),
            remote: true,
        })
    }

    async fn wait_for_selector(page: &Page, selector: &str, budget: Duration) -> bool {
        let poll = async {
            loop {
                if page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
        };
        tokio::time::timeout(budget, poll).await.is_ok()
    }

    async fn run_script(page: &Page, script: String) -> Result<(), FetchError> {
        page.evaluate(script)
            .await
            .map(|_| ())
            .map_err(|e| FetchError::Script(e.to_string()))
    }

    async fn drive(&self, page: &Page, url: &str, plan: &RenderPlan) -> Result<String, FetchError> {
        let nav_err = |e: chromiumoxide::error::CdpError| FetchError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };

        page.execute(SetUserAgentOverrideParams::new(self.config.user_agent.clone()))
            .await
            .map_err(nav_err)?;

        let load_timeout = Duration::from_secs(self.config.timeout);
        match tokio::time::timeout(load_timeout, page.goto(url)).await {
            Ok(result) => {
                result.map_err(nav_err)?;
            }
            Err(_) => return Err(FetchError::Timeout(load_timeout)),
        }

        if let Some(ref selector) = plan.wait_selector {
            if !Self::wait_for_selector(page, selector, plan.wait_budget).await {
                warn!("Timeout waiting for {} on {}", selector, url);
            }
        }

        let steps = plan.scroll_steps.max(1);
        for i in 1..=plan.scroll_steps {
            Self::run_script(page, scroll_script(i as f64 / steps as f64)).await?;
            tokio::time::sleep(plan.scroll_pause).await;
        }

        if plan.final_pass {
            Self::run_script(page, scroll_script(1.0)).await?;
            tokio::time::sleep(Duration::from_secs(1)).await;
            Self::run_script(page, "window.scrollTo(0, 0);".to_string()).await?;
            tokio::time::sleep(Duration::from_millis(500)).await;
            Self::run_script(page, scroll_script(1.0)).await?;
            tokio::time::sleep(Duration::from_secs(1)).await;
        } else {
            Self::run_script(page, scroll_script(1.0)).await?;
            tokio::time::sleep(Duration::from_secs(2)).await;
        }

        if plan.click_load_more {
            match page.evaluate(CLICK_LOAD_MORE_SCRIPT.to_string()).await {
                Ok(result) => {
                    let clicked: u32 = result.into_value().unwrap_or(0);
                    if clicked > 0 {
                        info!("Clicked {} 'load more' button(s) on {}", clicked, url);
                        tokio::time::sleep(Duration::from_secs(2) * clicked).await;
                    }
                }
                Err(e) => debug!("No load more button on {}: {}", url, e),
            }
        }

        page.content().await.map_err(nav_err)
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageSession for BrowserSession {
    async fn render(&mut self, url: &str, plan: &RenderPlan) -> Result<String, FetchError> {
        let browser = self.browser.as_ref().ok_or(FetchError::Closed)?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let result = self.drive(&page, url, plan).await;

        // Close the tab whatever happened to prevent tab accumulation
        let _ = page.close().await;
        result
    }

    async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if !self.remote {
                if let Err(e) = browser.close().await {
                    debug!("Error closing browser: {}", e);
                }
                let _ = browser.wait().await;
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// Launches one [`BrowserSession`] per crawl worker.
#[derive(Debug, Clone)]
pub struct BrowserSessionFactory {
    config: BrowserEngineConfig,
}

impl BrowserSessionFactory {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl SessionFactory for BrowserSessionFactory {
    async fn create(&self) -> Result<Box<dyn PageSession>, FetchError> {
        let session = BrowserSession::start(self.config.clone()).await?;
        Ok(Box::new(session))
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl SessionFactory for BrowserSessionFactory {
    async fn create(&self) -> Result<Box<dyn PageSession>, FetchError> {
        let _ = &self.config;
        Err(FetchError::Unsupported)
    }
}
