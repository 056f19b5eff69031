//! Configuration management.
//!
//! Settings come from an optional TOML file, then environment overrides.
//! Every key has a default so an empty or missing file is valid.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::SkillCategory;
use crate::scrapers::browser::BrowserEngineConfig;

/// Config file looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "jobmarket.toml";

/// Job-title keywords marking a data-related posting.
pub const DATA_KEYWORDS: &[&str] = &[
    "Data",
    "Analyst",
    "Phân Tích",
    "Dữ Liệu",
    "Intelligence",
    "Machine Learning",
    "Scientist",
    "Công Nghệ",
    "Ai",
    "Statistics",
    "Research",
    "Researcher",
    "Ecommerce",
    "Digital",
    "Nghiên Cứu",
    "Crm",
    "Erp",
    "Sap",
    "System",
    "Database",
    "Bi",
    "Sql",
    "Python",
    "Etl",
    "Insights",
    "Analytics",
    "Artificial Intelligence",
    "Clustering",
    "Regression",
    "Dashboard",
    "Excel",
    "Power Bi",
    "Visualization",
    "Reporting",
    "Forecasting",
    "Quantitative",
    "Modelling",
    "Dự Báo",
    "Báo Cáo",
    "Mining",
    "Analysis",
    "Analytic",
    "Labeling",
    "Platform",
    "Số Liệu",
    "Automation",
    "Cntt",
    "Software Engineer",
];

/// Job-title keywords marking an analyst posting.
pub const ANALYST_KEYWORDS: &[&str] = &["Analyst", "Phân Tích"];

/// Translation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Translate Vietnamese requirements before skill matching.
    pub enabled: bool,
    /// LibreTranslate-compatible base URL (e.g. "http://localhost:5000").
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            api_key: None,
            timeout: 30,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// First listing page of the crawl.
    pub base_url: String,
    pub max_pages: usize,
    /// Global cap on collected jobs.
    pub max_jobs: usize,
    /// Jobs taken from a single listing page.
    pub max_jobs_per_page: usize,
    /// Number of concurrent crawl workers, each with its own browser session.
    pub workers: usize,
    pub usd_to_vnd_rate: f64,
    /// Root of the `raw/` and `processed/` directories.
    pub data_dir: PathBuf,
    pub data_keywords: Vec<String>,
    pub analyst_keywords: Vec<String>,
    /// Randomized pause between detail pages, as `[min, max]` milliseconds.
    pub listing_delay_ms: [u64; 2],
    pub browser: BrowserEngineConfig,
    pub translator: TranslatorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://careerviet.vn/viec-lam/data-k-vi.html".to_string(),
            max_pages: 10,
            max_jobs: 600,
            max_jobs_per_page: 60,
            workers: 4,
            usd_to_vnd_rate: 25505.0,
            data_dir: PathBuf::from("data"),
            data_keywords: DATA_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            analyst_keywords: ANALYST_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            listing_delay_ms: [100, 300],
            browser: BrowserEngineConfig::default(),
            translator: TranslatorConfig::default(),
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl Settings {
    /// Apply `JOBMARKET_*`, browser and translator environment variables.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env_string("JOBMARKET_BASE_URL") {
            self.base_url = url;
        }
        if let Some(pages) = env_parse("JOBMARKET_MAX_PAGES") {
            self.max_pages = pages;
        }
        if let Some(jobs) = env_parse("JOBMARKET_MAX_JOBS") {
            self.max_jobs = jobs;
        }
        if let Some(workers) = env_parse("JOBMARKET_WORKERS") {
            self.workers = workers;
        }
        if let Some(rate) = env_parse("JOBMARKET_USD_RATE") {
            self.usd_to_vnd_rate = rate;
        }
        if let Some(dir) = env_string("JOBMARKET_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(endpoint) = env_string("TRANSLATE_ENDPOINT") {
            self.translator.endpoint = Some(endpoint);
        }
        if let Some(key) = env_string("TRANSLATE_API_KEY") {
            self.translator.api_key = Some(key);
        }

        self.browser = self.browser.with_env_overrides();
        self
    }

    fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    pub fn raw_jobs_path(&self) -> PathBuf {
        self.raw_dir().join("careerviet_jobs.csv")
    }

    pub fn processed_jobs_path(&self) -> PathBuf {
        self.processed_dir().join("processed_data.csv")
    }

    pub fn filtered_jobs_path(&self) -> PathBuf {
        self.processed_dir().join("filtered_data.csv")
    }

    pub fn analyst_jobs_path(&self) -> PathBuf {
        self.processed_dir().join("analyst_jobs.csv")
    }

    pub fn analyst_skills_path(&self) -> PathBuf {
        self.processed_dir().join("analyst_skills.csv")
    }

    /// Count table for one skill category.
    pub fn skill_counts_path(&self, category: SkillCategory) -> PathBuf {
        let name = match category {
            SkillCategory::Soft => "soft_skills.csv",
            SkillCategory::Hard => "hard_skills.csv",
            SkillCategory::Domain => "domain_skills.csv",
        };
        self.processed_dir().join(name)
    }
}

/// Load settings from `path`, or from `./jobmarket.toml` when it exists,
/// then apply environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    };

    let settings = match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => Settings::default(),
    };

    Ok(settings.with_env_overrides())
}
