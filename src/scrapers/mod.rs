//! Page fetching and job board extractors.

pub mod browser;
pub mod careerviet;
pub mod error;
pub mod fetch;

pub use browser::{BrowserEngineConfig, BrowserSessionFactory};
#[cfg(feature = "browser")]
pub use browser::BrowserSession;
pub use error::FetchError;
pub use fetch::{fetch_page, FetchOptions, PageSession, RenderPlan, SessionFactory};
