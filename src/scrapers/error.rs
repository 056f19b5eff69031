//! Page fetch error types.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Browser launch failed: {0}")]
    Launch(String),
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Script error: {0}")]
    Script(String),
    #[error("Browser session is closed")]
    Closed,
    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    Unsupported,
}
