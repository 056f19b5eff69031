//! Vietnamese to English translation ahead of skill matching.
//!
//! Translation only improves recall. Every failure falls back to the
//! original text, so callers never see an error from [`Translator::translate`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use whatlang::Lang;

use crate::config::TranslatorConfig;

/// Errors from the translation backend.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Translation API error: {0}")]
    Api(String),
    #[error("Invalid translation response: {0}")]
    Parse(String),
}

/// Whether `text` reads as Vietnamese.
pub fn is_vietnamese(text: &str) -> bool {
    whatlang::detect(text).is_some_and(|info| info.lang() == Lang::Vie)
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// English rendering of `text`, or `text` itself when translation is not
    /// needed or fails.
    async fn translate(&self, text: &str) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'static str,
    target: &'static str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslateError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn request(&self, text: &str) -> Result<String, TranslateError> {
        let body = TranslateRequest {
            q: text,
            source: "vi",
            target: "en",
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let resp = self
            .client
            .post(format!("{}/translate", self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(TranslateError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: TranslateResponse = resp
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;
        Ok(parsed.translated_text)
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() || !is_vietnamese(text) {
            return text.to_string();
        }
        match self.request(text).await {
            Ok(translated) => {
                debug!("Translated {} chars", text.len());
                translated
            }
            Err(e) => {
                warn!("Translation error: {}", e);
                text.to_string()
            }
        }
    }
}

/// Translator for the given settings; disabled or unconfigured gives [`NoopTranslator`].
pub fn translator_from_config(config: &TranslatorConfig) -> Box<dyn Translator> {
    let Some(endpoint) = config.endpoint.as_deref().filter(|_| config.enabled) else {
        return Box::new(NoopTranslator);
    };
    match HttpTranslator::new(
        endpoint,
        config.api_key.clone(),
        Duration::from_secs(config.timeout),
    ) {
        Ok(translator) => Box::new(translator),
        Err(e) => {
            warn!("Translation disabled: {}", e);
            Box::new(NoopTranslator)
        }
    }
}
