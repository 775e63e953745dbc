//! Source page fetching and content aggregation

use super::extract::visible_text;
use super::user_agent::random_user_agent;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Separator between the texts of consecutive sources
pub const SOURCE_SEPARATOR: &str = "\n\n";

/// Trait for fetching a page and returning its visible text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP with a fresh browser identity per request
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let user_agent = random_user_agent(&mut rand::thread_rng());

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| AppError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body = response.text().await.map_err(|e| AppError::Fetch {
            url: url.to_string(),
            message: format!("Failed to read body: {}", e),
        })?;

        Ok(visible_text(&body))
    }
}

/// Fetches every source and joins the texts that could be retrieved
pub struct ContentAggregator {
    fetcher: Arc<dyn PageFetcher>,
    retry: RetryPolicy,
}

impl ContentAggregator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, retry: RetryPolicy) -> Self {
        Self { fetcher, retry }
    }

    /// Fetch all `urls` concurrently and join the successful texts in input order
    ///
    /// A URL that still fails after the retry budget is logged and left out.
    /// Returns an empty string when nothing could be fetched.
    pub async fn aggregate(&self, urls: &[String]) -> String {
        let fetches = urls.iter().map(|url| self.fetch_one(url));

        join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(SOURCE_SEPARATOR)
    }

    async fn fetch_one(&self, url: &str) -> Option<String> {
        let fetcher = self.fetcher.as_ref();
        let text = self
            .retry
            .run_or_skip(url, move || fetcher.fetch_text(url))
            .await;

        match &text {
            Some(content) => tracing::debug!(url, chars = content.len(), "Fetched source"),
            None => tracing::error!(url, "Failed to retrieve source, skipping"),
        }
        metrics::record_fetch(text.is_some());

        text
    }
}
