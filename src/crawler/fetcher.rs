//! HTTP fetch layer
//!
//! Every page the harvester reads goes through [`Fetcher::fetch`], which:
//! - Waits a fixed throttle delay before each attempt
//! - Caps in-flight requests with a semaphore
//! - Sends browser-like headers with a rotated user agent
//! - Treats HTTP 404 as a soft [`FetchOutcome::NotFound`]
//! - Retries any other failure under a [`RetryPolicy`]

use crate::config::Config;
use crate::crawler::retry::RetryPolicy;
use crate::crawler::user_agent::UserAgentRotator;
use crate::{HarvestError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response body (may be empty)
    Page(String),
    /// HTTP 404: the caller should stop, not retry
    NotFound,
}

impl FetchOutcome {
    /// The page body if there is a non-blank one
    pub fn into_html(self) -> Option<String> {
        match self {
            FetchOutcome::Page(body) if !body.trim().is_empty() => Some(body),
            _ => None,
        }
    }
}

/// Builds the shared HTTP client
///
/// # Arguments
///
/// * `timeout` - Whole-request timeout
/// * `pool_size` - Idle connections kept per host
pub fn build_http_client(timeout: Duration, pool_size: usize) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(pool_size)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited, retrying page fetcher shared by the crawler and workers
pub struct Fetcher {
    client: Client,
    user_agents: Arc<UserAgentRotator>,
    retry: RetryPolicy,
    throttle: Duration,
    in_flight: Arc<Semaphore>,
}

impl Fetcher {
    pub fn new(
        client: Client,
        user_agents: Arc<UserAgentRotator>,
        retry: RetryPolicy,
        throttle: Duration,
        max_in_flight: usize,
    ) -> Self {
        Self {
            client,
            user_agents,
            retry,
            throttle,
            in_flight: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Builds a fetcher from the crawler and retry sections of the config
    pub fn from_config(config: &Config) -> Result<Self> {
        let concurrency = config.crawler.max_concurrency as usize;
        let client = build_http_client(config.crawler.request_timeout(), concurrency)?;

        Ok(Self::new(
            client,
            Arc::new(UserAgentRotator::default()),
            RetryPolicy::from(&config.retry),
            config.crawler.request_throttle(),
            concurrency,
        ))
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetches a page, retrying transient failures
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOutcome::Page)` - 2xx response body
    /// * `Ok(FetchOutcome::NotFound)` - HTTP 404, never retried
    /// * `Err(HarvestError)` - the last failure once attempts are exhausted
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        self.retry.run(url, |_| self.attempt(url)).await
    }

    async fn attempt(&self, url: &str) -> Result<FetchOutcome> {
        tokio::time::sleep(self.throttle).await;

        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|e| HarvestError::Task(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .headers(self.browser_headers(url))
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::warn!("Page not found (404): {}", url);
            return Ok(FetchOutcome::NotFound);
        }

        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchOutcome::Page(body))
    }

    /// Header set of a desktop browser navigating within the site
    fn browser_headers(&self, url: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(agent) = HeaderValue::from_str(self.user_agents.next_agent()) {
            headers.insert(USER_AGENT, agent);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
        headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));

        let origin = Url::parse(url)
            .ok()
            .map(|u| u.origin().ascii_serialization())
            .filter(|o| o != "null");
        if let Some(referer) = origin.and_then(|o| HeaderValue::from_str(&format!("{}/", o)).ok()) {
            headers.insert(REFERER, referer);
        }

        headers
    }
}
