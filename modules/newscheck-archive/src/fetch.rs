// HTML fetch collaborator: trait boundary plus a reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use newscheck_common::{FetchError, NewsCheckError};
use tracing::{info, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

// --- PageFetcher trait ---

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch raw HTML for a URL. Non-2xx responses are errors.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
    fn name(&self) -> &str;
}

/// Normalize a user-supplied article URL: prepend `https://` when no scheme
/// is given, then require an http(s) scheme and a host.
pub fn normalize_article_url(raw: &str) -> Result<String, NewsCheckError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NewsCheckError::InvalidUrl("empty URL".into()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = url::Url::parse(&candidate)
        .map_err(|e| NewsCheckError::InvalidUrl(format!("{trimmed}: {e}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(NewsCheckError::InvalidUrl(format!(
            "only http/https URLs are allowed, got: {}",
            parsed.scheme()
        )));
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed.to_string()),
        _ => Err(NewsCheckError::InvalidUrl(format!("{trimmed}: missing host"))),
    }
}

// --- reqwest fetcher ---

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, NewsCheckError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| NewsCheckError::Config(format!("Failed to build HTTP client: {e}")))?;
        info!(timeout_secs = timeout.as_secs(), "Using HttpFetcher");
        Ok(Self { client, timeout })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Connection {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!(url, fetcher = "http", "Fetching page");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Non-success HTTP status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = resp.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        info!(url, fetcher = "http", bytes = html.len(), "Fetched successfully");
        Ok(html)
    }

    fn name(&self) -> &str {
        "http"
    }
}
