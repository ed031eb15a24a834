//! Remote image fetching.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::StreamError;
use crate::pool::{Chain, ChainBuilder, RequestPool};

/// Errors that can occur while fetching a source image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The `url` argument cannot be turned into an http(s) URL.
    #[error("invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The origin answered with a non-success status.
    #[error("upstream responded with status {0}")]
    Status(u16),

    #[error("upstream image exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error(transparent)]
    Pool(#[from] StreamError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err)
        }
    }
}

/// Turn a client-supplied source into an absolute http(s) URL.
///
/// Scheme-less values (`example.com/a.png`, `//example.com/a.png`) are
/// taken as plain http.
pub fn normalize_url(raw: &str) -> Result<Url, FetchError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FetchError::InvalidUrl("empty URL".into()));
    }

    let candidate = if let Some(rest) = raw.strip_prefix("//") {
        format!("http://{}", rest)
    } else if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = Url::parse(&candidate).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme {:?}",
                other
            )))
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(FetchError::InvalidUrl("missing host".into()));
    }
    Ok(url)
}

/// HTTP client that streams origin responses into a request pool.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    max_bytes: usize,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }

    /// Fetch `url`, appending one segment per received chunk.
    ///
    /// The returned chain is sealed: every byte has arrived before the
    /// adapter reads it.
    pub async fn fetch(&self, url: &Url, pool: &mut RequestPool) -> Result<Chain, FetchError> {
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Upstream returned error status");
            return Err(FetchError::Status(status.as_u16()));
        }
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let mut chain = ChainBuilder::new();
        while let Some(chunk) = response.chunk().await? {
            if chain.total_len() + chunk.len() as u64 > self.max_bytes as u64 {
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            chain.push(pool, &chunk)?;
        }

        tracing::debug!(
            url = %url,
            bytes = chain.total_len(),
            segments = chain.segment_count(),
            "Fetched upstream image"
        );
        Ok(chain.seal(pool))
    }
}
