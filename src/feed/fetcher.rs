// src/feed/fetcher.rs
use std::time::{Duration, Instant};

use metrics::histogram;
use reqwest::{header::ACCEPT, Client};
use thiserror::Error;

use crate::config::feed::FeedConfig;
use crate::feed::types::{json_kind, FeedResponse, FeedSource};

/// Why a poll produced no snapshot. The engine treats all three the same way;
/// the distinction only feeds logs and metrics.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure or timeout expiry.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("HTTP {status}")]
    Http { status: u16 },
    #[error("invalid feed response: {0}")]
    Protocol(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Http { .. } => "http",
            FetchError::Protocol(_) => "protocol",
        }
    }
}

/// Validate the envelope and decode it. Any deviation is a protocol error;
/// nothing partial is returned.
pub fn parse_envelope(body: &[u8]) -> Result<FeedResponse, FetchError> {
    let v: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::Protocol(format!("malformed JSON: {e}")))?;

    let status = v.get("status").and_then(|s| s.as_str());
    if status != Some("ok") {
        return Err(FetchError::Protocol(format!(
            "status is {}",
            status.map_or_else(|| "missing".to_string(), |s| format!("{s:?}"))
        )));
    }
    match v.get("entries") {
        Some(serde_json::Value::Array(_)) => {}
        Some(other) => {
            return Err(FetchError::Protocol(format!(
                "entries is {}, expected array",
                json_kind(other)
            )))
        }
        None => return Err(FetchError::Protocol("entries missing".into())),
    }

    serde_json::from_value(v).map_err(|e| FetchError::Protocol(format!("bad entry: {e}")))
}

/// Feed endpoint over HTTP: `GET <base><feed_path>` with a bounded wait.
#[derive(Clone)]
pub struct HttpFeedSource {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout: Duration::from_secs(25),
        }
    }

    pub fn from_config(cfg: &FeedConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            url: cfg.feed_url(),
            timeout: cfg.fetch_timeout(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<FeedResponse, FetchError> {
        let t0 = Instant::now();

        let resp = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        // The per-request timeout also bounds the body read.
        let body = resp.bytes().await.map_err(FetchError::Network)?;
        let parsed = parse_envelope(&body);

        histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        parsed
    }

    fn name(&self) -> &str {
        &self.url
    }
}
