//! Remote subscription fetch.
//!
//! # Responsibilities
//! - Validate the caller-supplied remote location
//! - Fetch the document with a bounded timeout and body size
//! - Map transport failures to distinct upstream errors
//!
//! # Design Decisions
//! - No retries: a failed fetch surfaces immediately
//! - Timeout errors are distinct from other errors (504 vs 502)

use std::time::Duration;

use url::Url;

use crate::chain::oplog::OperationLog;
use crate::config::FetchConfig;
use crate::subscription::error::{SubscriptionError, SubscriptionResult};

/// Parse and check a remote subscription location.
pub fn parse_remote_url(raw: &str) -> SubscriptionResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SubscriptionError::MissingRemoteUrl);
    }

    let url = Url::parse(trimmed).map_err(|e| SubscriptionError::InvalidRemoteUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SubscriptionError::InvalidRemoteUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// HTTP client for subscription providers.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout_secs: u64,
    max_body_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> SubscriptionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SubscriptionError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Download the document at `url`.
    pub async fn fetch(&self, url: &Url, log: &mut OperationLog) -> SubscriptionResult<Vec<u8>> {
        log.info(format!("Fetching subscription from {}", url));

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(e, url, log))?;

        let status = response.status();
        if !status.is_success() {
            log.error(format!("Remote {} returned HTTP {}", url, status.as_u16()));
            return Err(SubscriptionError::UpstreamStatus(status.as_u16()));
        }
        log.info(format!("Remote responded with HTTP {}", status.as_u16()));

        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes as u64 {
                log.error(format!("Remote document declares {} bytes, over the limit", len));
                return Err(SubscriptionError::TooLarge(self.max_body_bytes));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(e, url, log))?
        {
            if body.len() + chunk.len() > self.max_body_bytes {
                log.error("Remote document exceeded the size limit while downloading");
                return Err(SubscriptionError::TooLarge(self.max_body_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        log.debug(format!("Downloaded {} bytes", body.len()));
        Ok(body)
    }

    fn transport_error(&self, e: reqwest::Error, url: &Url, log: &mut OperationLog) -> SubscriptionError {
        if e.is_timeout() {
            log.error(format!("Request to {} timed out after {}s", url, self.timeout_secs));
            SubscriptionError::Timeout(self.timeout_secs)
        } else {
            log.error(format!("Request to {} failed: {}", url, e));
            SubscriptionError::Fetch(e.to_string())
        }
    }
}
