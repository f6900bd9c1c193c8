//! Outbound HTTP fetches against upstream mirrors.
//!
//! # Responsibilities
//! - Issue a GET for the resolved upstream URI
//! - Yield the full body on success
//! - Yield structured failure information otherwise
//!
//! # Design Decisions
//! - Success and failure are mutually exclusive, single-fire outcomes
//! - Non-success statuses carry the upstream's status, reason phrase, and
//!   body so the handler can relay them verbatim
//! - Fetches are bounded by the configured connect and total timeouts;
//!   a stalled mirror cannot hold a connection open forever
//! - No retries: an upstream failure is surfaced once

use bytes::Bytes;

use crate::config::UpstreamConfig;

/// Error type for upstream fetches.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The mirror answered with a non-success status.
    #[error("upstream returned {status} {reason}")]
    Status {
        status: u16,
        reason: String,
        body: Bytes,
    },

    /// The mirror could not be reached or the transfer broke off.
    #[error("upstream transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Fetches objects from upstream mirrors over plain HTTP.
pub struct UpstreamFetcher {
    client: reqwest::Client,
}

impl UpstreamFetcher {
    /// Build the fetcher with the configured timeouts.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .timeout(std::time::Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// GET the given URI and return the response body.
    pub async fn fetch(&self, uri: &str) -> Result<Bytes, UpstreamError> {
        let response = self.client.get(uri).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.bytes().await?);
        }

        let reason = status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string();
        let body = response.bytes().await.unwrap_or_default();
        Err(UpstreamError::Status {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}
