//! HTTP transport for venue market-data APIs.
//!
//! One attempt per call, fixed timeout, no retries. Every failure mode
//! (connect, timeout, non-2xx status, undecodable body) surfaces as a
//! `TransportFailure` value; nothing panics past this boundary.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A terminal request failure: network error, timeout, bad status, or a body
/// that was not valid JSON.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

/// Failure modes of a venue adapter call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{venue}: request failed: {source}")]
    Transport {
        venue: &'static str,
        #[source]
        source: TransportFailure,
    },
    #[error("{venue}: market \"{symbol}\" not listed")]
    SymbolNotFound {
        venue: &'static str,
        symbol: String,
    },
    #[error("{venue}: malformed payload: field \"{field}\" not usable")]
    MalformedPayload {
        venue: &'static str,
        field: &'static str,
    },
}

impl FetchError {
    pub fn transport(venue: &'static str, source: TransportFailure) -> Self {
        Self::Transport { venue, source }
    }

    pub fn symbol_not_found(venue: &'static str, symbol: &str) -> Self {
        Self::SymbolNotFound {
            venue,
            symbol: symbol.to_string(),
        }
    }

    pub fn malformed(venue: &'static str, field: &'static str) -> Self {
        Self::MalformedPayload { venue, field }
    }
}

/// JSON-over-HTTP request capability, abstracted so adapters can be exercised
/// against scripted payloads in tests.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, TransportFailure>;
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportFailure>;
}

/// Production transport backed by a shared `reqwest::Client`.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("funding-spread/0.1")
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client })
    }

    async fn decode(url: &str, response: reqwest::Response) -> Result<Value, TransportFailure> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure(format!("{url}: HTTP {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportFailure(format!("{url}: invalid JSON body: {e}")))
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportFailure(format!("GET {url}: {e}")))?;

        Self::decode(url, response).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportFailure> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportFailure(format!("POST {url}: {e}")))?;

        Self::decode(url, response).await
    }
}
