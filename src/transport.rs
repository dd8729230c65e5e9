//! # Ledger Transport
//!
//! Executes requests against a network's REST transaction API. The transport
//! does not retry: a failure is reported once and the caller decides what to
//! do with it.

use std::fmt::{self, Display, Formatter};
use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, Url};
use serde_json::Value;

use crate::error::Error;
use crate::network::NetworkConfig;
use crate::{tracerr, Result};

/// HTTP methods used by the ledger API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Read a transaction.
    Get,
    /// Submit a transaction.
    Post,
    /// Delete a transaction.
    Delete,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// [`LedgerTransport`] sends a single request to a ledger network.
///
/// Implementations must surface a non-2xx answer as
/// [`Error::LedgerRejected`] and connection, timeout, or decoding failures as
/// [`Error::Transport`]. A successful response resolves to its JSON body
/// ([`Value::Null`] when the body is empty).
pub trait LedgerTransport: Send + Sync + Clone {
    /// Send a request to `path` (relative to the network's base URL).
    fn send(
        &self, network: &NetworkConfig, method: Method, path: &str, body: Option<&Value>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// [`LedgerTransport`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    /// Reusable HTTP client
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with no request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Create a transport bounding every request by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::build(Some(timeout))
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    fn build(timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = match builder.build() {
            Ok(c) => c,
            Err(e) => tracerr!(Error::Transport(format!("failed to create HTTP client: {e}"))),
        };
        Ok(Self { http_client })
    }
}

impl LedgerTransport for HttpTransport {
    async fn send(
        &self, network: &NetworkConfig, method: Method, path: &str, body: Option<&Value>,
    ) -> Result<Value> {
        let url = Url::parse(&format!("{}{path}", network.base_url.trim_end_matches('/')))?;
        tracing::debug!("{method} {url}");

        let mut req = match method {
            Method::Get => self.http_client.get(url),
            Method::Post => self.http_client.post(url),
            Method::Delete => self.http_client.delete(url),
        };
        if let Some(token) = &network.auth_token {
            let value = match HeaderValue::from_str(token) {
                Ok(v) => v,
                Err(e) => tracerr!(Error::Transport(format!(
                    "invalid authorization token for '{}': {e}",
                    network.name
                ))),
            };
            req = req.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = match req.send().await {
            Ok(r) => r,
            Err(e) => tracerr!(Error::Transport(format!("{method} {path} failed: {e}"))),
        };
        unpack_response(res).await
    }
}

// Helper to unpack any response from the ledger.
async fn unpack_response(res: Response) -> Result<Value> {
    let status = res.status();
    let text = match res.text().await {
        Ok(t) => t,
        Err(e) => tracerr!(Error::Transport(format!("failed to read response body: {e}"))),
    };

    if !status.is_success() {
        tracing::warn!("ledger returned {status}: {text}");
        return Err(Error::LedgerRejected {
            status: status.as_u16(),
            body: text,
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(&text) {
        Ok(v) => Ok(v),
        Err(e) => tracerr!(Error::Transport(format!("malformed JSON in ledger response: {e}"))),
    }
}
