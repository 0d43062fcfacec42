//! HTTP transport used by the remote embedding and completion adapters.
//!
//! Adapters only ever POST a JSON body and read back a status and a body,
//! so that is all [`HttpTransport`] exposes. [`ReqwestTransport`] is the
//! production implementation; tests substitute an in-process fake.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::TransportConfig;

/// A raw HTTP response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Sends JSON requests to remote services.
///
/// Implementations must hold no per-request mutable state so one instance
/// can serve concurrent calls.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON to `url`, with bearer authentication when a
    /// token is given.
    async fn post_json(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        body: &Value,
    ) -> Result<HttpResponse, TransportError>;
}

/// An [`HttpTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with no request timeout.
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    /// Create a transport from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the underlying client cannot be built.
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client =
            builder.build().map_err(|e| TransportError(format!("failed to build client: {e}")))?;
        Ok(Self { client })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        body: &Value,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError(e.to_string()))?;

        debug!(url, status, body_len = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_covers_only_2xx() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn builds_with_timeout() {
        let config =
            TransportConfig { timeout: Some(std::time::Duration::from_secs(5)) };
        assert!(ReqwestTransport::from_config(&config).is_ok());
    }
}
