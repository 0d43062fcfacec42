//! Ollama embedding provider using the `/api/embed` endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::EmbeddingConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::transport::HttpTransport;

const PROVIDER: &str = "Ollama";

/// An [`EmbeddingProvider`] backed by an Ollama server.
///
/// Sends every batch as a single request; Ollama returns one vector per
/// input in input order.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use ragline::{EmbeddingConfig, OllamaEmbeddingProvider, ReqwestTransport};
///
/// let provider = OllamaEmbeddingProvider::new(
///     &EmbeddingConfig::default(),
///     Arc::new(ReqwestTransport::new()),
/// );
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OllamaEmbeddingProvider {
    transport: Arc<dyn HttpTransport>,
    url: String,
    model: String,
}

impl OllamaEmbeddingProvider {
    /// Create a provider for the server and model named in `config`.
    pub fn new(config: &EmbeddingConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            url: format!("{}/api/embed", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        }
    }

    /// The embedding model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RagError::embedding(PROVIDER, "API returned empty response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let body = serde_json::to_value(EmbedRequest { model: &self.model, input: texts })
            .map_err(|e| RagError::embedding(PROVIDER, format!("failed to encode request: {e}")))?;

        let response = self.transport.post_json(&self.url, None, &body).await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "request failed");
            RagError::embedding(PROVIDER, format!("request failed: {e}"))
        })?;

        if !response.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&response.body)
                .map(|e| e.error)
                .unwrap_or(response.body);
            error!(provider = PROVIDER, status = response.status, "API error");
            return Err(RagError::embedding(
                PROVIDER,
                format!("API returned {}: {detail}", response.status),
            ));
        }

        let parsed: EmbedResponse = serde_json::from_str(&response.body).map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::embedding(PROVIDER, format!("failed to parse response: {e}"))
        })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(RagError::embedding(
                PROVIDER,
                format!("expected {} embeddings, got {}", texts.len(), parsed.embeddings.len()),
            ));
        }

        Ok(parsed.embeddings)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
