//! Embeddings from the OpenAI `/v1/embeddings` endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::EmbeddingConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::transport::HttpTransport;

/// The default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Model used when none is configured.
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

const PROVIDER: &str = "OpenAI";

/// An [`EmbeddingProvider`] that calls OpenAI with bearer authentication.
///
/// # Configuration
///
/// - `model`: taken from the config; `text-embedding-3-small` is typical.
/// - `dimensions`: optional output size, see [`with_dimensions`](Self::with_dimensions).
/// - `api_key`: required; construction fails without one.
pub struct OpenAIEmbeddingProvider {
    transport: Arc<dyn HttpTransport>,
    url: String,
    api_key: String,
    model: String,
    request_dimensions: Option<usize>,
}

impl OpenAIEmbeddingProvider {
    /// Create a provider from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the API key is missing or blank.
    pub fn new(config: &EmbeddingConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RagError::config("OpenAI embeddings require an API key"))?
            .to_string();

        Ok(Self {
            transport,
            url: format!("{}/v1/embeddings", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            request_dimensions: None,
        })
    }

    /// Ask the API to shorten every vector to `dims` components.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.request_dimensions = Some(dims);
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

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

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.request_dimensions,
        };
        let body = serde_json::to_value(&request_body)
            .map_err(|e| RagError::embedding(PROVIDER, format!("failed to encode request: {e}")))?;

        let response =
            self.transport.post_json(&self.url, Some(&self.api_key), &body).await.map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::embedding(PROVIDER, format!("request failed: {e}"))
            })?;

        if !response.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&response.body)
                .map(|e| e.error.message)
                .unwrap_or(response.body);

            error!(provider = PROVIDER, status = response.status, "API error");
            return Err(RagError::embedding(
                PROVIDER,
                format!("API returned {}: {detail}", response.status),
            ));
        }

        let embedding_response: EmbeddingResponse =
            serde_json::from_str(&response.body).map_err(|e| {
                error!(provider = PROVIDER, error = %e, "failed to parse response");
                RagError::embedding(PROVIDER, format!("failed to parse response: {e}"))
            })?;

        if embedding_response.data.len() != texts.len() {
            return Err(RagError::embedding(
                PROVIDER,
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    embedding_response.data.len()
                ),
            ));
        }

        Ok(embedding_response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
