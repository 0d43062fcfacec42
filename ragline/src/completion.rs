//! Remote text-completion client.
//!
//! [`CompletionProvider`] is the seam the pipeline generates through;
//! [`HttpCompletionClient`] implements it against a JSON completion endpoint
//! with bearer authentication.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::CompletionConfig;
use crate::error::{RagError, Result};
use crate::transport::HttpTransport;

/// Sampling settings applied to every request a pipeline sends.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Sequences that stop generation.
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from(&CompletionConfig::default())
    }
}

impl From<&CompletionConfig> for GenerationParams {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            stop_sequences: config.stop_sequences.clone(),
        }
    }
}

/// One generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The full prompt text.
    pub prompt: String,
    /// Sequences that stop generation.
    pub stop_sequences: Vec<String>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl CompletionRequest {
    /// Build a request for `prompt` with the given sampling settings.
    pub fn new(prompt: impl Into<String>, params: &GenerationParams) -> Self {
        Self {
            prompt: prompt.into(),
            stop_sequences: params.stop_sequences.clone(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }
}

/// A text-generation backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate text for `request`, returned without surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Every failure is reported as [`RagError::CompletionError`].
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Sampling settings a pipeline uses unless it is given its own.
    fn generation_defaults(&self) -> GenerationParams {
        GenerationParams::default()
    }

    /// A short label for logs and error messages.
    fn name(&self) -> &str;
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens_to_sample: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    completion: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// A [`CompletionProvider`] speaking the `{model, prompt,
/// max_tokens_to_sample, temperature, stop_sequences}` → `{completion}`
/// protocol.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use ragline::{CompletionConfig, HttpCompletionClient, ReqwestTransport};
///
/// let client = HttpCompletionClient::new(
///     CompletionConfig::new(api_key),
///     Arc::new(ReqwestTransport::new()),
/// )?;
/// ```
pub struct HttpCompletionClient {
    config: CompletionConfig,
    api_key: String,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient").field("config", &self.config).finish()
    }
}

impl HttpCompletionClient {
    /// Create a client. No request is made.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the API key is missing or blank,
    /// or the endpoint is empty.
    pub fn new(config: CompletionConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let api_key = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => {
                error!("completion API key is missing");
                return Err(RagError::config("completion API key is missing"));
            }
        };
        if config.endpoint.trim().is_empty() {
            return Err(RagError::config("completion endpoint must not be empty"));
        }
        Ok(Self { config, api_key, transport })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    fn fail(&self, status: Option<u16>, message: String) -> RagError {
        error!(model = %self.config.model, ?status, %message, "completion failed");
        RagError::completion(&self.config.model, status, message)
    }
}

#[async_trait]
impl CompletionProvider for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = serde_json::to_value(CompletionBody {
            model: &self.config.model,
            prompt: &request.prompt,
            max_tokens_to_sample: request.max_tokens,
            temperature: request.temperature,
            stop_sequences: (!request.stop_sequences.is_empty())
                .then_some(request.stop_sequences.as_slice()),
        })
        .map_err(|e| self.fail(None, format!("failed to encode request: {e}")))?;

        debug!(
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            "sending completion request"
        );

        let response = self
            .transport
            .post_json(&self.config.endpoint, Some(&self.api_key), &body)
            .await
            .map_err(|e| self.fail(None, format!("request failed: {e}")))?;

        if !response.is_success() {
            let status = response.status;
            let detail = serde_json::from_str::<ErrorResponse>(&response.body)
                .map(|e| e.error.message)
                .unwrap_or(response.body);
            return Err(self.fail(Some(status), format!("API returned {status}: {detail}")));
        }

        let parsed: CompletionResponse = serde_json::from_str(&response.body).map_err(|e| {
            self.fail(Some(response.status), format!("missing or malformed completion: {e}"))
        })?;

        Ok(parsed.completion.trim().to_string())
    }

    fn generation_defaults(&self) -> GenerationParams {
        GenerationParams::from(&self.config)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
