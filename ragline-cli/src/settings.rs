//! Command-line and environment settings for the console.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ragline::config::{DEFAULT_COMPLETION_MODEL, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use ragline::openai::{DEFAULT_OPENAI_MODEL, OPENAI_BASE_URL};
use ragline::{
    CachedEmbeddingProvider, CompletionConfig, DistanceMetric, EmbeddingBackend, EmbeddingConfig,
    EmbeddingProvider, HttpCompletionClient, HttpTransport, OllamaEmbeddingProvider,
    OpenAIEmbeddingProvider, RagConfig, RagPipeline, TransportConfig,
};

/// Older variable names still honoured when the `RAGLINE_*` ones are unset.
pub const LEGACY_ENDPOINT_VAR: &str = "CLAUDE_HAIKU_API_ENDPOINT";
pub const LEGACY_API_KEY_VAR: &str = "CLAUDE_HAIKU_API_KEY";

/// Answer questions about a local document collection.
#[derive(Parser, Debug, Clone)]
#[command(name = "ragline", version, about)]
pub struct Settings {
    /// Directory of documents to ingest at startup
    #[arg(long, env = "RAGLINE_DOCS_DIR", default_value = "demo_docs")]
    pub docs_dir: PathBuf,

    /// Directory receiving one audit file per answered query
    #[arg(long, env = "RAGLINE_AUDIT_DIR", default_value = ".")]
    pub audit_dir: PathBuf,

    /// Do not write audit files
    #[arg(long)]
    pub no_audit: bool,

    /// Completion endpoint URL
    #[arg(long, env = "RAGLINE_COMPLETION_ENDPOINT")]
    pub completion_endpoint: Option<String>,

    /// Completion API key
    #[arg(long, env = "RAGLINE_COMPLETION_API_KEY", hide_env_values = true)]
    pub completion_api_key: Option<String>,

    /// Completion model identity
    #[arg(long, env = "RAGLINE_COMPLETION_MODEL", default_value = DEFAULT_COMPLETION_MODEL)]
    pub completion_model: String,

    /// Maximum tokens to generate per answer
    #[arg(long, env = "RAGLINE_MAX_TOKENS", default_value_t = 1024)]
    pub max_tokens: u32,

    /// Sampling temperature
    #[arg(long, env = "RAGLINE_TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f64,

    /// Embedding backend: ollama or openai
    #[arg(
        long,
        env = "RAGLINE_EMBEDDING_BACKEND",
        default_value = "ollama",
        value_parser = parse_backend
    )]
    pub embedding_backend: EmbeddingBackend,

    /// Embedding service base URL [default: depends on the backend]
    #[arg(long, env = "RAGLINE_EMBEDDING_URL")]
    pub embedding_url: Option<String>,

    /// Embedding model [default: depends on the backend]
    #[arg(long, env = "RAGLINE_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Embedding API key (openai backend only)
    #[arg(long, env = "RAGLINE_EMBEDDING_API_KEY", hide_env_values = true)]
    pub embedding_api_key: Option<String>,

    /// Cache embeddings of repeated texts in memory
    #[arg(long, env = "RAGLINE_CACHE_EMBEDDINGS")]
    pub cache_embeddings: bool,

    /// Chunk size in characters
    #[arg(long, env = "RAGLINE_CHUNK_SIZE", default_value_t = 1000)]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[arg(long, env = "RAGLINE_CHUNK_OVERLAP", default_value_t = 100)]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query
    #[arg(long, env = "RAGLINE_TOP_K", default_value_t = 4)]
    pub top_k: usize,

    /// Similarity metric: cosine or euclidean
    #[arg(long, env = "RAGLINE_METRIC", default_value = "cosine")]
    pub metric: DistanceMetric,

    /// Timeout for each remote call, in seconds
    #[arg(long, env = "RAGLINE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "RAGLINE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

fn parse_backend(value: &str) -> Result<EmbeddingBackend, String> {
    match value.to_ascii_lowercase().as_str() {
        "ollama" => Ok(EmbeddingBackend::Ollama),
        "openai" => Ok(EmbeddingBackend::OpenAI),
        other => Err(format!("unknown embedding backend '{other}' (expected ollama or openai)")),
    }
}

impl Settings {
    /// Chunking and retrieval parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ragline::RagError::ConfigError`] for inconsistent values.
    pub fn rag_config(&self) -> ragline::Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .top_k(self.top_k)
            .metric(self.metric)
            .build()
    }

    /// Completion settings, reading the legacy variables from the process
    /// environment for values not given explicitly.
    pub fn completion_config(&self) -> CompletionConfig {
        self.completion_config_with(|name| std::env::var(name).ok())
    }

    /// Completion settings, with `lookup` resolving legacy variables.
    pub fn completion_config_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> CompletionConfig {
        let mut config = CompletionConfig::default()
            .with_model(self.completion_model.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);
        let endpoint = self.completion_endpoint.clone().or_else(|| lookup(LEGACY_ENDPOINT_VAR));
        if let Some(endpoint) = endpoint {
            config = config.with_endpoint(endpoint);
        }
        config.api_key = self.completion_api_key.clone().or_else(|| lookup(LEGACY_API_KEY_VAR));
        config
    }

    /// Embedding settings, filling URL and model from the backend defaults.
    pub fn embedding_config(&self) -> EmbeddingConfig {
        let (default_url, default_model) = match self.embedding_backend {
            EmbeddingBackend::Ollama => (DEFAULT_OLLAMA_URL, DEFAULT_OLLAMA_MODEL),
            EmbeddingBackend::OpenAI => (OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL),
        };
        EmbeddingConfig {
            backend: self.embedding_backend,
            base_url: self.embedding_url.clone().unwrap_or_else(|| default_url.to_string()),
            model: self.embedding_model.clone().unwrap_or_else(|| default_model.to_string()),
            api_key: self.embedding_api_key.clone(),
        }
    }

    /// Timeout settings for the shared HTTP client.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig { timeout: self.timeout_secs.map(Duration::from_secs) }
    }

    /// Build the configured embedding provider on top of `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`ragline::RagError::ConfigError`] when the openai backend
    /// has no key.
    pub fn embedding_provider(
        &self,
        transport: Arc<dyn HttpTransport>,
    ) -> ragline::Result<Arc<dyn EmbeddingProvider>> {
        let config = self.embedding_config();
        let provider = match config.backend {
            EmbeddingBackend::Ollama => {
                self.maybe_cached(OllamaEmbeddingProvider::new(&config, transport))
            }
            EmbeddingBackend::OpenAI => {
                self.maybe_cached(OpenAIEmbeddingProvider::new(&config, transport)?)
            }
        };
        Ok(provider)
    }

    /// Assemble the pipeline: embedding provider, completion client over
    /// `completion`, and the chunking and retrieval parameters. Sampling
    /// settings travel with `completion`.
    ///
    /// # Errors
    ///
    /// Returns [`ragline::RagError::ConfigError`] for a missing credential
    /// or inconsistent parameters.
    pub fn build_pipeline(
        &self,
        completion: CompletionConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> ragline::Result<RagPipeline> {
        let client = HttpCompletionClient::new(completion, transport.clone())?;
        RagPipeline::builder()
            .config(self.rag_config()?)
            .embedding_provider(self.embedding_provider(transport)?)
            .completion_provider(Arc::new(client))
            .build()
    }

    fn maybe_cached<P>(&self, provider: P) -> Arc<dyn EmbeddingProvider>
    where
        P: EmbeddingProvider + 'static,
    {
        if self.cache_embeddings {
            Arc::new(CachedEmbeddingProvider::new(provider))
        } else {
            Arc::new(provider)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Settings::try_parse_from(std::iter::once("ragline").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let settings = parse(&["--chunk-size", "200", "--chunk-overlap", "20", "--top-k", "2"]);
        let config = settings.rag_config().unwrap();
        assert_eq!((config.chunk_size, config.chunk_overlap, config.top_k), (200, 20, 2));
    }

    #[test]
    fn rejects_unknown_backend_and_metric() {
        let parse_err = |args: &[&str]| {
            Settings::try_parse_from(std::iter::once("ragline").chain(args.iter().copied()))
                .is_err()
        };
        assert!(parse_err(&["--embedding-backend", "word2vec"]));
        assert!(parse_err(&["--metric", "manhattan"]));
    }

    #[test]
    fn legacy_variables_fill_missing_completion_values() {
        let settings = parse(&[]);
        let config = settings.completion_config_with(|name| match name {
            LEGACY_ENDPOINT_VAR => Some("http://legacy.test/complete".into()),
            LEGACY_API_KEY_VAR => Some("legacy-key".into()),
            _ => None,
        });
        assert_eq!(config.endpoint, "http://legacy.test/complete");
        assert_eq!(config.api_key.as_deref(), Some("legacy-key"));
    }

    #[test]
    fn explicit_completion_values_win_over_legacy_variables() {
        let settings = parse(&[
            "--completion-endpoint",
            "http://primary.test",
            "--completion-api-key",
            "primary-key",
        ]);
        let config = settings.completion_config_with(|_| Some("legacy".into()));
        assert_eq!(config.endpoint, "http://primary.test");
        assert_eq!(config.api_key.as_deref(), Some("primary-key"));
    }

    #[test]
    fn embedding_defaults_follow_backend() {
        let config = parse(&["--embedding-backend", "openai"]).embedding_config();
        assert_eq!(config.base_url, OPENAI_BASE_URL);
        assert_eq!(config.model, DEFAULT_OPENAI_MODEL);
    }
}
