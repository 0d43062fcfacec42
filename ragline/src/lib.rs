//! # ragline
//!
//! Retrieval-augmented generation over a private document collection.
//!
//! ## Overview
//!
//! Documents are split into fixed-size overlapping chunks, embedded, and
//! stored in an in-memory [`VectorIndex`]. A query is embedded the same way,
//! its nearest chunks are composed into a prompt, and a remote
//! [`CompletionProvider`] generates the answer.
//!
//! - [`FixedSizeChunker`] - deterministic fixed-window segmentation
//! - [`EmbeddingProvider`] - text to vectors ([`OllamaEmbeddingProvider`],
//!   [`OpenAIEmbeddingProvider`], [`CachedEmbeddingProvider`])
//! - [`VectorIndex`] - exact k-NN search with stable tie-breaking
//! - [`HttpCompletionClient`] - bearer-authenticated completion endpoint
//! - [`RagPipeline`] - ingest once, then answer queries
//!
//! Remote adapters talk through an [`HttpTransport`], so every network call
//! can be replaced in tests.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragline::*;
//!
//! let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
//! let mut pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(OllamaEmbeddingProvider::new(
//!         &EmbeddingConfig::default(),
//!         transport.clone(),
//!     )))
//!     .completion_provider(Arc::new(HttpCompletionClient::new(
//!         CompletionConfig::new(api_key),
//!         transport,
//!     )?))
//!     .build()?;
//!
//! let report = load_documents("demo_docs", &PlainTextExtractor::default())?;
//! pipeline.ingest(&report.documents).await?;
//! let answer = pipeline.answer("anxious").await?;
//! println!("{}", answer.generated_text);
//! ```

pub mod audit;
pub mod chunking;
pub mod completion;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod loader;
pub mod ollama;
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod transport;

pub use audit::AuditWriter;
pub use chunking::{Chunker, FixedSizeChunker, split};
pub use completion::{
    CompletionProvider, CompletionRequest, GenerationParams, HttpCompletionClient,
};
pub use config::{
    CompletionConfig, EmbeddingBackend, EmbeddingConfig, RagConfig, RagConfigBuilder,
    TransportConfig,
};
pub use document::{Answer, Chunk, Document, IndexEntry, SearchResult};
pub use embedding::{CachedEmbeddingProvider, EmbeddingProvider};
pub use error::{RagError, Result};
pub use index::{DistanceMetric, VectorIndex};
pub use loader::{LoadReport, PlainTextExtractor, TextExtractor, load_documents};
pub use ollama::OllamaEmbeddingProvider;
pub use openai::OpenAIEmbeddingProvider;
pub use pipeline::{IngestReport, RagPipeline, RagPipelineBuilder};
pub use prompt::PromptTemplate;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
