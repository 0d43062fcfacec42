//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the ingest-and-answer workflow by
//! composing a [`Chunker`], an [`EmbeddingProvider`], a [`VectorIndex`]
//! it owns, a [`PromptTemplate`] and a [`CompletionProvider`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ragline::{RagPipeline, RagConfig};
//!
//! let mut pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .completion_provider(Arc::new(my_client))
//!     .build()?;
//!
//! pipeline.ingest(&documents).await?;
//! let answer = pipeline.answer("anxious").await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::completion::{CompletionProvider, CompletionRequest, GenerationParams};
use crate::config::RagConfig;
use crate::document::{Answer, Chunk, Document, IndexEntry, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::prompt::PromptTemplate;

/// Counts describing one completed ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents that were chunked.
    pub document_count: usize,
    /// Chunks embedded and stored in the index.
    pub chunk_count: usize,
    /// Dimension of the stored vectors, `None` when nothing was stored.
    pub dimension: Option<usize>,
}

/// The RAG pipeline orchestrator.
///
/// Ingestion (chunk → embed → build index) needs `&mut self` and replaces
/// the index wholesale. Answering (embed → search → compose → complete)
/// only reads shared state, so a failed query leaves the pipeline usable.
/// Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    completion_provider: Arc<dyn CompletionProvider>,
    chunker: Arc<dyn Chunker>,
    prompt: PromptTemplate,
    generation: GenerationParams,
    index: VectorIndex,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Return a reference to the prompt template.
    pub fn prompt_template(&self) -> &PromptTemplate {
        &self.prompt
    }

    /// Return the sampling settings sent with every completion request.
    pub fn generation(&self) -> &GenerationParams {
        &self.generation
    }

    /// Split documents into chunks without embedding them.
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents.iter().flat_map(|doc| self.chunker.chunk(doc)).collect()
    }

    /// Ingest documents: chunk → embed (one batch) → build the index.
    ///
    /// The index is rebuilt from scratch. On failure the previous index is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the embedding call fails or
    /// returns the wrong number of vectors, and
    /// [`RagError::DimensionMismatch`] if the vectors disagree in length.
    pub async fn ingest(&mut self, documents: &[Document]) -> Result<IngestReport> {
        // 1. Chunk every document
        let chunks = self.chunk_documents(documents);

        // 2. Embed all chunk texts in one batch
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
                error!(error = %e, chunk_count = chunks.len(), "embedding failed during ingestion");
                e
            })?
        };

        if embeddings.len() != chunks.len() {
            return Err(RagError::embedding(
                self.embedding_provider.name(),
                format!("expected {} embeddings, got {}", chunks.len(), embeddings.len()),
            ));
        }

        // 3. Build the index
        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, vector)| IndexEntry::from_chunk(chunk, vector))
            .collect();
        self.index.build(entries)?;

        let report = IngestReport {
            document_count: documents.len(),
            chunk_count: chunks.len(),
            dimension: self.index.dimension(),
        };
        info!(
            document_count = report.document_count,
            chunk_count = report.chunk_count,
            dimension = report.dimension,
            "ingested documents"
        );
        Ok(report)
    }

    /// Embed `query` and return the `top_k` most relevant chunks.
    ///
    /// An empty index yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the query cannot be embedded
    /// and [`RagError::DimensionMismatch`] if its vector does not fit the index.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;

        self.index.search(&query_embedding, self.config.top_k).map_err(|e| {
            error!(error = %e, "vector index search failed");
            e
        })
    }

    /// Answer `query`: retrieve context, compose the prompt, generate.
    ///
    /// The query is treated as an opaque string and passed to the template
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] for a blank query, otherwise the
    /// error of the first failing stage ([`RagError::EmbeddingError`],
    /// [`RagError::DimensionMismatch`] or [`RagError::CompletionError`]).
    pub async fn answer(&self, query: &str) -> Result<Answer> {
        if query.trim().is_empty() {
            return Err(RagError::config("query must not be empty"));
        }

        let started = Instant::now();

        let context = self.retrieve(query).await?;
        let prompt = self.prompt.render(&context, query);
        let request = CompletionRequest::new(prompt, &self.generation);
        let generated_text = self.completion_provider.complete(&request).await?;

        let elapsed = started.elapsed();
        info!(
            result_count = context.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            provider = self.completion_provider.name(),
            "query answered"
        );

        Ok(Answer {
            query: query.to_string(),
            retrieved_chunk_ids: context.iter().map(|r| r.chunk_id.clone()).collect(),
            context,
            generated_text,
            elapsed,
        })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `embedding_provider` and `completion_provider` are required.
/// The chunker defaults to a [`FixedSizeChunker`] built from the config,
/// the prompt to [`PromptTemplate::default()`], and the sampling settings
/// to those of the completion provider.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    completion_provider: Option<Arc<dyn CompletionProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    prompt: Option<PromptTemplate>,
    generation: Option<GenerationParams>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the completion provider.
    pub fn completion_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion_provider = Some(provider);
        self
    }

    /// Override the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Override the prompt template.
    pub fn prompt_template(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Set the sampling settings sent with each completion request.
    ///
    /// Defaults to [`CompletionProvider::generation_defaults`].
    pub fn generation(mut self, params: GenerationParams) -> Self {
        self.generation = Some(params);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing or
    /// the configuration is invalid.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.ok_or_else(|| RagError::config("config is required"))?;
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::config("embedding_provider is required"))?;
        let completion_provider = self
            .completion_provider
            .ok_or_else(|| RagError::config("completion_provider is required"))?;
        let generation =
            self.generation.unwrap_or_else(|| completion_provider.generation_defaults());
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        Ok(RagPipeline {
            index: VectorIndex::new(config.metric),
            config,
            embedding_provider,
            completion_provider,
            chunker,
            prompt: self.prompt.unwrap_or_default(),
            generation,
        })
    }
}
