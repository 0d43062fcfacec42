//! Embedding provider trait for generating vector embeddings from text.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends (Ollama, OpenAI, etc.)
/// behind a unified async interface. For a fixed model, the same text must
/// always map to the same vector, so retrieval stays reproducible.
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends that support native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use ragline::EmbeddingProvider;
///
/// let provider = OllamaEmbeddingProvider::new(config, transport);
/// let embedding = provider.embed("hello world").await?;
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, one per input
    /// and in the same order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// A short label for logs and error messages.
    fn name(&self) -> &str;
}

/// Wraps a provider with an exact-text cache.
///
/// Only texts that miss the cache are forwarded, in a single batch. A cached
/// vector is the vector the inner provider returned for that text.
pub struct CachedEmbeddingProvider<P> {
    inner: P,
    cache: RwLock<HashMap<String, Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedEmbeddingProvider<P> {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: P) -> Self {
        Self { inner, cache: RwLock::new(HashMap::new()) }
    }

    /// Number of distinct texts currently cached.
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbeddingProvider<P> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(hit) = self.cache.read().await.get(text) {
            return Ok(hit.clone());
        }
        let vector = self.inner.embed(text).await?;
        self.cache.write().await.insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let misses: Vec<&str> = {
            let cache = self.cache.read().await;
            let mut misses: Vec<&str> =
                texts.iter().copied().filter(|t| !cache.contains_key(*t)).collect();
            misses.sort_unstable();
            misses.dedup();
            misses
        };

        if !misses.is_empty() {
            let fresh = self.inner.embed_batch(&misses).await?;
            if fresh.len() != misses.len() {
                return Err(RagError::embedding(
                    self.inner.name(),
                    format!("expected {} embeddings, got {}", misses.len(), fresh.len()),
                ));
            }
            let mut cache = self.cache.write().await;
            for (text, vector) in misses.iter().zip(fresh) {
                cache.insert((*text).to_string(), vector);
            }
        }

        let cache = self.cache.read().await;
        Ok(texts.iter().filter_map(|t| cache.get(*t).cloned()).collect())
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
