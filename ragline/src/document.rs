//! Data types for documents, chunks, index entries, and answers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A source document reduced to plain text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// Where the text came from (a path or URI).
    pub source_ref: String,
    /// The text content of the document.
    pub text: String,
}

impl Document {
    /// Create a document.
    pub fn new(
        id: impl Into<String>,
        source_ref: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), source_ref: source_ref.into(), text: text.into() }
    }
}

/// A contiguous window of a [`Document`]'s text.
///
/// Offsets and lengths count characters, not bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{document_id}_{chunk_index}`.
    pub id: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Character offset of the chunk within the parent text.
    pub start_offset: usize,
    /// Length of the chunk in characters.
    pub length: usize,
}

/// The unit stored in a [`VectorIndex`](crate::VectorIndex).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// The chunk this entry was built from.
    pub chunk_id: String,
    /// The chunk's embedding.
    pub vector: Vec<f32>,
    /// The chunk text handed back on retrieval.
    pub chunk_text: String,
}

impl IndexEntry {
    /// Pair a chunk with its embedding.
    pub fn from_chunk(chunk: &Chunk, vector: Vec<f32>) -> Self {
        Self { chunk_id: chunk.id.clone(), vector, chunk_text: chunk.text.clone() }
    }
}

/// A retrieved chunk paired with its score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The ID of the retrieved chunk.
    pub chunk_id: String,
    /// The retrieved chunk text.
    pub chunk_text: String,
    /// Similarity (cosine) or distance (Euclidean), per the index metric.
    pub score: f32,
}

/// The outcome of one served query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The literal query text.
    pub query: String,
    /// IDs of the chunks used as context, in ranked order.
    pub retrieved_chunk_ids: Vec<String>,
    /// The retrieved context, in ranked order.
    pub context: Vec<SearchResult>,
    /// The generated answer text.
    pub generated_text: String,
    /// Wall time from query embedding to completed generation.
    pub elapsed: Duration,
}
