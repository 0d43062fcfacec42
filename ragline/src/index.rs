//! In-memory vector index with exact, deterministic k-NN search.
//!
//! The index is built once and is read-only afterwards, so a built
//! [`VectorIndex`] can be shared across tasks without locking. Rebuilding
//! assembles the new storage completely before swapping it in.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{IndexEntry, SearchResult};
use crate::error::{RagError, Result};

/// How the index scores a stored vector against a query vector.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity; higher is more relevant.
    #[default]
    Cosine,
    /// Euclidean (L2) distance; lower is more relevant.
    Euclidean,
}

impl DistanceMetric {
    /// Score `b` against `a`. Both slices must have the same length.
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        let score = match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::Euclidean => euclidean_distance(a, b),
        };
        // Fold -0.0 into 0.0 so equal scores rank as ties.
        if score == 0.0 { 0.0 } else { score }
    }

    /// Order two scores so the more relevant one comes first.
    fn rank(self, a: f32, b: f32) -> Ordering {
        match self {
            Self::Cosine => b.total_cmp(&a),
            Self::Euclidean => a.total_cmp(&b),
        }
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" | "l2" => Ok(Self::Euclidean),
            other => Err(RagError::ConfigError(format!("unknown distance metric '{other}'"))),
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

/// An in-memory nearest-neighbour index over chunk embeddings.
///
/// Search is a linear scan followed by a stable sort, so equal scores keep
/// insertion order and results are reproducible.
///
/// # Example
///
/// ```rust
/// use ragline::{DistanceMetric, IndexEntry, VectorIndex};
///
/// let mut index = VectorIndex::new(DistanceMetric::Cosine);
/// index
///     .build(vec![
///         IndexEntry { chunk_id: "a".into(), vector: vec![1.0, 0.0], chunk_text: "A".into() },
///         IndexEntry { chunk_id: "b".into(), vector: vec![0.0, 1.0], chunk_text: "B".into() },
///     ])
///     .unwrap();
/// let results = index.search(&[0.0, 1.0], 1).unwrap();
/// assert_eq!(results[0].chunk_text, "B");
/// ```
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    metric: DistanceMetric,
    dimension: Option<usize>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Create an empty index using `metric`.
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric, dimension: None, entries: Vec::new() }
    }

    /// Replace the index contents with `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the entries do not all share
    /// the dimension of the first one. The previous contents are kept.
    pub fn build(&mut self, entries: Vec<IndexEntry>) -> Result<()> {
        let dimension = entries.first().map(|e| e.vector.len());
        if let Some(expected) = dimension {
            if let Some(bad) = entries.iter().find(|e| e.vector.len() != expected) {
                return Err(RagError::DimensionMismatch { expected, actual: bad.vector.len() });
            }
        }

        debug!(entry_count = entries.len(), dimension, "built vector index");
        self.dimension = dimension;
        self.entries = entries;
        Ok(())
    }

    /// Return the `k` entries most relevant to `query`, best first.
    ///
    /// An empty index yields an empty result. If `k` exceeds the number of
    /// entries, every entry is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if `query` does not have the
    /// index dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let Some(expected) = self.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != expected {
            return Err(RagError::DimensionMismatch { expected, actual: query.len() });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, self.metric.score(&entry.vector, query)))
            .collect();

        // `sort_by` is stable: ties keep insertion order.
        scored.sort_by(|a, b| self.metric.rank(a.1, b.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| {
                let entry = &self.entries[i];
                SearchResult {
                    chunk_id: entry.chunk_id.clone(),
                    chunk_text: entry.chunk_text.clone(),
                    score,
                }
            })
            .collect())
    }

    /// The configured metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The shared vector dimension, or `None` while empty.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
