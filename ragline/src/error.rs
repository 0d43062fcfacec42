//! Error types for the `ragline` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in RAG operations.
///
/// Each variant is one failure class of the pipeline, so callers can
/// branch on the kind of failure without inspecting messages.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid construction parameters, missing credentials, or bad
    /// chunking parameters. Raised before any side effect.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A single source file could not be turned into a document.
    #[error("Ingestion error ({source_ref}): {message}")]
    IngestionError {
        /// The path or URI of the source that failed.
        source_ref: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector did not have the dimension of the index it was used with.
    #[error("Index error: vector dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch {
        /// The dimension of the index.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },

    /// The remote text-generation call failed.
    #[error("Completion error ({provider}): {message}")]
    CompletionError {
        /// The completion provider that produced the error.
        provider: String,
        /// The HTTP status, when the endpoint answered at all.
        status: Option<u16>,
        /// A description of the failure, including the underlying cause.
        message: String,
    },

    /// The audit artifact for an answer could not be written.
    #[error("Audit error ({}): {message}", path.display())]
    AuditError {
        /// The file or directory being written.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },
}

impl RagError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    pub(crate) fn embedding(provider: &str, message: impl Into<String>) -> Self {
        Self::EmbeddingError { provider: provider.to_string(), message: message.into() }
    }

    pub(crate) fn completion(
        provider: &str,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::CompletionError { provider: provider.to_string(), status, message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
