//! Fixed-window document chunking.
//!
//! A window of `chunk_size` characters slides across the text, advancing by
//! `chunk_size - chunk_overlap` each step. The final window is trimmed to the
//! remaining text, so no chunk is empty and none extends past the text.
//! Removing the trailing `chunk_overlap` characters from every non-final
//! chunk and concatenating the results reproduces the input text.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size chunks by character count with overlap.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`.
///
/// # Example
///
/// ```rust
/// use ragline::{Chunker, Document, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(5, 0).unwrap();
/// let chunks = chunker.chunk(&Document::new("a", "a.txt", "AAAAABBBBB"));
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].text, "BBBBB");
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of overlapping characters between consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::config("chunk_size must be greater than zero"));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// The maximum number of characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The number of characters shared by consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let text = &document.text;
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, plus the end of the text.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_count = boundaries.len() - 1;
        let step = self.chunk_size - self.chunk_overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        loop {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(Chunk {
                id: format!("{}_{chunk_index}", document.id),
                document_id: document.id.clone(),
                text: text[boundaries[start]..boundaries[end]].to_string(),
                start_offset: start,
                length: end - start,
            });

            if end == char_count {
                break;
            }
            chunk_index += 1;
            start += step;
        }

        chunks
    }
}

/// Split a document with a one-off [`FixedSizeChunker`].
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] for invalid chunking parameters.
pub fn split(document: &Document, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<Chunk>> {
    Ok(FixedSizeChunker::new(chunk_size, chunk_overlap)?.chunk(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new("doc", "doc.txt", text)
    }

    #[test]
    fn splits_without_overlap() {
        let chunks = split(&doc("AAAAABBBBB"), 5, 0).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["AAAAA", "BBBBB"]);
        assert_eq!(chunks[1].id, "doc_1");
        assert_eq!(chunks[1].start_offset, 5);
        assert_eq!(chunks[1].length, 5);
    }

    #[test]
    fn overlapping_windows_share_characters() {
        let chunks = split(&doc("abcdefghij"), 4, 2).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abcd", "cdef", "efgh", "ghij"]);
    }

    #[test]
    fn final_chunk_is_trimmed() {
        let chunks = split(&doc("abcdefg"), 3, 1).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["abc", "cde", "efg"]);

        let chunks = split(&doc("abcdefgh"), 3, 1).unwrap();
        assert_eq!(chunks.last().unwrap().text, "gh");
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = split(&doc("hi"), 10, 3).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hi");
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split(&doc(""), 10, 3).unwrap().is_empty());
    }

    #[test]
    fn counts_characters_not_bytes() {
        let chunks = split(&doc("héllo wörld"), 4, 0).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["héll", "o wö", "rld"]);
        assert_eq!(chunks[2].start_offset, 8);
    }

    #[test]
    fn invalid_parameters_are_config_errors() {
        assert!(matches!(split(&doc("abc"), 3, 3), Err(RagError::ConfigError(_))));
        assert!(matches!(split(&doc("abc"), 3, 4), Err(RagError::ConfigError(_))));
        assert!(matches!(split(&doc("abc"), 0, 0), Err(RagError::ConfigError(_))));
    }
}
