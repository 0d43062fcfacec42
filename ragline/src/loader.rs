//! Directory scanning and text extraction.
//!
//! Turning a file into plain text is delegated to a [`TextExtractor`]. A file
//! that fails extraction is logged and skipped; it never aborts the scan.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::{RagError, Result};

/// Converts a source file into plain text.
pub trait TextExtractor: Send + Sync {
    /// Whether this extractor handles `path`. Unsupported files are ignored.
    fn supports(&self, path: &Path) -> bool;

    /// Extract the plain text of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestionError`] if the file cannot be read.
    fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Reads UTF-8 text files, selected by extension.
#[derive(Debug, Clone)]
pub struct PlainTextExtractor {
    extensions: Vec<String>,
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new(["txt", "md"])
    }
}

impl PlainTextExtractor {
    /// Accept files whose extension matches one of `extensions`
    /// (case-insensitive, without the leading dot).
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

impl TextExtractor for PlainTextExtractor {
    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn extract_text(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| RagError::IngestionError {
            source_ref: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// The outcome of scanning a directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// One document per successfully extracted file, in path order.
    pub documents: Vec<Document>,
    /// Files that were skipped, each as an [`RagError::IngestionError`].
    pub skipped: Vec<RagError>,
}

/// Scan `dir` recursively and extract every supported file.
///
/// Document IDs are paths relative to `dir`, so they are stable across runs.
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] if `dir` is not a directory. Per-file
/// failures are reported in [`LoadReport::skipped`] instead.
pub fn load_documents(dir: impl AsRef<Path>, extractor: &dyn TextExtractor) -> Result<LoadReport> {
    let root = dir.as_ref();
    if !root.is_dir() {
        return Err(RagError::ConfigError(format!(
            "document directory '{}' does not exist or is not a directory",
            root.display()
        )));
    }

    let mut report = LoadReport::default();
    let mut paths: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() && extractor.supports(entry.path()) => {
                paths.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                let source_ref = e.path().unwrap_or(root).display().to_string();
                warn!(source = %source_ref, error = %e, "skipping unreadable entry");
                report
                    .skipped
                    .push(RagError::IngestionError { source_ref, message: e.to_string() });
            }
        }
    }

    for path in paths {
        match extractor.extract_text(&path) {
            Ok(text) => {
                let id = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                report.documents.push(Document::new(id, path.display().to_string(), text));
            }
            Err(e) => {
                warn!(source = %path.display(), error = %e, "skipping file that failed extraction");
                report.skipped.push(e);
            }
        }
    }

    info!(
        directory = %root.display(),
        loaded = report.documents.len(),
        skipped = report.skipped.len(),
        "loaded documents"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_supported_files_in_path_order() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("b.txt"), "bravo").unwrap();
        fs::write(root.join("a.md"), "alpha").unwrap();
        fs::write(root.join("nested/c.TXT"), "charlie").unwrap();
        fs::write(root.join("ignored.bin"), [0u8, 1, 2]).unwrap();

        let report = load_documents(root, &PlainTextExtractor::default()).unwrap();
        let ids: Vec<&str> = report.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a.md", "b.txt", "nested/c.TXT"]);
        assert_eq!(report.documents[2].text, "charlie");
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn unreadable_files_are_skipped_not_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("good.txt"), "fine").unwrap();
        fs::write(root.join("bad.txt"), [0xffu8, 0xfe, 0xfd]).unwrap();

        let report = load_documents(root, &PlainTextExtractor::default()).unwrap();
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].id, "good.txt");
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0], RagError::IngestionError { .. }));
    }

    #[test]
    fn missing_directory_is_a_config_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = load_documents(temp.path().join("nope"), &PlainTextExtractor::default())
            .unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }
}
