//! Append-only audit artifacts, one file per served query.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::document::Answer;
use crate::error::{RagError, Result};

const MAX_NAME_ATTEMPTS: usize = 1000;

/// Writes each [`Answer`] to its own timestamped file.
///
/// Files are created with `create_new`, so an existing artifact is never
/// overwritten; a name collision within the same millisecond gets a
/// numeric suffix.
#[derive(Debug, Clone)]
pub struct AuditWriter {
    dir: PathBuf,
}

impl AuditWriter {
    /// Write artifacts into `dir`, which is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `answer` and return the path of the new file.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::AuditError`] if the directory or file cannot be
    /// created or written.
    pub fn write(&self, answer: &Answer) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| RagError::AuditError {
            path: self.dir.clone(),
            message: e.to_string(),
        })?;

        let stem = format!("answer_{}", Local::now().format("%Y%m%d%H%M%S%3f"));
        let contents = render(answer);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name =
                if attempt == 0 { format!("{stem}.txt") } else { format!("{stem}_{attempt}.txt") };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(contents.as_bytes()).map_err(|e| RagError::AuditError {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                    debug!(path = %path.display(), "wrote audit artifact");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(RagError::AuditError { path, message: e.to_string() });
                }
            }
        }

        Err(RagError::AuditError {
            path: self.dir.join(format!("{stem}.txt")),
            message: "no free file name for audit artifact".to_string(),
        })
    }
}

/// Render the artifact body: query, ranked context, then the answer.
pub fn render(answer: &Answer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "User Query: {}", answer.query);
    let _ = writeln!(out, "\nRetrieved Documents:");
    for (idx, result) in answer.context.iter().enumerate() {
        let _ = writeln!(out, "\nDocument {}:", idx + 1);
        out.push_str(&result.chunk_text);
        let _ = writeln!(out, "\n{}", "-".repeat(40));
    }
    let _ = writeln!(out, "\nAnswer:");
    out.push_str(&answer.generated_text);
    let _ = writeln!(out, "\n{}", "=".repeat(50));
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::document::SearchResult;

    fn answer() -> Answer {
        Answer {
            query: "sad".into(),
            retrieved_chunk_ids: vec!["a_0".into(), "b_0".into()],
            context: vec![
                SearchResult { chunk_id: "a_0".into(), chunk_text: "first".into(), score: 0.9 },
                SearchResult { chunk_id: "b_0".into(), chunk_text: "second".into(), score: 0.5 },
            ],
            generated_text: "Take a walk.".into(),
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn renders_query_context_and_answer_in_order() {
        let text = render(&answer());
        assert!(text.starts_with("User Query: sad\n"));
        let first = text.find("Document 1:\nfirst").unwrap();
        let second = text.find("Document 2:\nsecond").unwrap();
        let reply = text.find("Answer:\nTake a walk.").unwrap();
        assert!(first < second && second < reply);
    }

    #[test]
    fn never_overwrites_existing_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let writer = AuditWriter::new(temp.path().join("audit"));

        let first = writer.write(&answer()).unwrap();
        let second = writer.write(&answer()).unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read_dir(writer.dir()).unwrap().count(), 2);
        assert!(fs::read_to_string(first).unwrap().contains("User Query: sad"));
    }
}
