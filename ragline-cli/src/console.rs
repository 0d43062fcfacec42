//! Interactive question-answering loop.

use std::io::{self, BufRead, Write};

use ragline::{AuditWriter, RagPipeline};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

const PROMPT: &str = "Enter your query: ";
const RULE_WIDTH: usize = 50;

/// Supplies one line of user input per call.
pub trait LineSource {
    /// Read the next line, without its terminator. `None` ends the session.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Line editing with in-memory history, for interactive terminals.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    /// Create an editor bound to the terminal.
    ///
    /// # Errors
    ///
    /// Fails when the terminal cannot be configured.
    pub fn new() -> io::Result<Self> {
        let editor = DefaultEditor::new().map_err(io::Error::other)?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            // Ctrl-C and Ctrl-D both end the session.
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

/// Reads lines from any buffered reader, e.g. piped stdin or a script.
pub struct BufReadSource<R> {
    reader: R,
}

impl<R: BufRead> BufReadSource<R> {
    /// Read lines from `reader` until it is exhausted.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

/// Outcome counts for one console session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleSummary {
    /// Queries that produced an answer.
    pub answered: usize,
    /// Queries that ended in an error.
    pub failed: usize,
}

fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Run the read-answer loop until `exit`, `quit` or end of input.
///
/// Each query is answered to completion before the next line is read. A
/// failed query is reported on `out` and the loop continues. When `audit`
/// is set, every answer is also written to its own file.
///
/// # Errors
///
/// Only I/O errors on `source` or `out` end the loop early.
pub async fn run_console<W: Write>(
    pipeline: &RagPipeline,
    source: &mut dyn LineSource,
    out: &mut W,
    audit: Option<&AuditWriter>,
) -> io::Result<ConsoleSummary> {
    let rule = "=".repeat(RULE_WIDTH);
    let mut summary = ConsoleSummary::default();

    writeln!(out, "Welcome to the RAG System!")?;
    writeln!(out, "Type 'exit' or 'quit' to terminate the program.\n")?;
    out.flush()?;

    while let Some(line) = source.read_line(PROMPT)? {
        if line.trim().is_empty() {
            continue;
        }
        if is_exit_command(&line) {
            break;
        }

        match pipeline.answer(&line).await {
            Ok(answer) => {
                summary.answered += 1;
                writeln!(out, "\nGenerated Answer:\n")?;
                writeln!(out, "{}", answer.generated_text)?;
                writeln!(out, "\n{rule}\n")?;
                writeln!(out, "total time: {:.3}s", answer.elapsed.as_secs_f64())?;

                if let Some(writer) = audit {
                    if let Err(e) = writer.write(&answer) {
                        warn!(error = %e, "failed to write audit file");
                        writeln!(out, "An error occurred: {e}")?;
                    }
                }
            }
            Err(e) => {
                summary.failed += 1;
                writeln!(out, "An error occurred: {e}")?;
                writeln!(out, "\n{rule}\n")?;
            }
        }
        out.flush()?;
    }

    writeln!(out, "Goodbye!")?;
    out.flush()?;
    Ok(summary)
}
