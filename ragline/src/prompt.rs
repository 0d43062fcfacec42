//! Prompt composition from retrieved context and the user's query.

use crate::document::SearchResult;
use crate::error::{RagError, Result};

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";

const DEFAULT_TEMPLATE: &str = "\
Instructions:
You are an AI assistant specialized in providing mental health support. You have access to a large collection of documents related to mental health. You will be provided the result of a facial emotion recognition model.
Please analyze the detected emotion and provide a response to the user query using the retrieved documents. If the documents are not relevant, rely on your training data.

Retrieved Documents:
{context}

Detected Emotion:
{question}
";

/// A prompt with `{context}` and `{question}` slots.
///
/// The query is substituted verbatim; the template decides what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    /// The mental-health support template, whose question slot holds a
    /// detected emotion label.
    fn default() -> Self {
        Self { template: DEFAULT_TEMPLATE.to_string() }
    }
}

impl PromptTemplate {
    /// Create a template.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] unless both `{context}` and
    /// `{question}` appear in `template`.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for slot in [CONTEXT_SLOT, QUESTION_SLOT] {
            if !template.contains(slot) {
                return Err(RagError::ConfigError(format!(
                    "prompt template is missing the {slot} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    /// Fill the slots. Chunk texts are joined by a blank line in ranked order.
    pub fn render(&self, context: &[SearchResult], query: &str) -> String {
        let context =
            context.iter().map(|r| r.chunk_text.as_str()).collect::<Vec<_>>().join("\n\n");
        // Split on every question slot before substituting anything, so slot
        // markers inside chunk text or the query are left alone.
        self.template
            .split(QUESTION_SLOT)
            .map(|part| part.replace(CONTEXT_SLOT, &context))
            .collect::<Vec<_>>()
            .join(query)
    }

    /// The raw template text.
    pub fn as_str(&self) -> &str {
        &self.template
    }
}
