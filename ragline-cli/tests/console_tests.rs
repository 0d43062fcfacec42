//! Scripted console sessions against in-process providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ragline::{
    AuditWriter, CompletionConfig, CompletionProvider, CompletionRequest, Document,
    EmbeddingProvider, HttpCompletionClient, HttpResponse, HttpTransport, RagConfig, RagPipeline,
    Result, TransportError,
};
use ragline_cli::{BufReadSource, ConsoleSummary, run_console};
use serde_json::Value;

/// Two-dimensional embeddings: vowels-first texts point one way, the rest
/// the other.
struct VowelEmbedder;

#[async_trait]
impl EmbeddingProvider for VowelEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vowel = text.chars().next().is_some_and(|c| "aeiouAEIOU".contains(c));
        Ok(if vowel { vec![1.0, 0.0] } else { vec![0.0, 1.0] })
    }

    fn name(&self) -> &str {
        "vowel"
    }
}

struct CannedCompletion;

#[async_trait]
impl CompletionProvider for CannedCompletion {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        Ok("Try a breathing exercise.".to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Fails the first completion call with HTTP 500, then succeeds.
struct FlakyTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl HttpTransport for FlakyTransport {
    async fn post_json(
        &self,
        _url: &str,
        _bearer_token: Option<&str>,
        _body: &Value,
    ) -> std::result::Result<HttpResponse, TransportError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(HttpResponse::new(500, r#"{"error":{"message":"upstream exploded"}}"#))
        } else {
            Ok(HttpResponse::new(200, r#"{"completion":"Second time lucky."}"#))
        }
    }
}

async fn pipeline_with(completion: Arc<dyn CompletionProvider>) -> RagPipeline {
    let config = RagConfig::builder().chunk_size(8).chunk_overlap(0).top_k(1).build().unwrap();
    let mut pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(VowelEmbedder))
        .completion_provider(completion)
        .build()
        .unwrap();
    pipeline
        .ingest(&[
            Document::new("calm", "calm.txt", "anchor breathing"),
            Document::new("move", "move.txt", "stretch walk"),
        ])
        .await
        .unwrap();
    pipeline
}

async fn run_script(
    pipeline: &RagPipeline,
    script: &str,
    audit: Option<&AuditWriter>,
) -> (ConsoleSummary, String) {
    let mut source = BufReadSource::new(script.as_bytes());
    let mut out = Vec::new();
    let summary = run_console(pipeline, &mut source, &mut out, audit).await.unwrap();
    (summary, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn answers_until_exit_and_says_goodbye() {
    let pipeline = pipeline_with(Arc::new(CannedCompletion)).await;

    let (summary, output) = run_script(&pipeline, "anxious\n\n  QUIT  \nsad\n", None).await;

    assert_eq!(summary, ConsoleSummary { answered: 1, failed: 0 });
    assert!(output.starts_with("Welcome to the RAG System!"));
    assert!(output.contains("Try a breathing exercise."));
    assert!(output.contains(&"=".repeat(50)));
    assert!(output.contains("total time: "));
    assert!(output.trim_end().ends_with("Goodbye!"));
}

#[tokio::test]
async fn end_of_input_ends_the_session() {
    let pipeline = pipeline_with(Arc::new(CannedCompletion)).await;
    let (summary, output) = run_script(&pipeline, "happy\nangry", None).await;
    assert_eq!(summary.answered, 2);
    assert!(output.trim_end().ends_with("Goodbye!"));
}

#[tokio::test]
async fn completion_failure_is_reported_and_loop_continues() {
    let transport = Arc::new(FlakyTransport { calls: AtomicUsize::new(0) });
    let client = HttpCompletionClient::new(
        CompletionConfig::new("key").with_endpoint("http://completion.test/v1/complete"),
        transport.clone(),
    )
    .unwrap();
    let pipeline = pipeline_with(Arc::new(client)).await;

    let (summary, output) = run_script(&pipeline, "fearful\nfearful\nexit\n", None).await;

    assert_eq!(summary, ConsoleSummary { answered: 1, failed: 1 });
    assert!(output.contains("An error occurred: "));
    assert!(output.contains("upstream exploded"));
    assert!(output.contains("Second time lucky."));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn each_answer_gets_its_own_audit_file() {
    let dir = tempfile::tempdir().unwrap();
    let audit = AuditWriter::new(dir.path().join("audit"));
    let pipeline = pipeline_with(Arc::new(CannedCompletion)).await;

    let (summary, _) = run_script(&pipeline, "anxious\nneutral\nexit\n", Some(&audit)).await;
    assert_eq!(summary.answered, 2);

    let mut files: Vec<_> = std::fs::read_dir(audit.dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    assert_eq!(files.len(), 2);

    let contents: Vec<String> =
        files.iter().map(|p| std::fs::read_to_string(p).unwrap()).collect();
    assert!(contents.iter().any(|c| c.contains("User Query: anxious")));
    assert!(contents.iter().any(|c| c.contains("User Query: neutral")));
    assert!(contents.iter().all(|c| c.contains("Try a breathing exercise.")));
}
