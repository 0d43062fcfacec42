//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ragline::{
    CompletionProvider, CompletionRequest, EmbeddingProvider, HttpResponse, HttpTransport,
    RagError, Result, TransportError,
};
use serde_json::Value;

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub bearer_token: Option<String>,
    pub body: Value,
}

type Responder = dyn Fn(&str, &Value) -> std::result::Result<HttpResponse, TransportError>
    + Send
    + Sync;

/// An in-process transport that answers from a closure and records calls.
pub struct MockTransport {
    responder: Box<Responder>,
    calls: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &Value) -> std::result::Result<HttpResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `status` and `body`.
    pub fn fixed(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::new(move |_, _| Ok(HttpResponse::new(status, body.clone())))
    }

    /// Always fail before a response arrives.
    pub fn unreachable() -> Self {
        Self::new(|_, _| Err(TransportError("connection refused".into())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        body: &Value,
    ) -> std::result::Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            bearer_token: bearer_token.map(str::to_string),
            body: body.clone(),
        });
        (self.responder)(url, body)
    }
}

/// Deterministic embeddings: a one-hot vector keyed by the text's first
/// letter (`A` → index 0, `B` → index 1, ...).
pub struct OneHotEmbedder;

pub const ONE_HOT_DIM: usize = 26;

pub fn one_hot(letter: char) -> Vec<f32> {
    let mut v = vec![0.0; ONE_HOT_DIM];
    let idx = (letter.to_ascii_uppercase() as u8).saturating_sub(b'A') as usize;
    v[idx.min(ONE_HOT_DIM - 1)] = 1.0;
    v
}

#[async_trait]
impl EmbeddingProvider for OneHotEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let first = text.chars().next().ok_or_else(|| RagError::EmbeddingError {
            provider: "one-hot".into(),
            message: "cannot embed empty text".into(),
        })?;
        Ok(one_hot(first))
    }

    fn name(&self) -> &str {
        "one-hot"
    }
}

/// An embedder whose every call fails.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingError { provider: "failing".into(), message: "service down".into() })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// A completion provider that echoes the prompt back and counts calls.
#[derive(Default)]
pub struct EchoCompletion {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionProvider for EchoCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(format!("echo: {}", request.prompt.len()))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// How a [`SwitchableEmbedder`] answers its next batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderMode {
    Healthy,
    Failing,
    /// Returns one vector fewer than requested.
    ShortBatch,
}

/// One-hot embeddings until switched into a broken mode.
pub struct SwitchableEmbedder {
    mode: Mutex<EmbedderMode>,
}

impl SwitchableEmbedder {
    pub fn new() -> Self {
        Self { mode: Mutex::new(EmbedderMode::Healthy) }
    }

    pub fn set_mode(&self, mode: EmbedderMode) {
        *self.mode.lock().unwrap() = mode;
    }

    fn mode(&self) -> EmbedderMode {
        *self.mode.lock().unwrap()
    }
}

#[async_trait]
impl EmbeddingProvider for SwitchableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self.mode() {
            EmbedderMode::Failing => Err(RagError::EmbeddingError {
                provider: "switchable".into(),
                message: "service down".into(),
            }),
            _ => OneHotEmbedder.embed(text).await,
        }
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        if self.mode() == EmbedderMode::ShortBatch {
            vectors.pop();
        }
        Ok(vectors)
    }

    fn name(&self) -> &str {
        "switchable"
    }
}
