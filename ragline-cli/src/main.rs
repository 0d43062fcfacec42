use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ragline::{AuditWriter, HttpTransport, PlainTextExtractor, ReqwestTransport, load_documents};
use ragline_cli::{EditorSource, Settings, init_logging, run_console};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::parse();
    init_logging(&settings.log_level);

    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::from_config(&settings.transport_config())
            .context("failed to create HTTP client")?,
    );

    let mut pipeline = settings
        .build_pipeline(settings.completion_config(), transport)
        .context("invalid settings")?;

    let loaded = load_documents(&settings.docs_dir, &PlainTextExtractor::default())
        .with_context(|| {
            format!("failed to load documents from {}", settings.docs_dir.display())
        })?;

    let report = pipeline.ingest(&loaded.documents).await.context("ingestion failed")?;
    info!(
        documents = report.document_count,
        chunks = report.chunk_count,
        skipped = loaded.skipped.len(),
        "index ready"
    );

    let audit = (!settings.no_audit).then(|| AuditWriter::new(&settings.audit_dir));
    let mut source = EditorSource::new().context("failed to initialise line editor")?;
    let mut stdout = io::stdout();
    let summary = run_console(&pipeline, &mut source, &mut stdout, audit.as_ref()).await?;
    info!(answered = summary.answered, failed = summary.failed, "session ended");

    Ok(())
}
