//! Crawled markdown documents.
//!
//! Files are read concurrently; classification then runs in input order so
//! that duplicate bodies within one batch are caught by the seen-items store.

use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

use crate::document::DocumentRegionExtractor;
use crate::models::{ClassifiedDocument, DocumentReport, SourceOutcome};
use crate::seen::{SeenStore, content_key};

const PARALLEL_READS: usize = 8;

/// Read, deduplicate and classify every document.
///
/// # Arguments
///
/// * `paths` - Markdown files to process
/// * `extractor` - Configured document extractor
/// * `seen` - Seen-items store; new bodies are recorded in it
/// * `stamp` - Value recorded for new keys (`YYYY-MM-DD HH:MM`)
///
/// # Returns
///
/// One [`DocumentReport`] per path, in input order.
#[instrument(level = "info", skip_all, fields(count = paths.len()))]
pub async fn process_documents(
    paths: Vec<PathBuf>,
    extractor: &DocumentRegionExtractor,
    seen: &mut SeenStore,
    stamp: &str,
) -> Vec<DocumentReport> {
    let loaded: Vec<(String, std::io::Result<String>)> = stream::iter(paths)
        .map(|path| async move {
            let result = fs::read_to_string(&path).await;
            (path.display().to_string(), result)
        })
        .buffered(PARALLEL_READS)
        .collect()
        .await;

    let reports: Vec<DocumentReport> = loaded
        .into_iter()
        .map(|(source, read)| {
            let outcome = match read {
                Ok(raw) => process_document(&source, &raw, extractor, seen, stamp),
                Err(e) => {
                    error!(%source, error = %e, "Document read failed");
                    SourceOutcome::Failed(format!("read failed: {e}"))
                }
            };
            let cleaned_text = outcome
                .success()
                .map(ClassifiedDocument::cleaned_text)
                .unwrap_or_default();
            DocumentReport {
                source,
                cleaned_text,
                outcome,
            }
        })
        .collect();

    let ok = reports.iter().filter(|r| r.outcome.is_success()).count();
    info!(total = reports.len(), successful = ok, "Documents processed");
    reports
}

/// Classify one document body, skipping blanks and bodies seen before.
pub fn process_document(
    source: &str,
    raw: &str,
    extractor: &DocumentRegionExtractor,
    seen: &mut SeenStore,
    stamp: &str,
) -> SourceOutcome<ClassifiedDocument> {
    if raw.trim().is_empty() {
        warn!(%source, "Document is blank");
        return SourceOutcome::Empty("document is blank".to_string());
    }

    let key = content_key(raw);
    if seen.contains(&key) {
        debug!(%source, "Document already processed");
        return SourceOutcome::Empty("already processed".to_string());
    }

    let doc = extractor.extract(raw);
    if doc.kept().next().is_none() {
        warn!(%source, lines = doc.lines.len(), "No content lines survived classification");
        return SourceOutcome::Empty("no content lines".to_string());
    }

    seen.insert(key, stamp);
    info!(%source, kept = doc.kept().count(), trimmed = doc.trimmed, "Classified document");
    SourceOutcome::Success(doc)
}
