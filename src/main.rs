//! # Market Digest
//!
//! Command-line runner for the extraction engine. One run:
//!
//! 1. **Configuration**: load thresholds and chart jobs (YAML or defaults)
//! 2. **Charts**: run every chart job against the rendered scene snapshot
//! 3. **Documents**: classify crawled markdown files, skipping ones seen before
//! 4. **Output**: write the JSON and Markdown digests, then save the seen-items state
//!
//! ## Usage
//!
//! ```sh
//! market_digest -j ./json -m ./markdown --scene ./scene.html --document ./crawl/a.md
//! ```

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;
use market_digest::chart::ChartPipeline;
use market_digest::config::load_config;
use market_digest::document::DocumentRegionExtractor;
use market_digest::models::Digest;
use market_digest::outputs::{json, markdown};
use market_digest::seen::SeenStore;
use market_digest::sources::{charts, documents};
use market_digest::utils::{ensure_writable_dir, run_stamp};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("market_digest starting up");

    let args = Cli::parse();
    debug!(?args.json_output_dir, ?args.markdown_output_dir, ?args.scene, documents = args.documents.len(), "Parsed CLI arguments");

    // Early check: output dirs must be writable before any work is done
    for dir in [&args.json_output_dir, &args.markdown_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Load config ----
    let config = load_config(args.config.as_deref()).await?;
    let pipeline = ChartPipeline::new(&config.chart)?;
    let extractor = DocumentRegionExtractor::new(&config.document)?;

    let (local_date, local_time, now) = run_stamp();
    let stamp = now.format("%Y-%m-%d %H:%M").to_string();

    // ---- Charts ----
    let chart_reports = match &args.scene {
        Some(scene_path) => charts::chart_reports(scene_path, &pipeline, &config.charts).await,
        None => {
            if !config.charts.is_empty() {
                warn!(jobs = config.charts.len(), "No scene snapshot given; skipping chart jobs");
            }
            Vec::new()
        }
    };

    // ---- Documents ----
    let mut seen = SeenStore::load(&args.seen_state).await;
    let document_reports =
        documents::process_documents(args.documents.clone(), &extractor, &mut seen, &stamp).await;

    let digest = Digest {
        local_date,
        local_time,
        charts: chart_reports,
        documents: document_reports,
    };

    // ---- Output ----
    if let Err(e) = json::write_digest(&digest, &args.json_output_dir).await {
        error!(error = %e, "Failed to write JSON digest");
    }
    if let Err(e) = markdown::write_markdown(&digest, &args.markdown_output_dir).await {
        error!(error = %e, "Failed to write Markdown digest");
    }
    if let Err(e) = seen.save().await {
        error!(error = %e, "Failed to save seen-items state");
    }

    let charts_ok = digest.charts.iter().filter(|c| c.outcome.is_success()).count();
    let documents_ok = digest.documents.iter().filter(|d| d.outcome.is_success()).count();
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        charts = digest.charts.len(),
        charts_ok,
        documents = digest.documents.len(),
        documents_ok,
        "Execution complete"
    );

    Ok(())
}
