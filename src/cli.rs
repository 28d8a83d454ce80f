//! Command-line interface definitions for Market Digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Paths that rarely change per run can also come from environment variables.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Market Digest application.
///
/// A run reads one rendered scene for the chart jobs and any number of
/// crawled markdown documents, then writes a JSON and a Markdown digest.
///
/// # Examples
///
/// ```sh
/// # Charts only
/// market_digest -j ./json -m ./markdown --scene ./snapshots/vietstock.html
///
/// # Documents with a persistent seen-items store and custom thresholds
/// market_digest -j ./json -m ./markdown -c ./config.yaml \
///     --document ./crawl/a.md --document ./crawl/b.md --seen-state ./state/seen.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the JSON digest
    #[arg(short, long)]
    pub json_output_dir: PathBuf,

    /// Output directory for the Markdown digest
    #[arg(short, long)]
    pub markdown_output_dir: PathBuf,

    /// Optional path to config.yaml file
    #[arg(short, long, env = "MARKET_DIGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Rendered page snapshot (HTML/SVG markup or JSON label dump) for the chart jobs
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Crawled markdown document to classify (repeatable)
    #[arg(long = "document", value_name = "PATH")]
    pub documents: Vec<PathBuf>,

    /// Seen-items state file used to skip documents processed before
    #[arg(long, env = "MARKET_DIGEST_SEEN_STATE", default_value = "seen_items.json")]
    pub seen_state: PathBuf,
}
