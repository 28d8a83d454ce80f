//! # Market Digest
//!
//! Heuristic extraction engine for Vietnamese stock-market pages.
//!
//! Two pipelines share one configuration and one report model:
//!
//! - **Charts** ([`chart`]): rebuild `(stock code, value)` pairs from the
//!   positioned text labels of a rendered bar chart, using geometry (shadow
//!   removal, largest-gap partition) and sign/count constraints.
//! - **Documents** ([`document`]): tag each line of a crawled markdown page
//!   as `TEXT`, `IMAGE`, `CHART_DATA` or `SKIP` and cut the page down to its
//!   main-content region.
//!
//! The [`sources`] runners wrap every chart job and document in a
//! [`SourceOutcome`](models::SourceOutcome) so one bad source never stops a
//! batch, and [`outputs`] writes the resulting [`Digest`](models::Digest).
//!
//! ## Example
//!
//! ```no_run
//! use market_digest::chart::ChartPipeline;
//! use market_digest::config::ChartConfig;
//! use market_digest::models::LabelItem;
//!
//! let pipeline = ChartPipeline::new(&ChartConfig::default()).unwrap();
//! let labels = vec![
//!     LabelItem::new("HDB", 10.0, 0.0),
//!     LabelItem::new("-1.20", 10.0, 20.0),
//!     LabelItem::new("VPL", 300.0, 0.0),
//!     LabelItem::new("3.45", 300.0, 20.0),
//! ];
//! let extraction = pipeline.extract_diverging(labels);
//! assert_eq!(extraction.result.left[0].code, "HDB");
//! ```

pub mod chart;
pub mod config;
pub mod document;
pub mod error;
pub mod models;
pub mod outputs;
pub mod seen;
pub mod sources;
pub mod utils;
