//! Batch runners for the two kinds of source.
//!
//! Every source is isolated: whatever happens to one chart job or one
//! document is recorded as a [`SourceOutcome`](crate::models::SourceOutcome)
//! and the batch carries on.
//!
//! | Source | Module | Input | Output |
//! |--------|--------|-------|--------|
//! | Chart jobs | [`charts`] | one rendered scene (JSON label dump or HTML/SVG snapshot) | [`ChartReport`](crate::models::ChartReport) per job |
//! | Documents | [`documents`] | crawled markdown files | [`DocumentReport`](crate::models::DocumentReport) per file |

pub mod charts;
pub mod documents;
