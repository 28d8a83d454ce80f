//! Chart-label reconstruction.
//!
//! Turns the unordered bag of labels a chart renders into code/value pairs:
//!
//! 1. [`collector`]: gather `(text, x, y, visible)` labels from a container
//! 2. [`dedup`]: drop shadow copies, then hidden labels
//! 3. [`classify`]: split into codes, positive values, negative values
//! 4. [`partition`]: propose a left/right split and validate it against counts
//! 5. [`pair`]: zip each side's codes with its values
//!
//! Ranked charts that put each side in its own container skip step 4 and
//! pair every code with every value in draw order.

pub mod classify;
pub mod collector;
pub mod dedup;
pub mod pair;
pub mod partition;

use tracing::{debug, info, instrument};

use crate::config::{ChartConfig, ChartSource, ChartSpec};
use crate::error::Result;
use crate::models::{
    GroupedResult, LabelItem, PairedRecord, PartitionResult, SourceOutcome, ValidatedSplit,
};
use classify::{ClassifiedLabels, TokenClassifier};
use collector::{SceneLabelQuery, collect_labels};

/// Intermediate and final results of a diverging-chart extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct DivergingExtraction {
    pub partition: PartitionResult,
    pub split: ValidatedSplit,
    pub result: GroupedResult,
    /// Codes seen, in draw order.
    pub codes: Vec<String>,
}

/// The configured chart pipeline.
#[derive(Debug, Clone)]
pub struct ChartPipeline {
    shadow_distance_px: f64,
    classifier: TokenClassifier,
}

impl ChartPipeline {
    pub fn new(config: &ChartConfig) -> Result<Self> {
        Ok(Self {
            shadow_distance_px: config.shadow_distance_px,
            classifier: TokenClassifier::from_config(config)?,
        })
    }

    /// Deduplicate, drop hidden labels, and classify.
    pub fn prepare(&self, labels: Vec<LabelItem>) -> ClassifiedLabels {
        let deduped = dedup::dedupe_shadows(labels, self.shadow_distance_px);
        let visible = dedup::visible_labels(deduped);
        self.classifier.classify(&visible)
    }

    /// Full pipeline for a chart drawing losers left of gainers.
    pub fn extract_diverging(&self, labels: Vec<LabelItem>) -> DivergingExtraction {
        let classified = self.prepare(labels);
        let partition = partition::gap_partition(&classified.codes);
        let split = partition::validate_split(
            partition.gap_split_index,
            classified.codes.len(),
            classified.negatives.len(),
            classified.positives.len(),
        );
        let result = pair::pair_sides(
            &classified.codes,
            split.split_index,
            &classified.negatives,
            &classified.positives,
        );
        debug!(
            split_index = split.split_index,
            left = result.left.len(),
            right = result.right.len(),
            "Diverging chart paired"
        );

        DivergingExtraction {
            partition,
            split,
            result,
            codes: classified.codes.into_iter().map(|c| c.text).collect(),
        }
    }

    /// Pair a ranked container's codes with its values in draw order.
    pub fn extract_ranked(&self, labels: Vec<LabelItem>) -> Vec<PairedRecord> {
        let classified = self.prepare(labels);
        pair::pair_sequential(&classified.codes, &classified.values)
    }

    /// Run one chart job against a scene.
    #[instrument(level = "info", skip_all, fields(chart = %spec.id))]
    pub fn run(&self, scene: &dyn SceneLabelQuery, spec: &ChartSpec) -> SourceOutcome<GroupedResult> {
        let result = match &spec.source {
            ChartSource::Diverging {
                container,
                label_selector,
            } => {
                let labels = collect_labels(scene, container, label_selector);
                if labels.is_empty() {
                    return SourceOutcome::Empty(format!("container `{container}` has no labels"));
                }
                let extraction = self.extract_diverging(labels);
                if extraction.codes.is_empty() {
                    return SourceOutcome::Empty("no stock codes found".to_string());
                }
                extraction.result
            }
            ChartSource::SplitContainers {
                left,
                right,
                label_selector,
            } => GroupedResult {
                left: self.extract_ranked(collect_labels(scene, left, label_selector)),
                right: self.extract_ranked(collect_labels(scene, right, label_selector)),
            },
        };

        if result.is_empty() {
            return SourceOutcome::Empty("no code/value pairs".to_string());
        }
        info!(
            left = result.left.len(),
            right = result.right.len(),
            "Extracted chart"
        );
        SourceOutcome::Success(result)
    }
}
