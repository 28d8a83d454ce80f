//! Data models shared by the chart and document pipelines.
//!
//! This module defines the structures that flow through the engine:
//! - [`LabelItem`]: one rendered text label with its screen position
//! - [`CodeToken`] / [`ValueToken`]: labels classified as stock codes or signed numbers
//! - [`PartitionResult`] / [`ValidatedSplit`]: the proposed and final left/right boundary
//! - [`PairedRecord`] / [`GroupedResult`]: the paired output of a chart
//! - [`DocumentLine`] / [`ContentRegion`] / [`ClassifiedDocument`]: the document side
//! - [`SourceOutcome`]: per-source success/empty/failure wrapper used by the batch runner

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::collapse_blank_lines;

fn default_visible() -> bool {
    true
}

/// One rendered text label inside a chart container.
///
/// Hidden labels are kept through shadow deduplication and filtered out
/// right before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelItem {
    /// Trimmed text content of the label.
    pub text: String,
    /// Horizontal screen position in pixels.
    pub x: f64,
    /// Vertical screen position in pixels.
    pub y: f64,
    /// Whether the label is rendered visibly.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl LabelItem {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            visible: true,
        }
    }

    pub fn hidden(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            visible: false,
            ..Self::new(text, x, y)
        }
    }

    /// Euclidean screen distance to another label.
    pub fn distance_to(&self, other: &LabelItem) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A label whose text is a stock code (e.g. `HDB`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeToken {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// A label that parsed as a signed decimal number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueToken {
    /// The label text as drawn, before separator removal.
    pub text: String,
    pub value: f64,
}

impl ValueToken {
    /// Zero counts as positive, matching how the charts colour unchanged rows.
    pub fn is_negative(&self) -> bool {
        self.value < 0.0
    }
}

/// The visual split proposed by the largest horizontal gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionResult {
    /// Midpoint of the widest gap, `None` when no positive gap exists.
    pub split_x: Option<f64>,
    /// Width of the widest gap (0.0 when there is none).
    pub max_gap: f64,
    /// Number of codes (original order) lying left of `split_x`.
    pub gap_split_index: usize,
}

/// How the constraint validator arrived at the final split index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitResolution {
    /// The gap index was inside `[valid_min, valid_max]`.
    GapAccepted,
    /// The gap index was below `valid_min` and was raised to it.
    RaisedToMin,
    /// The gap index was above `valid_max`; the validator still falls back
    /// to `valid_min`, not `valid_max`.
    OverflowFellBackToMin,
}

/// The split index after reconciling the gap heuristic with value counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatedSplit {
    /// Final boundary: `codes[..split_index]` is the left group.
    pub split_index: usize,
    /// Index proposed by the gap partitioner.
    pub gap_split_index: usize,
    /// Number of negative values (minimum size of the left group).
    pub valid_min: usize,
    /// `total_codes - positive values`; may be negative on inconsistent charts.
    pub valid_max: isize,
    pub resolution: SplitResolution,
}

/// One `{code, value}` output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedRecord {
    pub code: String,
    pub value: f64,
}

impl PairedRecord {
    pub fn new(code: impl Into<String>, value: f64) -> Self {
        Self {
            code: code.into(),
            value,
        }
    }
}

/// Two named sides of a chart, each an ordered list of paired records.
///
/// For diverging charts the left side holds the negative (loser) codes and
/// the right side the positive (gainer) codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedResult {
    pub left: Vec<PairedRecord>,
    pub right: Vec<PairedRecord>,
}

impl GroupedResult {
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Classification tag of a document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineTag {
    Text,
    Image,
    ChartData,
    Skip,
}

impl fmt::Display for LineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LineTag::Text => "TEXT",
            LineTag::Image => "IMAGE",
            LineTag::ChartData => "CHART_DATA",
            LineTag::Skip => "SKIP",
        };
        f.write_str(s)
    }
}

/// One classified line of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Position in the (SVG-normalized) line list.
    pub index: usize,
    /// The line as it appeared in the document.
    pub raw: String,
    /// Cleaned content: link-stripped text, the image reference, or the
    /// extracted chart text. Empty for skipped lines.
    pub content: String,
    pub tag: LineTag,
}

/// Half-open range `[start, end)` of lines holding the main content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRegion {
    pub start: usize,
    pub end: usize,
}

impl ContentRegion {
    /// The region covering a whole document of `total` lines.
    pub fn whole(total: usize) -> Self {
        Self { start: 0, end: total }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// A document after region slicing and line classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedDocument {
    pub lines: Vec<DocumentLine>,
    pub region: ContentRegion,
    /// False when the safety check abandoned slicing.
    pub trimmed: bool,
}

impl ClassifiedDocument {
    /// Lines that survived classification, in document order.
    pub fn kept(&self) -> impl Iterator<Item = &DocumentLine> {
        self.lines.iter().filter(|l| l.tag != LineTag::Skip)
    }

    pub fn lines_tagged(&self, tag: LineTag) -> impl Iterator<Item = &DocumentLine> {
        self.lines.iter().filter(move |l| l.tag == tag)
    }

    /// Kept content of the region joined back into a document.
    ///
    /// Skipped lines inside the region leave a paragraph break, and runs of
    /// breaks collapse to a single blank line.
    pub fn cleaned_text(&self) -> String {
        let joined = self
            .lines
            .iter()
            .filter(|l| self.region.contains(l.index))
            .map(|l| match l.tag {
                LineTag::Skip => "",
                _ => l.content.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        collapse_blank_lines(&joined)
    }
}

/// Result of one independent source (chart job or document).
///
/// A failing source never aborts the batch; it is recorded here and
/// rendered as a "no data" marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SourceOutcome<T> {
    Success(T),
    /// The source was present but produced nothing usable.
    Empty(String),
    /// The collaborator or I/O around the source failed.
    Failed(String),
}

impl<T> SourceOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SourceOutcome::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            SourceOutcome::Success(v) => Some(v),
            _ => None,
        }
    }
}

/// A chart job's outcome as handed to the report writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartReport {
    pub id: String,
    pub title: String,
    pub left_label: String,
    pub right_label: String,
    pub outcome: SourceOutcome<GroupedResult>,
}

/// A document's outcome as handed to the report writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Where the document came from (file path or link).
    pub source: String,
    /// Paragraph-collapsed body of a successful extraction.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cleaned_text: String,
    pub outcome: SourceOutcome<ClassifiedDocument>,
}

/// Everything produced by one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    /// `YYYYMMDD`.
    pub local_date: String,
    /// `HHMM`.
    pub local_time: String,
    pub charts: Vec<ChartReport>,
    pub documents: Vec<DocumentReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_distance() {
        let a = LabelItem::new("5.00", 10.0, 10.0);
        let b = LabelItem::new("5.00", 13.0, 14.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_label_visible_defaults_to_true() {
        let label: LabelItem = serde_json::from_str(r#"{"text":"HDB","x":1.0,"y":2.0}"#).unwrap();
        assert!(label.visible);
    }

    #[test]
    fn test_line_tag_serialization() {
        assert_eq!(serde_json::to_string(&LineTag::ChartData).unwrap(), "\"CHART_DATA\"");
        assert_eq!(LineTag::Skip.to_string(), "SKIP");
    }

    #[test]
    fn test_region_helpers() {
        let region = ContentRegion { start: 12, end: 990 };
        assert_eq!(region.len(), 978);
        assert!(region.contains(12));
        assert!(!region.contains(990));
        assert!(ContentRegion::whole(0).is_empty());
    }

    #[test]
    fn test_source_outcome_serialization() {
        let ok: SourceOutcome<GroupedResult> = SourceOutcome::Success(GroupedResult::default());
        let json = serde_json::to_string(&ok).unwrap();
        assert!(json.contains("\"status\":\"success\""));

        let empty: SourceOutcome<GroupedResult> = SourceOutcome::Empty("no codes".to_string());
        let json = serde_json::to_string(&empty).unwrap();
        assert_eq!(json, r#"{"status":"empty","data":"no codes"}"#);
    }

    #[test]
    fn test_cleaned_text_skips_dropped_lines() {
        let doc = ClassifiedDocument {
            lines: vec![
                DocumentLine {
                    index: 0,
                    raw: "menu".to_string(),
                    content: String::new(),
                    tag: LineTag::Skip,
                },
                DocumentLine {
                    index: 1,
                    raw: "body".to_string(),
                    content: "body".to_string(),
                    tag: LineTag::Text,
                },
            ],
            region: ContentRegion::whole(2),
            trimmed: false,
        };
        assert_eq!(doc.cleaned_text(), "body");
        assert_eq!(doc.kept().count(), 1);
    }

    #[test]
    fn test_cleaned_text_collapses_paragraph_breaks() {
        let line = |index: usize, content: &str, tag: LineTag| DocumentLine {
            index,
            raw: content.to_string(),
            content: content.to_string(),
            tag,
        };
        let doc = ClassifiedDocument {
            lines: vec![
                line(0, "Đoạn một", LineTag::Text),
                line(1, "Đoạn hai", LineTag::Text),
                line(2, "", LineTag::Skip),
                line(3, "", LineTag::Skip),
                line(4, "", LineTag::Skip),
                line(5, "Đoạn ba", LineTag::Text),
                line(6, "", LineTag::Skip),
                line(7, "Ngoài vùng", LineTag::Text),
            ],
            region: ContentRegion { start: 0, end: 7 },
            trimmed: true,
        };
        assert_eq!(doc.cleaned_text(), "Đoạn một\nĐoạn hai\n\nĐoạn ba");
    }
}
