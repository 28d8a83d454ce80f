//! Shadow-label suppression.
//!
//! Chart renderers draw an outline copy of some labels at (almost) the same
//! spot. Identical text alone is not enough to call a label a shadow: two
//! different stocks can show the same value, so the positions must also
//! coincide.

use tracing::debug;

use crate::models::LabelItem;

/// Drop shadow copies, keeping draw order.
///
/// The first label is always kept. Each later label is compared with the
/// last *kept* label and discarded only if the text is identical and the
/// distance is below `shadow_distance_px`. Hidden labels take part in the
/// comparison; use [`visible_labels`] afterwards.
pub fn dedupe_shadows(labels: Vec<LabelItem>, shadow_distance_px: f64) -> Vec<LabelItem> {
    let total = labels.len();
    let mut kept: Vec<LabelItem> = Vec::with_capacity(total);

    for label in labels {
        if let Some(prev) = kept.last() {
            if prev.text == label.text && prev.distance_to(&label) < shadow_distance_px {
                continue;
            }
        }
        kept.push(label);
    }

    debug!(total, kept = kept.len(), "Shadow labels removed");
    kept
}

/// Keep labels that are visible and carry text.
pub fn visible_labels(labels: Vec<LabelItem>) -> Vec<LabelItem> {
    labels
        .into_iter()
        .filter(|l| l.visible && !l.text.is_empty())
        .collect()
}
