//! Left/right boundary detection for diverging charts.
//!
//! The gap partitioner proposes a split at the widest horizontal gap between
//! code labels; the constraint validator reconciles that proposal with the
//! number of negative and positive values the chart shows.

use itertools::Itertools;
use tracing::{debug, warn};

use crate::models::{CodeToken, PartitionResult, SplitResolution, ValidatedSplit};

/// Propose a split at the widest gap between adjacent code x-positions.
///
/// `gap_split_index` counts codes, in their original order, lying strictly
/// left of the gap midpoint. With fewer than two codes, or with every code
/// at the same x, there is no gap and the index is 0.
pub fn gap_partition(codes: &[CodeToken]) -> PartitionResult {
    let xs: Vec<f64> = codes
        .iter()
        .map(|c| c.x)
        .sorted_by(|a, b| a.total_cmp(b))
        .collect();

    let mut max_gap = 0.0;
    let mut split_x = None;
    for (a, b) in xs.iter().tuple_windows() {
        let gap = b - a;
        if gap > max_gap {
            max_gap = gap;
            split_x = Some((a + b) / 2.0);
        }
    }

    let gap_split_index = match split_x {
        Some(split) => codes.iter().filter(|c| c.x < split).count(),
        None => 0,
    };

    debug!(codes = codes.len(), max_gap, ?split_x, gap_split_index, "Gap partition");
    PartitionResult {
        split_x,
        max_gap,
        gap_split_index,
    }
}

/// Reconcile the gap index with the value counts.
///
/// The left group needs at least one code per negative value
/// (`valid_min`), the right group at least one per positive value
/// (`valid_max = total_codes - positives`). Below the range the index is
/// raised to `valid_min`; above it the index also falls back to
/// `valid_min`. The result never exceeds `total_codes`.
pub fn validate_split(
    gap_split_index: usize,
    total_codes: usize,
    negatives: usize,
    positives: usize,
) -> ValidatedSplit {
    let valid_min = negatives;
    let valid_max = total_codes as isize - positives as isize;

    let (chosen, resolution) = if gap_split_index < valid_min {
        (valid_min, SplitResolution::RaisedToMin)
    } else if gap_split_index as isize > valid_max {
        (valid_min, SplitResolution::OverflowFellBackToMin)
    } else {
        (gap_split_index, SplitResolution::GapAccepted)
    };
    let split_index = chosen.min(total_codes);

    if resolution == SplitResolution::GapAccepted {
        debug!(gap_split_index, valid_min, valid_max, split_index, "Gap split accepted");
    } else {
        warn!(
            gap_split_index,
            valid_min,
            valid_max,
            split_index,
            ?resolution,
            "Gap split outside valid range; using minimum"
        );
    }

    ValidatedSplit {
        split_index,
        gap_split_index,
        valid_min,
        valid_max,
        resolution,
    }
}
