//! Positional pairing of codes with values.
//!
//! Pairing never sorts: the chart draws its rows in ranking order and that
//! order is what the report shows.

use crate::models::{CodeToken, GroupedResult, PairedRecord, ValueToken};

/// Zip codes with values position by position, truncating to the shorter list.
pub fn pair_sequential(codes: &[CodeToken], values: &[ValueToken]) -> Vec<PairedRecord> {
    codes
        .iter()
        .zip(values)
        .map(|(code, value)| PairedRecord::new(code.text.clone(), value.value))
        .collect()
}

/// Split codes at `split_index` and pair each side with its values.
///
/// `codes[..split_index]` pairs with the negative values (left side),
/// `codes[split_index..]` with the positive values (right side).
pub fn pair_sides(
    codes: &[CodeToken],
    split_index: usize,
    negatives: &[ValueToken],
    positives: &[ValueToken],
) -> GroupedResult {
    let (left_codes, right_codes) = codes.split_at(split_index.min(codes.len()));
    GroupedResult {
        left: pair_sequential(left_codes, negatives),
        right: pair_sequential(right_codes, positives),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn codes(names: &[&str]) -> Vec<CodeToken> {
        names
            .iter()
            .map(|n| CodeToken {
                text: n.to_string(),
                x: 0.0,
                y: 0.0,
            })
            .collect()
    }

    fn vals(vs: &[f64]) -> Vec<ValueToken> {
        vs.iter()
            .map(|v| ValueToken {
                text: v.to_string(),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn test_pair_sequential_truncates() {
        let out = pair_sequential(&codes(&["HDB", "LPB", "STB"]), &vals(&[1.0, 2.0]));
        assert_eq!(
            out,
            vec![PairedRecord::new("HDB", 1.0), PairedRecord::new("LPB", 2.0)]
        );
    }

    #[test]
    fn test_pair_sequential_keeps_emission_order() {
        let out = pair_sequential(&codes(&["VPL", "HDB"]), &vals(&[3.0, 9.0]));
        assert_eq!(out[0], PairedRecord::new("VPL", 3.0));
        assert_eq!(out[1], PairedRecord::new("HDB", 9.0));
    }

    #[test]
    fn test_pair_sides() {
        let grouped = pair_sides(
            &codes(&["HDB", "LPB", "STB", "VPL"]),
            1,
            &vals(&[-1.2]),
            &vals(&[72.06, 3.45, 5.1]),
        );
        assert_eq!(grouped.left, vec![PairedRecord::new("HDB", -1.2)]);
        assert_eq!(
            grouped.right,
            vec![
                PairedRecord::new("LPB", 72.06),
                PairedRecord::new("STB", 3.45),
                PairedRecord::new("VPL", 5.1),
            ]
        );
    }

    #[test]
    fn test_pair_sides_out_of_range_split() {
        let grouped = pair_sides(&codes(&["HDB"]), 5, &vals(&[-1.0, -2.0]), &vals(&[1.0]));
        assert_eq!(grouped.left.len(), 1);
        assert!(grouped.right.is_empty());
    }
}
