//! Split chart labels into stock codes and signed values.

use regex::Regex;
use tracing::debug;

use crate::config::ChartConfig;
use crate::error::{DigestError, Result};
use crate::models::{CodeToken, LabelItem, ValueToken};

/// Labels of one chart, split by kind. All lists keep draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedLabels {
    pub codes: Vec<CodeToken>,
    /// Values `>= 0`.
    pub positives: Vec<ValueToken>,
    /// Values `< 0`.
    pub negatives: Vec<ValueToken>,
    /// Every value regardless of sign, for ranked charts.
    pub values: Vec<ValueToken>,
}

/// Recognises code tokens by a full-match pattern and value tokens by parsing.
#[derive(Debug, Clone)]
pub struct TokenClassifier {
    code: Regex,
}

impl TokenClassifier {
    /// The pattern must match the whole label; anchors are added if missing.
    pub fn new(code_pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{code_pattern})$");
        let code = Regex::new(&anchored).map_err(|source| DigestError::Pattern {
            pattern: code_pattern.to_string(),
            source,
        })?;
        Ok(Self { code })
    }

    pub fn from_config(config: &ChartConfig) -> Result<Self> {
        Self::new(&config.code_pattern)
    }

    pub fn is_code(&self, text: &str) -> bool {
        self.code.is_match(text)
    }

    /// Classify visible, deduplicated labels. Labels that are neither a code
    /// nor a number (axis titles, punctuation) are dropped.
    pub fn classify(&self, labels: &[LabelItem]) -> ClassifiedLabels {
        let mut out = ClassifiedLabels::default();
        let mut dropped = 0usize;

        for label in labels {
            if self.is_code(&label.text) {
                out.codes.push(CodeToken {
                    text: label.text.clone(),
                    x: label.x,
                    y: label.y,
                });
            } else if let Some(value) = parse_value(&label.text) {
                let token = ValueToken {
                    text: label.text.clone(),
                    value,
                };
                if token.is_negative() {
                    out.negatives.push(token.clone());
                } else {
                    out.positives.push(token.clone());
                }
                out.values.push(token);
            } else {
                dropped += 1;
            }
        }

        debug!(
            codes = out.codes.len(),
            positives = out.positives.len(),
            negatives = out.negatives.len(),
            dropped,
            "Classified labels"
        );
        out
    }
}

/// Parse a label as a decimal number, ignoring thousands separators.
///
/// The typographic minus (U+2212) some renderers emit is read as `-`.
/// Non-finite results (`inf`, `NaN`) are rejected.
pub fn parse_value(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "").replace('\u{2212}', "-");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
