//! Noise signatures for crawled markdown.
//!
//! Navigation menus, account widgets, ad pixels and footer boilerplate show
//! up as whole lines in the dumps. Each signature here marks such a line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::config::DocumentConfig;
use crate::error::{DigestError, Result};
use crate::utils::char_len;

/// A line that is only a link, optionally as a list item or table cell.
static RE_LINK_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(- )?\[.*?\]\(http.*?\)\s*(\|)?\s*$").unwrap());

/// Compiled noise signatures.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    patterns: Vec<Regex>,
    menu_headers: HashSet<String>,
    link_only_max_chars: usize,
    icon_url_markers: Vec<String>,
    ad_url_markers: Vec<String>,
    chart_url_hints: Vec<String>,
}

impl NoiseFilter {
    pub fn from_config(config: &DocumentConfig) -> Result<Self> {
        Ok(Self {
            patterns: compile_all(&config.noise_patterns)?,
            menu_headers: config.menu_headers.iter().map(|h| h.trim().to_string()).collect(),
            link_only_max_chars: config.link_only_max_chars,
            icon_url_markers: lowercase_all(&config.icon_url_markers),
            ad_url_markers: lowercase_all(&config.ad_url_markers),
            chart_url_hints: lowercase_all(&config.chart_url_hints),
        })
    }

    /// Whether a whole line is navigation/ad/footer noise.
    pub fn is_noise(&self, line: &str) -> bool {
        if self.patterns.iter().any(|re| re.is_match(line)) {
            return true;
        }
        if self.menu_headers.contains(line.trim()) {
            return true;
        }
        RE_LINK_ONLY.is_match(line) && char_len(line) < self.link_only_max_chars
    }

    /// Whether an image URL is an icon or an ad/tracker rather than content.
    ///
    /// Chart-looking URLs are never treated as icons.
    pub fn image_is_noise(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        if self.ad_url_markers.iter().any(|m| lower.contains(m.as_str())) {
            return true;
        }
        let is_chart = self.chart_url_hints.iter().any(|h| lower.contains(h.as_str()));
        !is_chart && self.icon_url_markers.iter().any(|m| lower.contains(m.as_str()))
    }
}

pub(crate) fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| DigestError::Pattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}
