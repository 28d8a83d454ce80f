//! Main-content region detection.
//!
//! The body of a crawled page sits between a header of short navigation
//! lines and a footer of short boilerplate. The region starts at the first
//! substantive line and ends after the last substantive line above the
//! footer, capped at the first hard footer marker.

use regex::Regex;
use tracing::{debug, warn};

use super::noise::compile_all;
use super::svg::is_chart_data_line;
use crate::config::DocumentConfig;
use crate::error::Result;
use crate::models::ContentRegion;

/// What the region scan needs to know about one line.
#[derive(Debug, Clone, Copy)]
pub struct RegionCandidate<'a> {
    pub raw: &'a str,
    /// Length in chars of the trimmed raw line.
    pub raw_chars: usize,
    /// Whether the line survived classification. Only consulted for media
    /// lines, so skipped icons and ads never open the region.
    pub kept: bool,
}

/// Boundary rules for the region scan.
#[derive(Debug, Clone)]
pub struct RegionRules {
    content_line_chars: usize,
    min_ratio: f64,
    footer_keywords: Vec<String>,
    footer_markers: Vec<Regex>,
}

impl RegionRules {
    pub fn from_config(config: &DocumentConfig) -> Result<Self> {
        Ok(Self {
            content_line_chars: config.content_line_chars,
            min_ratio: config.region_min_ratio,
            footer_keywords: config.footer_keywords.iter().map(|k| k.to_lowercase()).collect(),
            footer_markers: compile_all(&config.footer_markers)?,
        })
    }

    /// Locate `[start, end)` over `lines`.
    ///
    /// Returns the region and whether slicing was applied. When the sliced
    /// region would keep fewer than `min_ratio` of the lines, the whole
    /// document is returned instead.
    pub fn locate(&self, lines: &[RegionCandidate<'_>]) -> (ContentRegion, bool) {
        let total = lines.len();
        if total == 0 {
            return (ContentRegion::whole(0), false);
        }

        let start = lines.iter().position(|c| self.is_substantive(c)).unwrap_or(0);

        let mut end = total;
        for i in (start + 1..total).rev() {
            if self.is_footer_line(lines[i].raw) {
                end = i;
                continue;
            }
            if self.is_substantive(&lines[i]) {
                end = i + 1;
                break;
            }
        }

        if let Some(cut) = lines[start..]
            .iter()
            .position(|c| self.footer_markers.iter().any(|re| re.is_match(c.raw.trim())))
        {
            end = end.min(start + cut);
        }

        let kept = end.saturating_sub(start);
        if (kept as f64) < total as f64 * self.min_ratio {
            warn!(start, end, total, "Content region too small; keeping whole document");
            return (ContentRegion::whole(total), false);
        }
        debug!(start, end, total, "Content region located");
        (ContentRegion { start, end }, true)
    }

    /// A raw line long enough to be body text that is not a bare link, or a
    /// kept media line.
    fn is_substantive(&self, line: &RegionCandidate<'_>) -> bool {
        let raw = line.raw.trim();
        (line.raw_chars > self.content_line_chars && !is_bare_link(raw)) || (line.kept && is_media(raw))
    }

    fn is_footer_line(&self, raw: &str) -> bool {
        let lower = raw.to_lowercase();
        self.footer_keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

/// `[text](url)` and nothing else.
fn is_bare_link(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(')') && line.contains("](")
}

fn is_media(line: &str) -> bool {
    line.contains("![")
        || line.contains("<img")
        || line.contains("<svg")
        || line.starts_with('|')
        || is_chart_data_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RegionRules {
        RegionRules::from_config(&DocumentConfig::default()).unwrap()
    }

    fn candidates(lines: &[String]) -> Vec<RegionCandidate<'_>> {
        lines
            .iter()
            .map(|l| RegionCandidate {
                raw: l,
                raw_chars: l.trim().chars().count(),
                kept: l.trim().chars().count() >= 20,
            })
            .collect()
    }

    #[test]
    fn test_region_skips_header_and_footer() {
        let mut lines: Vec<String> = (0..5).map(|i| format!("menu {i}")).collect();
        lines.extend((0..10).map(|i| format!("{i} {}", "nội dung bài viết ".repeat(6))));
        lines.push("Bản quyền thuộc về công ty".to_string());
        lines.push("Liên hệ".to_string());
        let (region, trimmed) = rules().locate(&candidates(&lines));
        assert!(trimmed);
        assert_eq!(region, ContentRegion { start: 5, end: 15 });
    }

    #[test]
    fn test_media_line_starts_region() {
        let lines = vec![
            "menu".to_string(),
            "![chart](https://example.com/trend.png)".to_string(),
            "x".repeat(120),
        ];
        let (region, _) = rules().locate(&candidates(&lines));
        assert_eq!(region.start, 1);
        assert_eq!(region.end, 3);
    }

    #[test]
    fn test_bare_link_is_not_substantive() {
        let link = format!("[{}](https://example.com/a)", "x".repeat(100));
        let lines = vec![link, "y".repeat(100)];
        let (region, _) = rules().locate(&candidates(&lines));
        assert_eq!(region.start, 1);
    }

    #[test]
    fn test_long_raw_line_counts_even_when_cleaned_short() {
        let mut lines: Vec<String> = (0..3).map(|i| format!("menu {i}")).collect();
        lines.push(format!("Theo [Vietstock]({}) VCB tăng", "https://vietstock.vn/".repeat(4)));
        lines.extend((0..4).map(|_| "v".repeat(100)));
        let mut cands = candidates(&lines);
        cands[3].kept = false;
        let (region, trimmed) = rules().locate(&cands);
        assert!(trimmed);
        assert_eq!(region, ContentRegion { start: 3, end: 8 });
    }

    #[test]
    fn test_skipped_icon_does_not_start_region() {
        let lines = vec![
            "![logo](https://example.com/logo.png)".to_string(),
            "menu".to_string(),
            "x".repeat(120),
        ];
        let mut cands = candidates(&lines);
        cands[0].kept = false;
        let (region, _) = rules().locate(&cands);
        assert_eq!(region.start, 2);
    }

    #[test]
    fn test_guillotine_marker_caps_end() {
        let mut lines: Vec<String> = (0..10).map(|_| "z".repeat(100)).collect();
        lines.insert(6, "#### Tin tức (-)".to_string());
        let (region, trimmed) = rules().locate(&candidates(&lines));
        assert!(trimmed);
        assert_eq!(region.end, 6);
    }

    #[test]
    fn test_no_substantive_line_keeps_from_top() {
        let lines: Vec<String> = (0..4).map(|i| format!("ngắn {i}")).collect();
        let (region, _) = rules().locate(&candidates(&lines));
        assert_eq!(region.start, 0);
    }

    #[test]
    fn test_tiny_region_abandons_slicing() {
        let mut lines: Vec<String> = (0..50).map(|i| format!("menu {i}")).collect();
        lines.push("w".repeat(100));
        lines.push("Copyright 2025".to_string());
        lines.extend((0..50).map(|i| format!("footer {i}")));
        let (region, trimmed) = rules().locate(&candidates(&lines));
        assert!(!trimmed);
        assert_eq!(region, ContentRegion::whole(102));
    }

    #[test]
    fn test_empty_document() {
        let (region, trimmed) = rules().locate(&[]);
        assert_eq!(region, ContentRegion::whole(0));
        assert!(!trimmed);
    }
}
