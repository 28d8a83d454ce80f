//! Markdown line classification and content-region slicing.
//!
//! A crawled page arrives as markdown with inline HTML. Extraction runs in
//! three passes:
//!
//! 1. inline `<svg>` blocks are collapsed to `[SVG_EXTRACT]:` lines
//! 2. every line is tagged `TEXT`, `IMAGE`, `CHART_DATA` or `SKIP`
//! 3. the main-content region is located and lines outside it become `SKIP`

pub mod noise;
pub mod region;
pub mod svg;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::config::DocumentConfig;
use crate::error::Result;
use crate::models::{ClassifiedDocument, ContentRegion, DocumentLine, LineTag};
use crate::utils::char_len;
use noise::NoiseFilter;
use region::{RegionCandidate, RegionRules};
use svg::{SvgExtractor, is_chart_data_line};

static RE_MD_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\(\s*<?([^)\s>]+)").unwrap());
static RE_HTML_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)]*)\)").unwrap());

/// Classifies crawled markdown and slices out its main content.
#[derive(Debug, Clone)]
pub struct DocumentRegionExtractor {
    min_text_chars: usize,
    noise: NoiseFilter,
    region: RegionRules,
    svg: SvgExtractor,
}

impl DocumentRegionExtractor {
    pub fn new(config: &DocumentConfig) -> Result<Self> {
        Ok(Self {
            min_text_chars: config.min_text_chars,
            noise: NoiseFilter::from_config(config)?,
            region: RegionRules::from_config(config)?,
            svg: SvgExtractor::from_config(config),
        })
    }

    /// Tag one line and produce its cleaned content.
    ///
    /// Skipped lines get empty content. Feeding the content of a kept line
    /// back in yields the same tag and content.
    pub fn classify_line(&self, line: &str) -> (LineTag, String) {
        let trimmed = line.trim();
        if trimmed.is_empty() || self.noise.is_noise(trimmed) {
            return (LineTag::Skip, String::new());
        }

        if let Some(url) = image_url(trimmed) {
            if self.noise.image_is_noise(url) {
                debug!(url, "Skipping icon/ad image");
                return (LineTag::Skip, String::new());
            }
            return (LineTag::Image, trimmed.to_string());
        }

        let cleaned = strip_links(trimmed);
        if cleaned.is_empty() || self.noise.is_noise(&cleaned) {
            return (LineTag::Skip, String::new());
        }
        if is_chart_data_line(&cleaned) {
            return (LineTag::ChartData, cleaned);
        }
        if cleaned.starts_with('|') || char_len(&cleaned) >= self.min_text_chars {
            return (LineTag::Text, cleaned);
        }
        (LineTag::Skip, String::new())
    }

    /// Classify every line of `text` without region slicing.
    pub fn classify_lines(&self, text: &str) -> Vec<DocumentLine> {
        text.lines()
            .enumerate()
            .map(|(index, raw)| {
                let (tag, content) = self.classify_line(raw);
                DocumentLine {
                    index,
                    raw: raw.to_string(),
                    content,
                    tag,
                }
            })
            .collect()
    }

    /// Locate the main-content region over classified lines.
    ///
    /// The flag is false when the region would have been too small and the
    /// whole document was kept instead.
    pub fn locate_region(&self, lines: &[DocumentLine]) -> (ContentRegion, bool) {
        let candidates: Vec<RegionCandidate<'_>> = lines
            .iter()
            .map(|l| RegionCandidate {
                raw: &l.raw,
                raw_chars: char_len(l.raw.trim()),
                kept: l.tag != LineTag::Skip,
            })
            .collect();
        self.region.locate(&candidates)
    }

    /// Full extraction of one raw document.
    #[instrument(level = "info", skip_all, fields(bytes = raw.len()))]
    pub fn extract(&self, raw: &str) -> ClassifiedDocument {
        let normalized = self.svg.inline_blocks(raw);
        let mut lines = self.classify_lines(&normalized);
        let (region, trimmed) = self.locate_region(&lines);

        for line in lines.iter_mut().filter(|l| !region.contains(l.index)) {
            line.tag = LineTag::Skip;
            line.content.clear();
        }

        let doc = ClassifiedDocument {
            lines,
            region,
            trimmed,
        };
        debug!(
            total = doc.lines.len(),
            start = region.start,
            end = region.end,
            text = doc.lines_tagged(LineTag::Text).count(),
            images = doc.lines_tagged(LineTag::Image).count(),
            charts = doc.lines_tagged(LineTag::ChartData).count(),
            "Document classified"
        );
        doc
    }
}

/// First image URL referenced on a line, markdown or HTML.
pub fn image_url(line: &str) -> Option<&str> {
    RE_MD_IMAGE
        .captures(line)
        .or_else(|| RE_HTML_IMAGE.captures(line))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Reduce markdown links to their text. Image references are left alone.
pub fn strip_links(line: &str) -> String {
    let mut current = line.trim().to_string();
    loop {
        let next = RE_LINK
            .replace_all(&current, |caps: &regex::Captures<'_>| {
                if &caps[1] == "!" {
                    caps[0].to_string()
                } else {
                    caps[2].to_string()
                }
            })
            .trim()
            .to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}
