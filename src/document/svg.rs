//! Text extraction from inline vector graphics.
//!
//! Charts embedded as `<svg>` keep their axis labels and data values as
//! text nodes. Each block is collapsed into a single `[SVG_EXTRACT]:` line
//! before the document is split into lines; icons and text-less drawings
//! are removed.

use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use tracing::debug;

use crate::config::DocumentConfig;
use crate::utils::{char_len, normalize_ws, truncate_for_log};

/// Prefix of a line holding extracted SVG text.
pub const SVG_MARKER: &str = "[SVG_EXTRACT]:";
/// Prefix used by the image-description collaborator for SVG images.
pub const SVG_MARKER_ALT: &str = "[SVG TEXT EXTRACTION]:";

static RE_SVG_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<svg\b[^>]*>.*?</svg>").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Whether a line is already extracted chart text.
pub fn is_chart_data_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with(SVG_MARKER) || line.starts_with(SVG_MARKER_ALT)
}

/// Text and declared size of one SVG block.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgText {
    /// Whitespace-normalised text nodes joined by spaces.
    pub text: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Decides which SVG blocks carry chart data.
#[derive(Debug, Clone)]
pub struct SvgExtractor {
    min_text_chars: usize,
    min_dimension: u32,
}

impl SvgExtractor {
    pub fn from_config(config: &DocumentConfig) -> Self {
        Self {
            min_text_chars: config.min_svg_text_chars,
            min_dimension: config.min_svg_dimension,
        }
    }

    /// Replace every `<svg>…</svg>` block with its `[SVG_EXTRACT]:` line, or
    /// with nothing when the block is an icon or has too little text.
    pub fn inline_blocks(&self, raw: &str) -> String {
        RE_SVG_BLOCK
            .replace_all(raw, |caps: &regex::Captures<'_>| match self.chart_line(&caps[0]) {
                Some(line) => format!("\n{line}\n"),
                None => String::new(),
            })
            .into_owned()
    }

    /// The `[SVG_EXTRACT]:` line for one block, if it is chart data.
    pub fn chart_line(&self, svg: &str) -> Option<String> {
        if !svg.contains("viewBox") && svg.len() < 100 {
            return None;
        }
        let extracted = extract_svg_text(svg);
        if let (Some(w), Some(h)) = (extracted.width, extracted.height) {
            if w > 0 && h > 0 && (w < self.min_dimension || h < self.min_dimension) {
                debug!(width = w, height = h, "Skipping icon-sized SVG");
                return None;
            }
        }
        if char_len(&extracted.text) < self.min_text_chars {
            debug!(chars = char_len(&extracted.text), "Skipping SVG with little text");
            return None;
        }
        debug!(preview = %truncate_for_log(&extracted.text, 50), "Found SVG chart data");
        Some(format!("{SVG_MARKER} {}", extracted.text))
    }
}

/// Pull text nodes and the declared size out of an SVG block.
///
/// Well-formed markup is walked with an XML reader; anything it rejects
/// falls back to stripping tags.
pub fn extract_svg_text(svg: &str) -> SvgText {
    read_xml(svg).unwrap_or_else(|| SvgText {
        text: normalize_ws(&RE_TAG.replace_all(svg, " ")),
        width: None,
        height: None,
    })
}

fn read_xml(svg: &str) -> Option<SvgText> {
    let mut reader = Reader::from_str(svg);
    reader.config_mut().trim_text(true);

    let mut texts: Vec<String> = Vec::new();
    let mut size: Option<(Option<u32>, Option<u32>)> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if size.is_none() && e.local_name().as_ref() == b"svg" {
                    size = Some(declared_size(&e));
                }
            }
            Ok(Event::Text(t)) => push_text(&mut texts, &String::from_utf8_lossy(&t)),
            Ok(Event::CData(t)) => push_text(&mut texts, &String::from_utf8_lossy(&t)),
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!(error = %e, "SVG is not well-formed XML; stripping tags instead");
                return None;
            }
            _ => {}
        }
    }

    let (width, height) = size.unwrap_or((None, None));
    Some(SvgText {
        text: normalize_ws(&texts.join(" ")),
        width,
        height,
    })
}

fn push_text(texts: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        texts.push(text.to_string());
    }
}

fn declared_size(start: &BytesStart<'_>) -> (Option<u32>, Option<u32>) {
    let mut width = None;
    let mut height = None;
    for attr in start.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"width" => width = first_int(&value),
            b"height" => height = first_int(&value),
            _ => {}
        }
    }
    (width, height)
}

fn first_int(value: &str) -> Option<u32> {
    RE_DIGITS.find(value).and_then(|m| m.as_str().parse().ok())
}
