//! Label collection from a rendered scene.
//!
//! The browser that renders the page is an external collaborator; what
//! reaches this module is either a JSON dump of positioned labels per
//! container, or the rendered HTML/SVG markup of the page. Both are exposed
//! through [`SceneLabelQuery`].

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector, node::Element};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::LabelItem;
use crate::utils::normalize_ws;

/// Class Highcharts puts on the stroked outline copy of a label's text.
const TEXT_OUTLINE_CLASS: &str = "highcharts-text-outline";

static RE_TRANSLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"translate\(\s*(-?[\d.]+(?:[eE]-?\d+)?)(?:[\s,]+(-?[\d.]+(?:[eE]-?\d+)?))?\s*\)").unwrap()
});
static RE_STYLE_LEFT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|;)\s*left\s*:\s*(-?[\d.]+)px").unwrap());
static RE_STYLE_TOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|;)\s*top\s*:\s*(-?[\d.]+)px").unwrap());
static RE_STYLE_HIDDEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)visibility\s*:\s*hidden|opacity\s*:\s*0(?:\.0*)?\s*(?:;|$)").unwrap()
});
static RE_LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(-?[\d.]+)").unwrap());

/// Source of positioned labels for a chart container.
pub trait SceneLabelQuery {
    /// Every label inside `container_id`, in draw order.
    ///
    /// An absent container yields an empty list. `label_selector` narrows
    /// which elements count as labels where the scene has markup.
    fn query_labels(&self, container_id: &str, label_selector: &str) -> Vec<LabelItem>;
}

/// Labels already extracted by the renderer, keyed by container id.
///
/// ```json
/// { "containers": { "top-influence-1": [ { "text": "HDB", "x": 10, "y": 4, "visible": true } ] } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonScene {
    pub containers: HashMap<String, Vec<LabelItem>>,
}

impl JsonScene {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl SceneLabelQuery for JsonScene {
    fn query_labels(&self, container_id: &str, _label_selector: &str) -> Vec<LabelItem> {
        match self.containers.get(container_id) {
            Some(labels) => labels
                .iter()
                .map(|l| LabelItem {
                    text: l.text.trim().to_string(),
                    ..l.clone()
                })
                .collect(),
            None => {
                debug!(container_id, "Container absent from label dump");
                Vec::new()
            }
        }
    }
}

/// Rendered page markup (HTML with inline SVG).
///
/// A label's position is its own `x`/`y` attributes plus every
/// `translate(..)` transform and CSS `left`/`top` offset on the way up to
/// the container. It is hidden when it or one of those ancestors is.
pub struct HtmlScene {
    document: Html,
}

impl HtmlScene {
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
        }
    }
}

impl SceneLabelQuery for HtmlScene {
    fn query_labels(&self, container_id: &str, label_selector: &str) -> Vec<LabelItem> {
        let id_selector = format!("[id=\"{}\"]", container_id.replace('"', "\\\""));
        let Ok(container_sel) = Selector::parse(&id_selector) else {
            warn!(container_id, "Unusable container id");
            return Vec::new();
        };
        let Ok(label_sel) = Selector::parse(label_selector) else {
            warn!(label_selector, "Invalid label selector");
            return Vec::new();
        };
        let Some(container) = self.document.select(&container_sel).next() else {
            debug!(container_id, "Container absent from scene");
            return Vec::new();
        };

        container
            .select(&label_sel)
            .map(|el| label_from_element(container, el))
            .collect()
    }
}

/// Pick the scene flavour from the payload: JSON dumps start with `{`.
pub fn scene_from_str(raw: &str) -> Result<Box<dyn SceneLabelQuery>> {
    if raw.trim_start().starts_with('{') {
        Ok(Box::new(JsonScene::from_json(raw)?))
    } else {
        Ok(Box::new(HtmlScene::parse(raw)))
    }
}

/// Query a container and log when it comes back empty.
pub fn collect_labels(
    scene: &dyn SceneLabelQuery,
    container_id: &str,
    label_selector: &str,
) -> Vec<LabelItem> {
    let labels = scene.query_labels(container_id, label_selector);
    if labels.is_empty() {
        warn!(container_id, "No labels collected; treating as no data");
    } else {
        debug!(container_id, count = labels.len(), "Collected labels");
    }
    labels
}

fn label_from_element(container: ElementRef<'_>, el: ElementRef<'_>) -> LabelItem {
    let container_id = (*container).id();
    let chain = std::iter::once(el).chain(
        (*el)
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|a| (**a).id() != container_id),
    );

    let (mut x, mut y, mut visible) = (0.0, 0.0, true);
    for node in chain {
        let (dx, dy) = offset_of(node.value());
        x += dx;
        y += dy;
        if is_hidden(node.value()) {
            visible = false;
        }
    }

    LabelItem {
        text: label_text(el),
        x,
        y,
        visible,
    }
}

/// Text of a label, leaving out outline copies drawn inside it.
fn label_text(el: ElementRef<'_>) -> String {
    let root = (*el).id();
    let mut out = String::new();
    for node in (*el).descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_outline = node
            .ancestors()
            .take_while(|a| a.id() != root)
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().classes().any(|c| c == TEXT_OUTLINE_CLASS));
        if !in_outline {
            out.push_str(text);
            out.push(' ');
        }
    }
    normalize_ws(&out)
}

fn offset_of(element: &Element) -> (f64, f64) {
    let mut dx = leading_number(element.attr("x")).unwrap_or(0.0);
    let mut dy = leading_number(element.attr("y")).unwrap_or(0.0);

    if let Some(caps) = element.attr("transform").and_then(|t| RE_TRANSLATE.captures(t)) {
        dx += caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0);
        dy += caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0);
    }
    if let Some(style) = element.attr("style") {
        dx += style_px(&RE_STYLE_LEFT, style);
        dy += style_px(&RE_STYLE_TOP, style);
    }
    (dx, dy)
}

fn is_hidden(element: &Element) -> bool {
    if element.attr("visibility") == Some("hidden") {
        return true;
    }
    if leading_number(element.attr("opacity")) == Some(0.0) {
        return true;
    }
    element
        .attr("style")
        .is_some_and(|s| RE_STYLE_HIDDEN.is_match(s))
}

fn leading_number(value: Option<&str>) -> Option<f64> {
    RE_LEADING_NUMBER
        .captures(value?)
        .and_then(|c| c[1].parse().ok())
}

fn style_px(re: &Regex, style: &str) -> f64 {
    re.captures(style)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SVG_SCENE: &str = r#"<html><body>
<div id="foreign-sell">
  <svg width="400" height="200">
    <g class="highcharts-data-labels" transform="translate(100,20)">
      <text x="5" y="10"><tspan class="highcharts-text-outline">HDB</tspan><tspan>HDB</tspan></text>
      <text x="5" y="40" style="visibility: hidden">LPB</text>
      <text x="60" y="10" opacity="0">-1.20</text>
    </g>
    <text x="300" y="190">Tỷ đồng</text>
  </svg>
</div>
<div id="other"><svg><text x="1" y="1">VPL</text></svg></div>
</body></html>"#;

    const HTML_LABELS: &str = r#"<div id="top-influence-1">
  <div class="highcharts-data-labels">
    <div class="highcharts-label" style="position: absolute; left: 120px; top: 40px;">
      <span style="position: absolute; left: 0px; top: 0px;">HDB</span>
    </div>
    <div class="highcharts-label" style="position: absolute; left: 410px; top: 40px; visibility: hidden;">
      <span>STB</span>
    </div>
  </div>
</div>"#;

    #[test]
    fn test_svg_text_positions_accumulate_transforms() {
        let scene = HtmlScene::parse(SVG_SCENE);
        let labels = scene.query_labels("foreign-sell", "text");
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], LabelItem::new("HDB", 105.0, 30.0));
        assert_eq!(labels[3], LabelItem::new("Tỷ đồng", 300.0, 190.0));
    }

    #[test]
    fn test_svg_hidden_labels_are_flagged() {
        let scene = HtmlScene::parse(SVG_SCENE);
        let labels = scene.query_labels("foreign-sell", "text");
        assert!(!labels[1].visible);
        assert!(!labels[2].visible);
        assert_eq!(labels[2].text, "-1.20");
    }

    #[test]
    fn test_labels_stay_inside_container() {
        let scene = HtmlScene::parse(SVG_SCENE);
        let labels = scene.query_labels("other", "text");
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "VPL");
    }

    #[test]
    fn test_html_data_labels_use_css_offsets() {
        let scene = HtmlScene::parse(HTML_LABELS);
        let labels = scene.query_labels("top-influence-1", ".highcharts-data-labels span");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0], LabelItem::new("HDB", 120.0, 40.0));
        assert_eq!(labels[1].x, 410.0);
        assert!(!labels[1].visible);
    }

    #[test]
    fn test_missing_container_is_empty() {
        let scene = HtmlScene::parse(SVG_SCENE);
        assert!(scene.query_labels("top-influence-9", "text").is_empty());
        assert!(collect_labels(&scene, "top-influence-9", "text").is_empty());
    }

    #[test]
    fn test_invalid_selector_is_empty() {
        let scene = HtmlScene::parse(SVG_SCENE);
        assert!(scene.query_labels("foreign-sell", "[[").is_empty());
    }

    #[test]
    fn test_json_scene() {
        let raw = r#"{"containers":{"c1":[{"text":" HDB ","x":1.0,"y":2.0},{"text":"5.00","x":9.0,"y":2.0,"visible":false}]}}"#;
        let scene = scene_from_str(raw).unwrap();
        let labels = scene.query_labels("c1", "ignored");
        assert_eq!(labels[0], LabelItem::new("HDB", 1.0, 2.0));
        assert!(!labels[1].visible);
        assert!(scene.query_labels("c2", "text").is_empty());
    }

    #[test]
    fn test_malformed_json_scene_is_error() {
        assert!(scene_from_str("{ not json").is_err());
    }
}
