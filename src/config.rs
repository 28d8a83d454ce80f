//! Engine configuration.
//!
//! All heuristic thresholds and pattern lists live here with their defaults,
//! so the pipelines can be tuned per site without code changes. A YAML file
//! may override any subset of fields:
//!
//! ```yaml
//! chart:
//!   shadow_distance_px: 4.0
//! document:
//!   content_line_chars: 60
//! charts:
//!   - id: foreign
//!     title: Foreign Investors
//!     left_label: Top Net Sell
//!     right_label: Top Net Buy
//!     source:
//!       kind: split_containers
//!       left: foreign-sell
//!       right: foreign-buy
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

use crate::error::{DigestError, Result};

/// Top-level configuration for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chart: ChartConfig,
    pub document: DocumentConfig,
    /// Chart jobs run against the rendered scene.
    pub charts: Vec<ChartSpec>,
}

impl EngineConfig {
    /// Check that every chart job's label selector parses.
    pub fn validate(&self) -> Result<()> {
        for spec in &self.charts {
            let selector = spec.source.label_selector();
            if scraper::Selector::parse(selector).is_err() {
                return Err(DigestError::Selector(selector.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chart: ChartConfig::default(),
            document: DocumentConfig::default(),
            charts: default_chart_specs(),
        }
    }
}

/// Thresholds for the chart-label pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Same-text labels closer than this (pixels) are shadows.
    pub shadow_distance_px: f64,
    /// Full-match pattern for stock codes.
    pub code_pattern: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            shadow_distance_px: 5.0,
            code_pattern: r"^[A-Z]{3}$".to_string(),
        }
    }
}

/// Thresholds and signatures for the document pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// A line longer than this (chars) marks the main content boundary.
    pub content_line_chars: usize,
    /// Minimum share of lines the region must keep, else slicing is abandoned.
    pub region_min_ratio: f64,
    /// Shorter cleaned lines are not TEXT.
    pub min_text_chars: usize,
    /// Link-only lines shorter than this are menu noise.
    pub link_only_max_chars: usize,
    /// SVGs with less extracted text than this are dropped.
    pub min_svg_text_chars: usize,
    /// SVGs declaring a width or height below this are icons.
    pub min_svg_dimension: u32,
    /// Case-insensitive phrases that push the region end above them.
    pub footer_keywords: Vec<String>,
    /// Lines matching any of these cut off everything from there on.
    pub footer_markers: Vec<String>,
    /// Regexes marking a whole line as noise.
    pub noise_patterns: Vec<String>,
    /// Exact (trimmed) menu-header lines.
    pub menu_headers: Vec<String>,
    /// URL fragments of icon images.
    pub icon_url_markers: Vec<String>,
    /// URL fragments of ads and trackers.
    pub ad_url_markers: Vec<String>,
    /// URL fragments that override the icon markers for chart images.
    pub chart_url_hints: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            content_line_chars: 80,
            region_min_ratio: 0.1,
            min_text_chars: 20,
            link_only_max_chars: 200,
            min_svg_text_chars: 20,
            min_svg_dimension: 100,
            footer_keywords: strings(&["bản quyền", "copyright", "liên hệ"]),
            footer_markers: strings(&[
                r"^#### Tính năng \(-\)",
                r"^#### Ngành \(-\)",
                r"^#### Tin tức \(-\)",
                r"^#### Mã chứng khoán \(-\)",
                r"^Tất cảGiờ qua24 giờ qua",
            ]),
            noise_patterns: strings(&[
                r"!\[iconGift\]",
                r"!\[menubar\]",
                r"!\[thong-bao\]",
                r"!\[nang-cap-tai-khoan\]",
                r"!\[search\]",
                r"!\[user\]",
                r"!\[[^\]]*\]\([^)]*icon[^)]*\.svg\)",
                r"!\[close\]",
                r"!\[iconArrow\]",
                r"!\[searchBlack\]",
                r"Bản quyền thuộc về",
                r"Chat Bot AI",
                r"^\s*-\s*\d{2}:\d{2}",
                r"^Tin mới nhất$",
                r"^Cập nhật$",
                r"^Đăng nhập$",
            ]),
            menu_headers: strings(&[
                "VĨ MÔ",
                "NGÀNH",
                "DOANH NGHIỆP",
                "CỔ PHIẾU",
                "PHÁI SINH",
                "TRÁI PHIẾU",
                "CÔNG CỤ ĐẦU TƯ",
                "XUẤT DỮ LIỆU",
                "TIN MỚI",
                "Tổng hợp doanh nghiệp",
                "Báo cáo tài chính",
                "Báo cáo tài chính ngành",
            ]),
            icon_url_markers: strings(&["icon", "logo", "menu", "btn"]),
            ad_url_markers: strings(&["delivery/lg.php", "facebook", ".gif"]),
            chart_url_hints: strings(&["trend", "chart", "kpi"]),
        }
    }
}

/// One chart to extract from the rendered scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Stable identifier used in reports.
    pub id: String,
    pub title: String,
    /// Heading for the left (negative / net sell) side.
    pub left_label: String,
    /// Heading for the right (positive / net buy) side.
    pub right_label: String,
    pub source: ChartSource,
}

/// Where a chart's labels live and how they are laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSource {
    /// One container, losers drawn left of gainers.
    Diverging {
        container: String,
        #[serde(default = "default_label_selector")]
        label_selector: String,
    },
    /// Two ranked containers, each pairing its codes with its values in order.
    SplitContainers {
        left: String,
        right: String,
        #[serde(default = "default_label_selector")]
        label_selector: String,
    },
}

impl ChartSource {
    pub fn label_selector(&self) -> &str {
        match self {
            ChartSource::Diverging { label_selector, .. }
            | ChartSource::SplitContainers { label_selector, .. } => label_selector,
        }
    }
}

fn default_label_selector() -> String {
    "text".to_string()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_chart_specs() -> Vec<ChartSpec> {
    [
        ("top-influence-1", "VN-INDEX"),
        ("top-influence-4", "VN30-INDEX"),
        ("top-influence-2", "HNX-INDEX"),
    ]
    .into_iter()
    .map(|(container, title)| ChartSpec {
        id: container.to_string(),
        title: title.to_string(),
        left_label: "Top Losers".to_string(),
        right_label: "Top Gainers".to_string(),
        source: ChartSource::Diverging {
            container: container.to_string(),
            label_selector: ".highcharts-data-labels span".to_string(),
        },
    })
    .collect()
}

/// Parse a YAML configuration string; missing fields take their defaults.
pub fn parse_config(yaml: &str) -> Result<EngineConfig> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load configuration from `path`, or the defaults when `path` is `None`.
#[instrument(level = "info", skip_all)]
pub async fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(EngineConfig::default());
    };
    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DigestError::io(path.display().to_string(), e))?;
    let config = parse_config(&yaml)?;
    config.validate()?;
    info!(path = %path.display(), charts = config.charts.len(), "Loaded configuration");
    Ok(config)
}
