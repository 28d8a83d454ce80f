//! Markdown rendering of a run.
//!
//! Chart reports become side-by-side tables with the right side (gainers,
//! net buy) first; sources without data get a visible marker instead of a
//! table. Documents list their kept lines as `TAG - content`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::error::{DigestError, Result};
use crate::models::{ChartReport, Digest, DocumentReport, GroupedResult, PairedRecord, SourceOutcome};

const NO_DATA: &str = "*No data found.*";
const EXTRACTION_FAILED: &str = "*Could not extract data.*";

/// Render the whole digest.
pub fn digest_to_markdown(digest: &Digest) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Market Digest - {} {}\n", digest.local_date, digest.local_time);

    if !digest.charts.is_empty() {
        md.push_str("## Charts\n\n");
        for chart in &digest.charts {
            md.push_str(&chart_to_markdown(chart));
        }
    }

    if !digest.documents.is_empty() {
        md.push_str("## Documents\n\n");
        for doc in &digest.documents {
            md.push_str(&document_to_markdown(doc));
        }
    }

    md
}

/// One chart section: a table, or a marker when there is nothing to show.
pub fn chart_to_markdown(chart: &ChartReport) -> String {
    let mut md = format!("### {}\n\n", chart.title);
    match &chart.outcome {
        SourceOutcome::Success(grouped) if !grouped.is_empty() => {
            md.push_str(&side_by_side_table(grouped, &chart.right_label, &chart.left_label));
        }
        SourceOutcome::Success(_) | SourceOutcome::Empty(_) => {
            let _ = writeln!(md, "{NO_DATA}\n");
        }
        SourceOutcome::Failed(_) => {
            let _ = writeln!(md, "{EXTRACTION_FAILED}\n");
        }
    }
    md
}

fn side_by_side_table(grouped: &GroupedResult, right_label: &str, left_label: &str) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "| {right_label} | Points | {left_label} | Points |");
    md.push_str("| --- | --- | --- | --- |\n");

    let rows = grouped.left.len().max(grouped.right.len());
    for i in 0..rows {
        let (r_code, r_points) = cells(grouped.right.get(i));
        let (l_code, l_points) = cells(grouped.left.get(i));
        let _ = writeln!(md, "| {r_code} | {r_points} | {l_code} | {l_points} |");
    }
    md.push('\n');
    md
}

fn cells(record: Option<&PairedRecord>) -> (String, String) {
    match record {
        Some(r) => (r.code.clone(), format!("{:.2}", r.value)),
        None => (String::new(), String::new()),
    }
}

/// One document section: its kept lines, or a marker.
pub fn document_to_markdown(doc: &DocumentReport) -> String {
    let mut md = format!("### {}\n\n", doc.source);
    match &doc.outcome {
        SourceOutcome::Success(classified) => {
            for line in classified.kept() {
                let _ = writeln!(md, "{} - {}", line.tag, line.content);
            }
            md.push('\n');
        }
        SourceOutcome::Empty(_) => {
            let _ = writeln!(md, "{NO_DATA}\n");
        }
        SourceOutcome::Failed(_) => {
            let _ = writeln!(md, "{EXTRACTION_FAILED}\n");
        }
    }
    md
}

/// Write the rendered digest to `{markdown_output_dir}/{local_date}_{local_time}.md`.
#[instrument(level = "info", skip_all, fields(markdown_output_dir = %markdown_output_dir.display()))]
pub async fn write_markdown(digest: &Digest, markdown_output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(markdown_output_dir)
        .await
        .map_err(|e| DigestError::io(markdown_output_dir.display().to_string(), e))?;

    let path = markdown_output_dir.join(format!("{}_{}.md", digest.local_date, digest.local_time));
    fs::write(&path, digest_to_markdown(digest))
        .await
        .map_err(|e| DigestError::io(path.display().to_string(), e))?;
    info!(path = %path.display(), "Wrote Markdown digest");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassifiedDocument, ContentRegion, DocumentLine, LineTag};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn chart(outcome: SourceOutcome<GroupedResult>) -> ChartReport {
        ChartReport {
            id: "top-influence-1".to_string(),
            title: "VN-INDEX".to_string(),
            left_label: "Top Losers".to_string(),
            right_label: "Top Gainers".to_string(),
            outcome,
        }
    }

    #[test]
    fn test_side_by_side_table_pads_shorter_side() {
        let md = chart_to_markdown(&chart(SourceOutcome::Success(GroupedResult {
            left: vec![PairedRecord::new("HDB", -1.2)],
            right: vec![PairedRecord::new("LPB", 72.06), PairedRecord::new("STB", 3.456)],
        })));
        assert_eq!(
            md,
            "### VN-INDEX\n\n\
             | Top Gainers | Points | Top Losers | Points |\n\
             | --- | --- | --- | --- |\n\
             | LPB | 72.06 | HDB | -1.20 |\n\
             | STB | 3.46 |  |  |\n\n"
        );
    }

    #[test]
    fn test_markers_for_missing_data() {
        assert!(chart_to_markdown(&chart(SourceOutcome::Empty("none".to_string()))).contains(NO_DATA));
        assert!(
            chart_to_markdown(&chart(SourceOutcome::Failed("boom".to_string())))
                .contains(EXTRACTION_FAILED)
        );
        assert!(
            chart_to_markdown(&chart(SourceOutcome::Success(GroupedResult::default())))
                .contains(NO_DATA)
        );
    }

    #[test]
    fn test_document_lines_are_tagged() {
        let doc = DocumentReport {
            source: "a.md".to_string(),
            cleaned_text: "![c](https://x.vn/chart.png)".to_string(),
            outcome: SourceOutcome::Success(ClassifiedDocument {
                lines: vec![
                    DocumentLine {
                        index: 0,
                        raw: "Đăng nhập".to_string(),
                        content: String::new(),
                        tag: LineTag::Skip,
                    },
                    DocumentLine {
                        index: 1,
                        raw: "![c](https://x.vn/chart.png)".to_string(),
                        content: "![c](https://x.vn/chart.png)".to_string(),
                        tag: LineTag::Image,
                    },
                ],
                region: ContentRegion::whole(2),
                trimmed: true,
            }),
        };
        let md = document_to_markdown(&doc);
        assert_eq!(md, "### a.md\n\nIMAGE - ![c](https://x.vn/chart.png)\n\n");
    }

    #[tokio::test]
    async fn test_write_markdown_path() {
        let dir = tempdir().unwrap();
        let digest = Digest {
            local_date: "20250506".to_string(),
            local_time: "0915".to_string(),
            charts: vec![chart(SourceOutcome::Empty("none".to_string()))],
            documents: Vec::new(),
        };
        let path = write_markdown(&digest, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("20250506_0915.md"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("# Market Digest - 20250506 0915"));
        assert!(written.contains("### VN-INDEX"));
    }
}
