//! JSON output for the report-generation service.
//!
//! # Output Structure
//!
//! Files are organized by date with the run time as file name:
//! ```text
//! json_output_dir/
//! └── 20250506/
//!     └── 1430.json
//! ```

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::error::{DigestError, Result};
use crate::models::Digest;

/// Write a [`Digest`] to `{json_output_dir}/{local_date}/{local_time}.json`.
///
/// # Arguments
///
/// * `digest` - The run's chart and document reports
/// * `json_output_dir` - Base directory for JSON output
///
/// # Returns
///
/// The path written, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_digest(digest: &Digest, json_output_dir: &Path) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(digest)?;

    let full_json_dir = json_output_dir.join(&digest.local_date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(DigestError::io(full_json_dir.display().to_string(), e));
    }

    let output_json_filename = full_json_dir.join(format!("{}.json", digest.local_time));
    fs::write(&output_json_filename, json)
        .await
        .map_err(|e| DigestError::io(output_json_filename.display().to_string(), e))?;
    info!(path = %output_json_filename.display(), "Wrote JSON digest");

    Ok(output_json_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartReport, GroupedResult, PairedRecord, SourceOutcome};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_digest_layout() {
        let dir = tempdir().unwrap();
        let digest = Digest {
            local_date: "20250506".to_string(),
            local_time: "1430".to_string(),
            charts: vec![ChartReport {
                id: "top-influence-1".to_string(),
                title: "VN-INDEX".to_string(),
                left_label: "Top Losers".to_string(),
                right_label: "Top Gainers".to_string(),
                outcome: SourceOutcome::Success(GroupedResult {
                    left: vec![PairedRecord::new("HDB", -1.2)],
                    right: vec![PairedRecord::new("VPL", 3.45)],
                }),
            }],
            documents: Vec::new(),
        };

        let path = write_digest(&digest, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("20250506").join("1430.json"));

        let back: Digest = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, digest);
    }
}
