//! Utility functions for run timestamps, string cleanup, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Run timestamps used for report file naming
//! - Whitespace normalization and blank-line collapsing for cleaned text
//! - String truncation for logging
//! - File system validation for output directories

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Date and time stamps for a run.
///
/// # Returns
///
/// `(YYYYMMDD, HHMM, now)` in local time.
pub fn run_stamp() -> (String, String, DateTime<Local>) {
    let now = Local::now();
    (
        now.format("%Y%m%d").to_string(),
        now.format("%H%M").to_string(),
        now,
    )
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse three or more consecutive newlines into one blank line.
pub fn collapse_blank_lines(s: &str) -> String {
    RE_BLANK_RUN.replace_all(s, "\n\n").trim().to_string()
}

/// Length in characters, which is what every length threshold counts.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and the
/// number of remaining bytes appended. Cuts always land on a character
/// boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "Bản quyền thuộc về";
        let result = truncate_for_log(s, 3);
        assert!(result.starts_with("Bản…"));
    }

    #[test]
    fn test_normalize_ws() {
        assert_eq!(normalize_ws("  VN-Index \n\t 1,250.3  "), "VN-Index 1,250.3");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\n\nc\n"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_char_len_counts_characters() {
        assert_eq!(char_len("Cập nhật"), 8);
    }

    #[test]
    fn test_run_stamp_shapes() {
        let (date, time, _) = run_stamp();
        assert_eq!(date.len(), 8);
        assert_eq!(time.len(), 4);
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("reports/json");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }
}
