//! Typed errors for the extraction engine.
//!
//! The core heuristics never fail on bad data (they degrade to empty
//! results); these errors cover configuration, patterns and the I/O done
//! around the engine.

use thiserror::Error;

/// Errors raised while configuring the engine or reading/writing its state.
#[derive(Debug, Error)]
pub enum DigestError {
    /// A configured regular expression failed to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A configured CSS selector failed to parse.
    #[error("invalid selector `{0}`")]
    Selector(String),

    /// YAML configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// JSON (scene dumps, seen-items state) could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system failure, tagged with the path involved.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DigestError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = DigestError::io(
            "/tmp/state.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/state.json"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_pattern_error_from_regex() {
        let source = regex::Regex::new("([").unwrap_err();
        let err = DigestError::Pattern {
            pattern: "([".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid pattern `([`"));
    }
}
