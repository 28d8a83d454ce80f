//! Report writers.
//!
//! A run's [`Digest`](crate::models::Digest) is written twice: as JSON for
//! the report-generation service and as Markdown for people.
//!
//! # Submodules
//!
//! - [`json`]: Writes the `Digest` under a per-date directory
//! - [`markdown`]: Renders chart tables and classified document lines
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 20250506/
//!     ├── 0915.json
//!     └── 1430.json
//!
//! markdown_output_dir/
//! ├── 20250506_0915.md
//! └── 20250506_1430.md
//! ```

pub mod json;
pub mod markdown;
