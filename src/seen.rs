//! On-disk record of items already processed.
//!
//! The state file is a small JSON object:
//!
//! ```json
//! { "seen_items": { "<sha256 hex>": "2025-05-06 14:30" } }
//! ```
//!
//! It is read once when a run starts and written once when it ends. A
//! missing or unreadable file starts the run with an empty record.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::{DigestError, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SeenFile {
    #[serde(default)]
    seen_items: BTreeMap<String, String>,
}

/// Keys of processed items mapped to the time they were first seen.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl SeenStore {
    /// An empty store that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: BTreeMap::new(),
        }
    }

    /// Load the store from `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No seen-items state yet; starting empty");
                return Self::empty(path);
            }
            Err(e) => {
                warn!(error = %e, "Could not read seen-items state; starting empty");
                return Self::empty(path);
            }
        };

        match serde_json::from_str::<SeenFile>(&raw) {
            Ok(file) => {
                info!(count = file.seen_items.len(), "Loaded seen-items state");
                Self {
                    path: path.to_path_buf(),
                    items: file.seen_items,
                }
            }
            Err(e) => {
                warn!(error = %e, "Seen-items state is corrupt; starting empty");
                Self::empty(path)
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Record `key`; returns false if it was already present.
    ///
    /// The first stamp recorded for a key is kept.
    pub fn insert(&mut self, key: String, stamp: impl Into<String>) -> bool {
        if self.items.contains_key(&key) {
            return false;
        }
        self.items.insert(key, stamp.into());
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Write the store back to its file, creating parent directories.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), count = self.items.len()))]
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DigestError::io(parent.display().to_string(), e))?;
        }
        let json = serde_json::to_string_pretty(&SeenFile {
            seen_items: self.items.clone(),
        })?;
        fs::write(&self.path, json)
            .await
            .map_err(|e| DigestError::io(self.path.display().to_string(), e))?;
        info!("Saved seen-items state");
        Ok(())
    }
}

/// Key for a document body.
pub fn content_key(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}
