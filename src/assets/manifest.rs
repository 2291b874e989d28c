//! Asset manifest: which named resources the host provides
//!
//! A JSON file mapping image and audio keys to file paths. The game must
//! run in degraded form with any subset absent, so a missing or unparsable
//! manifest degrades to an empty one instead of aborting.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Named image and audio sources supplied by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub images: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub audio: BTreeMap<String, PathBuf>,
}

impl AssetManifest {
    /// Read a manifest from disk, degrading to empty on any failure
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), %err, "asset manifest unavailable; running with fallbacks");
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(path = %path.display(), %err, "asset manifest unreadable; running with fallbacks");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.audio.is_empty()
    }
}
