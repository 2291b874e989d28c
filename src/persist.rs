//! Score persistence behind a key-value string store
//!
//! The engine writes the watched scalars (`score`, `high_score`, `lives`)
//! through on every mutation and reads `high_score` once at startup. The
//! store medium is a seam: the shipped implementation keeps a JSON file on
//! disk, tests use the in-memory store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Watched scalar keys
pub mod keys {
    pub const SCORE: &str = "score";
    pub const HIGH_SCORE: &str = "high_score";
    pub const LIVES: &str = "lives";
}

/// String-keyed scalar store
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store: the full map is rewritten on every put
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFileStore {
    /// Open a store at the given path, starting empty if the file is absent
    pub fn open(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read save file {:?}", path))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse save file {:?}", path))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.values)
            .context("Failed to serialize save data")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write save file {:?}", self.path))?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// In-memory store for tests and as a fallback when the save file is unusable
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
