//! Loaded resources and the read-only store that owns them

use std::collections::HashMap;
use std::path::PathBuf;

use ratatui::style::Color;
use serde::Deserialize;

/// Load status of a requested resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Requested but not yet resolved
    Pending,
    /// The real resource is available
    Ready,
    /// The shared fallback was substituted
    Fallback,
    /// Resolved as absent (audio only)
    Failed,
}

/// A renderable board entity: one glyph plus its color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub symbol: String,
    pub color: Color,
}

impl Sprite {
    /// The shared substitute for any image that cannot be loaded
    pub fn fallback() -> Self {
        Self {
            symbol: "■".to_string(),
            color: Color::Red,
        }
    }
}

/// On-disk sprite definition, parsed from a small JSON file
#[derive(Debug, Deserialize)]
pub(crate) struct SpriteSpec {
    pub symbol: String,
    pub color: String,
}

/// An audio source that passed the readiness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub path: PathBuf,
}

/// Resolution of one image request: always renderable
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub key: String,
    pub sprite: Sprite,
    pub status: LoadStatus,
}

/// Resolution of one audio request: `clip` is `None` when absent
#[derive(Debug, Clone)]
pub struct LoadedAudio {
    pub key: String,
    pub clip: Option<AudioClip>,
    pub status: LoadStatus,
}

/// All resources resolved during the load phase.
///
/// Built once at startup and read-only afterwards; every image lookup
/// yields a renderable sprite, absent audio simply yields `None`.
#[derive(Debug)]
pub struct AssetStore {
    images: HashMap<String, Sprite>,
    image_status: HashMap<String, LoadStatus>,
    audio: HashMap<String, AudioClip>,
    audio_status: HashMap<String, LoadStatus>,
    fallback: Sprite,
}

impl AssetStore {
    /// A store with nothing loaded; every image resolves to the fallback
    pub fn empty() -> Self {
        Self {
            images: HashMap::new(),
            image_status: HashMap::new(),
            audio: HashMap::new(),
            audio_status: HashMap::new(),
            fallback: Sprite::fallback(),
        }
    }

    pub(crate) fn from_parts(images: Vec<LoadedImage>, audio: Vec<LoadedAudio>) -> Self {
        let mut store = Self::empty();
        for loaded in images {
            store.image_status.insert(loaded.key.clone(), loaded.status);
            store.images.insert(loaded.key, loaded.sprite);
        }
        for loaded in audio {
            store.audio_status.insert(loaded.key.clone(), loaded.status);
            if let Some(clip) = loaded.clip {
                store.audio.insert(loaded.key, clip);
            }
        }
        store
    }

    /// The sprite for `key`; unknown keys yield the shared fallback so a
    /// draw call always has something renderable
    pub fn image(&self, key: &str) -> &Sprite {
        self.images.get(key).unwrap_or(&self.fallback)
    }

    /// Load status for an image key; never-requested keys are `Pending`
    pub fn image_status(&self, key: &str) -> LoadStatus {
        self.image_status
            .get(key)
            .copied()
            .unwrap_or(LoadStatus::Pending)
    }

    /// The clip for `key`, or `None` when the audio resolved as absent
    pub fn audio(&self, key: &str) -> Option<&AudioClip> {
        self.audio.get(key)
    }

    /// Load status for an audio key; never-requested keys are `Pending`
    pub fn audio_status(&self, key: &str) -> LoadStatus {
        self.audio_status
            .get(key)
            .copied()
            .unwrap_or(LoadStatus::Pending)
    }

    pub fn fallback(&self) -> &Sprite {
        &self.fallback
    }
}
