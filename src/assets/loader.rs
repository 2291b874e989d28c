//! Asset acquisition with graceful degradation
//!
//! Every request resolves exactly once: images fall back to the shared
//! placeholder sprite on any failure, audio resolves as absent when its
//! source is missing or does not become playable within the bounded wait.
//! Aggregate progress is kept in atomic counters so the loading screen can
//! poll it while requests are in flight.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use futures::future::join_all;
use ratatui::style::Color;
use tokio::io::AsyncReadExt;
use tracing::warn;

use super::manifest::AssetManifest;
use super::store::{AssetStore, AudioClip, LoadStatus, LoadedAudio, LoadedImage, Sprite, SpriteSpec};

/// Requested/resolved counters observable during the load phase
#[derive(Debug, Default)]
pub struct LoadProgress {
    requested: AtomicU32,
    resolved: AtomicU32,
}

impl LoadProgress {
    fn begin(&self) {
        self.requested.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.resolved.fetch_add(1, Ordering::SeqCst);
    }

    pub fn requested(&self) -> u32 {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn resolved(&self) -> u32 {
        self.resolved.load(Ordering::SeqCst)
    }

    /// Percentage of requests resolved; 0 when nothing has been requested
    pub fn percent(&self) -> f64 {
        let requested = self.requested();
        if requested == 0 {
            return 0.0;
        }
        f64::from(self.resolved()) / f64::from(requested) * 100.0
    }
}

/// Resolves named resources, never failing a request
pub struct AssetLoader {
    progress: Arc<LoadProgress>,
    audio_ready_timeout: Duration,
}

impl AssetLoader {
    pub fn new(audio_ready_timeout: Duration) -> Self {
        Self {
            progress: Arc::new(LoadProgress::default()),
            audio_ready_timeout,
        }
    }

    /// Shared progress handle for the loading screen
    pub fn progress(&self) -> Arc<LoadProgress> {
        Arc::clone(&self.progress)
    }

    /// Request one image; resolves to the real sprite or the shared fallback
    pub async fn request_image(&self, key: &str, source: Option<&Path>) -> LoadedImage {
        self.progress.begin();

        let (sprite, status) = match source {
            None => {
                warn!(key, "no image source provided; using fallback");
                (Sprite::fallback(), LoadStatus::Fallback)
            }
            Some(path) => match read_sprite(path).await {
                Ok(sprite) => (sprite, LoadStatus::Ready),
                Err(err) => {
                    warn!(key, path = %path.display(), %err, "image load failed; using fallback");
                    (Sprite::fallback(), LoadStatus::Fallback)
                }
            },
        };

        self.progress.finish();
        LoadedImage {
            key: key.to_string(),
            sprite,
            status,
        }
    }

    /// Request one audio clip; resolves as absent on a missing source, a
    /// probe error, or when readiness does not arrive within the timeout
    pub async fn request_audio(&self, key: &str, source: Option<&Path>) -> LoadedAudio {
        self.progress.begin();

        let clip = match source {
            None => {
                warn!(key, "no audio source provided");
                None
            }
            Some(path) => {
                match tokio::time::timeout(self.audio_ready_timeout, probe_audio(path)).await {
                    Ok(Ok(clip)) => Some(clip),
                    Ok(Err(err)) => {
                        warn!(key, path = %path.display(), %err, "audio load failed");
                        None
                    }
                    Err(_) => {
                        warn!(key, path = %path.display(), "timed out waiting for audio readiness");
                        None
                    }
                }
            }
        };

        self.progress.finish();
        let status = if clip.is_some() {
            LoadStatus::Ready
        } else {
            LoadStatus::Failed
        };
        LoadedAudio {
            key: key.to_string(),
            clip,
            status,
        }
    }

    /// Resolve every manifest entry concurrently.
    ///
    /// Returns only after every request has resolved; individual failures
    /// never abort the join.
    pub async fn load_all(&self, manifest: &AssetManifest) -> AssetStore {
        let images = join_all(
            manifest
                .images
                .iter()
                .map(|(key, path)| self.request_image(key, Some(path))),
        );
        let audio = join_all(
            manifest
                .audio
                .iter()
                .map(|(key, path)| self.request_audio(key, Some(path))),
        );

        let (images, audio) = futures::join!(images, audio);
        AssetStore::from_parts(images, audio)
    }
}

async fn read_sprite(path: &Path) -> Result<Sprite> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read sprite file {:?}", path))?;
    let spec: SpriteSpec = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse sprite file {:?}", path))?;
    ensure!(!spec.symbol.is_empty(), "sprite symbol is empty");

    let color: Color = spec
        .color
        .parse()
        .with_context(|| format!("Invalid sprite color {:?}", spec.color))?;
    Ok(Sprite {
        symbol: spec.symbol,
        color,
    })
}

async fn probe_audio(path: &Path) -> Result<AudioClip> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open audio source {:?}", path))?;

    let mut header = [0u8; 16];
    let read = file
        .read(&mut header)
        .await
        .with_context(|| format!("Failed to read audio source {:?}", path))?;
    ensure!(read > 0, "audio source is empty");

    Ok(AudioClip {
        path: path.to_path_buf(),
    })
}
