//! Audio playback capability
//!
//! Playback is best-effort: a cue that cannot be played is logged and
//! dropped, never gating the game. The concrete device is a seam; the
//! default sink is silent but keeps the looping ambient channel's state so
//! stop/restart behave observably.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::assets::AudioClip;

/// Cue keys the engine plays
pub mod cues {
    pub const BG_MUSIC: &str = "bg_music";
    pub const EAT: &str = "eat";
    pub const POWER_UP: &str = "power_up";
    pub const GAME_OVER: &str = "game_over";
}

/// A play/loop/stop playback device
pub trait AudioSink {
    /// Play a clip once
    fn play(&mut self, clip: &AudioClip) -> Result<()>;
    /// Play a clip on the looping ambient channel, replacing what loops now
    fn play_looped(&mut self, clip: &AudioClip) -> Result<()>;
    /// Stop the ambient channel
    fn stop(&mut self) -> Result<()>;
}

/// Default device: no sound, but full channel bookkeeping
#[derive(Debug, Default)]
pub struct SilentSink {
    ambient: Option<PathBuf>,
}

impl SilentSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The clip currently on the ambient channel, if any
    pub fn ambient(&self) -> Option<&PathBuf> {
        self.ambient.as_ref()
    }
}

impl AudioSink for SilentSink {
    fn play(&mut self, clip: &AudioClip) -> Result<()> {
        debug!(path = %clip.path.display(), "audio cue");
        Ok(())
    }

    fn play_looped(&mut self, clip: &AudioClip) -> Result<()> {
        debug!(path = %clip.path.display(), "ambient audio started");
        self.ambient = Some(clip.path.clone());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.ambient.take().is_some() {
            debug!("ambient audio stopped");
        }
        Ok(())
    }
}
