//! Asset acquisition pipeline
//!
//! Named image and audio resources are resolved asynchronously before the
//! game starts. Individual failures never abort the load: images degrade
//! to a shared fallback sprite, audio degrades to silence, and the join
//! completes once every request has resolved one way or the other.

pub mod loader;
pub mod manifest;
pub mod store;

pub use loader::{AssetLoader, LoadProgress};
pub use manifest::AssetManifest;
pub use store::{AssetStore, AudioClip, LoadStatus, LoadedAudio, LoadedImage, Sprite};
