//! Draw-intent composition and the TUI rasterizer

pub mod intent;
pub mod renderer;

pub use intent::{compose_frame, DrawIntent};
pub use renderer::Renderer;
