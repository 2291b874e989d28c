//! Serpent - a terminal arcade snake
//!
//! This library provides:
//! - Asset acquisition with graceful degradation (assets module)
//! - Core game logic: spatial rules, power-ups, lifecycle (game module)
//! - Cancellable keyed timers driving the tick loop (sched module)
//! - Score persistence behind a key-value store (persist module)
//! - Draw-intent composition and TUI rendering (render module)
//! - Keyboard input mapping and the interactive mode (input, modes)

pub mod assets;
pub mod audio;
pub mod game;
pub mod input;
pub mod modes;
pub mod persist;
pub mod render;
pub mod sched;
