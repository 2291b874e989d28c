use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the game
///
/// Distances are in pixels; the board is addressed in cell-size multiples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board width in pixels
    pub board_width: i32,
    /// Board height in pixels
    pub board_height: i32,
    /// Side of one grid cell in pixels
    pub cell_size: i32,

    /// Starting tick interval in milliseconds
    pub initial_speed_ms: u64,
    /// Fastest allowed tick interval
    pub min_speed_ms: u64,
    /// How much the tick interval shrinks at each ramp step
    pub speed_ramp_step_ms: u64,
    /// Score interval that triggers a ramp step
    pub speed_ramp_every: u32,

    /// Lives at the start of a game
    pub initial_lives: u32,
    /// Points for one food item (doubled under the double-points effect)
    pub food_points: u32,
    /// A power-up spawns every this many fruits eaten
    pub power_up_every: u32,
    /// Score interval that may spawn an obstacle
    pub obstacle_score_every: u32,
    /// Obstacles stop spawning once this many exist
    pub max_obstacles: usize,

    /// Collision threshold for power-ups, in pixels
    pub power_up_size: i32,
    /// Collision threshold for obstacles, in pixels
    pub obstacle_size: i32,

    /// Board lifetime of an uncollected power-up, and duration of the
    /// shield and double-points effects
    pub power_up_duration: Duration,
    /// Duration of the speed-boost effect
    pub speed_boost_duration: Duration,
    /// Bounded wait for an audio source to become playable
    pub audio_ready_timeout: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 500,
            board_height: 500,
            cell_size: 20,
            initial_speed_ms: 100,
            min_speed_ms: 20,
            speed_ramp_step_ms: 5,
            speed_ramp_every: 50,
            initial_lives: 5,
            food_points: 10,
            power_up_every: 10,
            obstacle_score_every: 100,
            max_obstacles: 3,
            power_up_size: 25,
            obstacle_size: 25,
            power_up_duration: Duration::from_millis(5000),
            speed_boost_duration: Duration::from_millis(10_000),
            audio_ready_timeout: Duration::from_millis(5000),
        }
    }
}

impl GameConfig {
    /// Create a configuration for a board of the given size in cells
    pub fn new(width_cells: u16, height_cells: u16) -> Self {
        let defaults = Self::default();
        Self {
            board_width: i32::from(width_cells) * defaults.cell_size,
            board_height: i32::from(height_cells) * defaults.cell_size,
            ..defaults
        }
    }

    /// Create a small board for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Board bounds as (width, height) in pixels
    pub fn bounds(&self) -> (i32, i32) {
        (self.board_width, self.board_height)
    }
}
