//! Power-up lifecycle: board spawn, pickup, timed effects
//!
//! A power-up instance is absent, active on the board, or consumed. Board
//! instances expire on a timer if not picked up; each effect reverts on
//! its own timer, and re-triggering an effect only rearms that timer
//! (last-write-wins on the revert deadline).

use rand::Rng;

use super::config::GameConfig;
use super::grid;
use super::state::{GameState, Position};
use crate::sched::{TimerKey, TimerQueue};

/// The three temporary gameplay modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    Shield,
    Speed,
    DoublePoints,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Shield,
        PowerUpKind::Speed,
        PowerUpKind::DoublePoints,
    ];

    /// Pick a kind uniformly at random
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Image key used when drawing this kind on the board
    pub fn sprite_key(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "shield",
            PowerUpKind::Speed => "speed",
            PowerUpKind::DoublePoints => "double_points",
        }
    }

    /// Timer that reverts this kind's effect
    pub fn revert_timer(&self) -> TimerKey {
        match self {
            PowerUpKind::Shield => TimerKey::ShieldExpiry,
            PowerUpKind::Speed => TimerKey::SpeedBoostExpiry,
            PowerUpKind::DoublePoints => TimerKey::DoublePointsExpiry,
        }
    }
}

/// A power-up active on the board: cell and kind, present together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUp {
    pub pos: Position,
    pub kind: PowerUpKind,
}

/// Place a random power-up at a safe cell and arm its board expiry.
///
/// The cell keeps a pickup-radius separation from the food, every
/// obstacle, and the snake, so a fresh power-up is never consumed in the
/// tick that spawned it.
pub fn spawn<R: Rng>(
    rng: &mut R,
    config: &GameConfig,
    state: &mut GameState,
    timers: &mut TimerQueue,
) {
    let mut exclusions = state.obstacles.clone();
    exclusions.extend(state.snake.body.iter().copied());
    if let Some(food) = state.food {
        exclusions.push(food);
    }

    let pos = grid::find_safe_spawn(
        rng,
        config.bounds(),
        config.cell_size,
        &exclusions,
        config.power_up_size,
    );
    state.power_up = Some(PowerUp {
        pos,
        kind: PowerUpKind::random(rng),
    });
    timers.arm(TimerKey::PowerUpExpiry, config.power_up_duration);
}

/// Consume the board instance, if any, and activate its effect.
pub fn collect(
    config: &GameConfig,
    state: &mut GameState,
    timers: &mut TimerQueue,
) -> Option<PowerUpKind> {
    let picked = state.power_up.take()?;
    timers.cancel(TimerKey::PowerUpExpiry);
    activate(picked.kind, config, state, timers);
    Some(picked.kind)
}

/// Apply an effect and arm its revert timer.
pub fn activate(
    kind: PowerUpKind,
    config: &GameConfig,
    state: &mut GameState,
    timers: &mut TimerQueue,
) {
    match kind {
        PowerUpKind::Shield => {
            state.has_shield = true;
            timers.arm(TimerKey::ShieldExpiry, config.power_up_duration);
        }
        PowerUpKind::Speed => {
            state.speed_ms = config.initial_speed_ms / 2;
            timers.arm(TimerKey::SpeedBoostExpiry, config.speed_boost_duration);
        }
        PowerUpKind::DoublePoints => {
            state.double_points = true;
            timers.arm(TimerKey::DoublePointsExpiry, config.power_up_duration);
        }
    }
}

/// Handle a fired expiry timer; returns false for keys this module
/// does not own.
pub fn handle_expiry(key: TimerKey, config: &GameConfig, state: &mut GameState) -> bool {
    match key {
        TimerKey::PowerUpExpiry => state.power_up = None,
        TimerKey::ShieldExpiry => state.has_shield = false,
        TimerKey::SpeedBoostExpiry => state.speed_ms = config.initial_speed_ms,
        TimerKey::DoublePointsExpiry => state.double_points = false,
        TimerKey::Tick => return false,
    }
    true
}
