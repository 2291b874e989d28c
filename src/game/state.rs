use tracing::warn;

use super::action::Direction;
use super::config::GameConfig;
use super::powerup::PowerUp;
use crate::persist::{keys, KvStore};

/// A position on the game board, grid-aligned in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// The snake: body cells head-first, plus its current heading
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0; never empty
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a single-cell snake at the given start position
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: vec![head],
            direction,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Body segments excluding the head
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Shrink back to the initial single cell, as after a life loss
    pub fn reset(&mut self, head: Position, direction: Direction) {
        self.body = vec![head];
        self.direction = direction;
    }
}

/// Complete game state: the single source of simulation truth
///
/// The watched scalars (`score`, `high_score`, `lives`) are private and
/// mutated only through setters that write the new value through to the
/// persistent store in the same call.
#[derive(Debug)]
pub struct GameState {
    pub snake: Snake,
    pub food: Option<Position>,
    pub power_up: Option<PowerUp>,
    pub obstacles: Vec<Position>,
    score: u32,
    high_score: u32,
    lives: u32,
    /// Current tick interval in milliseconds
    pub speed_ms: u64,
    pub fruits_eaten: u32,
    pub has_shield: bool,
    pub double_points: bool,
    pub paused: bool,
    pub running: bool,
    pub game_over: bool,
}

impl GameState {
    /// Fresh state for a new game, keeping a previously persisted high score
    pub fn new(config: &GameConfig, high_score: u32) -> Self {
        Self {
            snake: Snake::new(Self::start_position(config), Self::start_direction()),
            food: None,
            power_up: None,
            obstacles: Vec::new(),
            score: 0,
            high_score,
            lives: config.initial_lives,
            speed_ms: config.initial_speed_ms,
            fruits_eaten: 0,
            has_shield: false,
            double_points: false,
            paused: false,
            running: false,
            game_over: false,
        }
    }

    /// Where the snake starts and returns to after a life loss
    pub fn start_position(config: &GameConfig) -> Position {
        let cell = config.cell_size;
        Position::new(
            config.board_width / 2 / cell * cell,
            config.board_height / 2 / cell * cell,
        )
    }

    pub fn start_direction() -> Direction {
        Direction::Right
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Set the score, writing it through to the store
    pub fn set_score(&mut self, value: u32, store: &mut dyn KvStore) {
        self.score = value;
        persist_scalar(store, keys::SCORE, value);
    }

    /// Set the high score, writing it through to the store
    pub fn set_high_score(&mut self, value: u32, store: &mut dyn KvStore) {
        self.high_score = value;
        persist_scalar(store, keys::HIGH_SCORE, value);
    }

    /// Set the remaining lives, writing them through to the store
    pub fn set_lives(&mut self, value: u32, store: &mut dyn KvStore) {
        self.lives = value;
        persist_scalar(store, keys::LIVES, value);
    }
}

fn persist_scalar(store: &mut dyn KvStore, key: &str, value: u32) {
    if let Err(err) = store.put(key, &value.to_string()) {
        warn!(key, %err, "failed to persist scalar");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(100, 100);
        assert_eq!(pos.moved_by(20, 0), Position::new(120, 100));
        assert_eq!(pos.moved_by(0, -20), Position::new(100, 80));
    }

    #[test]
    fn test_snake_starts_single_cell() {
        let snake = Snake::new(Position::new(250, 250), Direction::Right);
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Position::new(250, 250));
        assert!(snake.body_segments().is_empty());
    }

    #[test]
    fn test_snake_reset_shrinks_body() {
        let mut snake = Snake::new(Position::new(250, 250), Direction::Right);
        snake.body.insert(0, Position::new(270, 250));
        snake.direction = Direction::Down;

        snake.reset(Position::new(250, 250), Direction::Right);
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.direction, Direction::Right);
    }

    #[test]
    fn test_start_position_is_grid_aligned() {
        let config = GameConfig::default();
        let start = GameState::start_position(&config);
        assert_eq!(start, Position::new(240, 240));
        assert_eq!(start.x % config.cell_size, 0);
        assert_eq!(start.y % config.cell_size, 0);
    }

    #[test]
    fn test_initial_state() {
        let config = GameConfig::default();
        let state = GameState::new(&config, 70);

        assert_eq!(state.score(), 0);
        assert_eq!(state.high_score(), 70);
        assert_eq!(state.lives(), config.initial_lives);
        assert_eq!(state.speed_ms, config.initial_speed_ms);
        assert!(!state.running);
        assert!(!state.game_over);
        assert!(state.food.is_none());
        assert!(state.power_up.is_none());
    }

    #[test]
    fn test_setters_write_through() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 0);
        let mut store = MemoryStore::new();

        state.set_score(30, &mut store);
        state.set_high_score(30, &mut store);
        state.set_lives(4, &mut store);

        assert_eq!(store.get(keys::SCORE), Some("30".to_string()));
        assert_eq!(store.get(keys::HIGH_SCORE), Some("30".to_string()));
        assert_eq!(store.get(keys::LIVES), Some("4".to_string()));
        assert_eq!(state.score(), 30);
    }
}
