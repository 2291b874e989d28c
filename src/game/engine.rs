use std::time::Duration;

use rand::rngs::ThreadRng;
use tracing::{debug, info, warn};

use super::action::Direction;
use super::config::GameConfig;
use super::grid;
use super::powerup;
use super::state::GameState;
use crate::assets::AssetStore;
use crate::audio::{cues, AudioSink};
use crate::persist::{keys, KvStore};
use crate::sched::{TimerKey, TimerQueue};

/// The lifecycle controller: owns every rule that mutates the game
///
/// One instance drives the whole session. All mutation goes through the
/// shared `GameState`; the watched scalars write through to the store, and
/// every scheduled action lives in the caller's `TimerQueue`.
pub struct GameEngine {
    config: GameConfig,
    rng: ThreadRng,
    store: Box<dyn KvStore>,
    audio: Box<dyn AudioSink>,
}

impl GameEngine {
    pub fn new(config: GameConfig, store: Box<dyn KvStore>, audio: Box<dyn AudioSink>) -> Self {
        Self {
            config,
            rng: rand::thread_rng(),
            store,
            audio,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Fresh state for a new session; the high score is read from the
    /// store once, here
    pub fn initial_state(&self) -> GameState {
        let high_score = self
            .store
            .get(keys::HIGH_SCORE)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        GameState::new(&self.config, high_score)
    }

    /// Begin play: idempotent while running; a finished game needs a
    /// reset first
    pub fn start(
        &mut self,
        state: &mut GameState,
        timers: &mut TimerQueue,
        assets: &AssetStore,
    ) {
        if state.running || state.game_over {
            return;
        }
        state.running = true;
        self.play_looped_cue(assets, cues::BG_MUSIC);
        self.spawn_food(state);
        timers.arm(TimerKey::Tick, Duration::from_millis(state.speed_ms));
        info!("game started");
    }

    /// Flip the pause flag; pausing cancels the tick, unpausing schedules
    /// exactly one new tick
    pub fn toggle_pause(&mut self, state: &mut GameState, timers: &mut TimerQueue) {
        if !state.running {
            return;
        }
        state.paused = !state.paused;
        if state.paused {
            timers.cancel(TimerKey::Tick);
        } else {
            timers.arm(TimerKey::Tick, Duration::from_millis(state.speed_ms));
        }
        info!(paused = state.paused, "pause toggled");
    }

    /// Restore initial state, cancelling every outstanding timer so no
    /// stale deadline can touch the new game; the high score survives
    pub fn reset(
        &mut self,
        state: &mut GameState,
        timers: &mut TimerQueue,
        assets: &AssetStore,
    ) {
        timers.clear();
        *state = GameState::new(&self.config, state.high_score());
        state.set_score(0, self.store.as_mut());
        state.set_lives(self.config.initial_lives, self.store.as_mut());
        self.play_looped_cue(assets, cues::BG_MUSIC);
        info!("game reset");
    }

    /// Apply a direction intent; ignored while not running or paused, and
    /// never a 180-degree reversal
    pub fn steer(&mut self, state: &mut GameState, direction: Direction) {
        if !state.running || state.paused {
            return;
        }
        if state.snake.direction.is_opposite(direction) {
            return;
        }
        state.snake.direction = direction;
    }

    /// Dispatch a fired timer: effect expiries revert their flag, the
    /// tick runs one simulation step and rearms at the current speed
    pub fn handle_timer(
        &mut self,
        key: TimerKey,
        state: &mut GameState,
        timers: &mut TimerQueue,
        assets: &AssetStore,
    ) {
        if powerup::handle_expiry(key, &self.config, state) {
            return;
        }

        if state.running && !state.paused {
            self.tick(state, timers, assets);
            if state.running {
                timers.arm(TimerKey::Tick, Duration::from_millis(state.speed_ms));
            }
        }
    }

    /// One simulation step: move, then resolve food, power-up, and
    /// obstacle contact in that order
    fn tick(&mut self, state: &mut GameState, timers: &mut TimerQueue, assets: &AssetStore) {
        let head = grid::step(
            state.snake.head(),
            state.snake.direction,
            self.config.bounds(),
            self.config.cell_size,
        );

        if grid::self_collides(head, state.snake.body_segments()) {
            self.lose_life(state, timers, assets);
            return;
        }

        state.snake.body.insert(0, head);

        let ate = state
            .food
            .map_or(false, |food| grid::near(head, food, self.config.cell_size));
        if ate {
            self.eat_food(state, timers, assets);
        } else {
            state.snake.body.pop();
        }

        if let Some(power_up) = state.power_up {
            if grid::near(head, power_up.pos, self.config.power_up_size) {
                self.play_cue(assets, cues::POWER_UP);
                powerup::collect(&self.config, state, timers);
            }
        }

        let hit_obstacle = state
            .obstacles
            .iter()
            .any(|&obstacle| grid::near(head, obstacle, self.config.obstacle_size));
        if hit_obstacle && !state.has_shield {
            self.lose_life(state, timers, assets);
        }
    }

    fn eat_food(&mut self, state: &mut GameState, timers: &mut TimerQueue, assets: &AssetStore) {
        let points = if state.double_points {
            self.config.food_points * 2
        } else {
            self.config.food_points
        };
        let score = state.score() + points;
        state.set_score(score, self.store.as_mut());
        state.fruits_eaten += 1;
        self.play_cue(assets, cues::EAT);
        self.spawn_food(state);

        if score > state.high_score() {
            state.set_high_score(score, self.store.as_mut());
        }

        if state.fruits_eaten % self.config.power_up_every == 0 {
            self.play_cue(assets, cues::POWER_UP);
            powerup::spawn(&mut self.rng, &self.config, state, timers);
        }

        if state.obstacles.len() < self.config.max_obstacles
            && score % self.config.obstacle_score_every == 0
        {
            self.spawn_obstacle(state);
        }

        self.apply_speed_ramp(state);
    }

    /// Regenerate food clear of every obstacle and the active power-up
    fn spawn_food(&mut self, state: &mut GameState) {
        let mut exclusions = state.obstacles.clone();
        if let Some(power_up) = state.power_up {
            exclusions.push(power_up.pos);
        }
        state.food = Some(grid::find_safe_spawn(
            &mut self.rng,
            self.config.bounds(),
            self.config.cell_size,
            &exclusions,
            self.config.cell_size,
        ));
    }

    fn spawn_obstacle(&mut self, state: &mut GameState) {
        let mut exclusions = vec![state.snake.head()];
        if let Some(food) = state.food {
            exclusions.push(food);
        }
        if let Some(power_up) = state.power_up {
            exclusions.push(power_up.pos);
        }
        let pos = grid::find_safe_spawn(
            &mut self.rng,
            self.config.bounds(),
            self.config.cell_size,
            &exclusions,
            self.config.obstacle_size,
        );
        state.obstacles.push(pos);
        debug!(x = pos.x, y = pos.y, "obstacle spawned");
    }

    /// Every `speed_ramp_every` points, shave the tick interval until it
    /// reaches the floor
    fn apply_speed_ramp(&self, state: &mut GameState) {
        if state.speed_ms > self.config.min_speed_ms
            && state.score() % self.config.speed_ramp_every == 0
        {
            state.speed_ms -= self.config.speed_ramp_step_ms;
        }
    }

    fn lose_life(&mut self, state: &mut GameState, timers: &mut TimerQueue, assets: &AssetStore) {
        let lives = state.lives().saturating_sub(1);
        state.set_lives(lives, self.store.as_mut());

        if lives > 0 {
            state.snake.reset(
                GameState::start_position(&self.config),
                GameState::start_direction(),
            );
            info!(lives, "life lost");
        } else {
            self.finish_game(state, timers, assets);
        }
    }

    fn finish_game(&mut self, state: &mut GameState, timers: &mut TimerQueue, assets: &AssetStore) {
        state.running = false;
        state.game_over = true;
        timers.cancel(TimerKey::Tick);
        if let Err(err) = self.audio.stop() {
            warn!(%err, "failed to stop ambient audio");
        }
        self.play_cue(assets, cues::GAME_OVER);
        info!(score = state.score(), "game over");
    }

    fn play_cue(&mut self, assets: &AssetStore, key: &str) {
        if let Some(clip) = assets.audio(key) {
            if let Err(err) = self.audio.play(clip) {
                warn!(key, %err, "audio playback failed");
            }
        }
    }

    fn play_looped_cue(&mut self, assets: &AssetStore, key: &str) {
        if let Some(clip) = assets.audio(key) {
            if let Err(err) = self.audio.play_looped(clip) {
                warn!(key, %err, "audio playback failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentSink;
    use crate::game::powerup::{PowerUp, PowerUpKind};
    use crate::game::state::Position;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Store whose contents stay observable after the engine takes it
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<HashMap<String, String>>>);

    impl KvStore for SharedStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key).cloned()
        }

        fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct Fixture {
        engine: GameEngine,
        state: GameState,
        timers: TimerQueue,
        assets: AssetStore,
        store: SharedStore,
    }

    fn fixture() -> Fixture {
        let store = SharedStore::default();
        let engine = GameEngine::new(
            GameConfig::default(),
            Box::new(store.clone()),
            Box::new(SilentSink::new()),
        );
        let state = engine.initial_state();
        Fixture {
            engine,
            state,
            timers: TimerQueue::new(),
            assets: AssetStore::empty(),
            store,
        }
    }

    fn started() -> Fixture {
        let mut f = fixture();
        f.engine.start(&mut f.state, &mut f.timers, &f.assets);
        f
    }

    /// Put food directly in the head's path and run one tick
    fn feed(f: &mut Fixture) {
        let next = grid::step(
            f.state.snake.head(),
            f.state.snake.direction,
            f.engine.config().bounds(),
            f.engine.config().cell_size,
        );
        f.state.food = Some(next);
        f.engine
            .handle_timer(TimerKey::Tick, &mut f.state, &mut f.timers, &f.assets);
    }

    /// Run one tick with the food somewhere it cannot be eaten
    fn tick_without_food(f: &mut Fixture) {
        f.state.food = Some(Position::new(0, 0));
        f.engine
            .handle_timer(TimerKey::Tick, &mut f.state, &mut f.timers, &f.assets);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_spawns_food_and_arms_tick() {
        let f = started();
        assert!(f.state.running);
        assert!(f.state.food.is_some());
        assert!(f.timers.is_armed(TimerKey::Tick));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let mut f = started();
        let food = f.state.food;
        f.engine.start(&mut f.state, &mut f.timers, &f.assets);
        assert_eq!(f.state.food, food);
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_move_keeps_length() {
        let mut f = started();
        let head = f.state.snake.head();

        tick_without_food(&mut f);

        assert_eq!(f.state.snake.len(), 1);
        assert_eq!(f.state.snake.head(), Position::new(head.x + 20, head.y));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eating_scores_ten_and_grows() {
        let mut f = started();

        feed(&mut f);

        assert_eq!(f.state.score(), 10);
        assert_eq!(f.state.fruits_eaten, 1);
        assert_eq!(f.state.snake.len(), 2);
        assert_eq!(f.state.high_score(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eating_under_double_points_scores_twenty() {
        let mut f = started();
        f.state.double_points = true;

        feed(&mut f);

        assert_eq!(f.state.score(), 20);
        assert_eq!(f.state.fruits_eaten, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watched_scalars_write_through() {
        let mut f = started();

        feed(&mut f);

        assert_eq!(f.store.get(keys::SCORE), Some("10".to_string()));
        assert_eq!(f.store.get(keys::HIGH_SCORE), Some("10".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_high_score_read_once_at_startup() {
        let mut store = SharedStore::default();
        store.put(keys::HIGH_SCORE, "70").unwrap();
        let engine = GameEngine::new(
            GameConfig::default(),
            Box::new(store),
            Box::new(SilentSink::new()),
        );
        assert_eq!(engine.initial_state().high_score(), 70);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tenth_fruit_spawns_power_up() {
        let mut f = started();

        for n in 1..=9 {
            feed(&mut f);
            assert_eq!(f.state.fruits_eaten, n);
            assert!(f.state.power_up.is_none());
        }

        feed(&mut f);

        assert_eq!(f.state.fruits_eaten, 10);
        assert_eq!(f.state.snake.len(), 11);
        assert!(f.state.power_up.is_some());
        assert!(f.timers.is_armed(TimerKey::PowerUpExpiry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shield_pickup_lasts_its_duration() {
        let mut f = started();
        let next = grid::step(
            f.state.snake.head(),
            f.state.snake.direction,
            f.engine.config().bounds(),
            f.engine.config().cell_size,
        );
        f.state.power_up = Some(PowerUp {
            pos: next,
            kind: PowerUpKind::Shield,
        });

        tick_without_food(&mut f);

        assert!(f.state.power_up.is_none());
        assert!(f.state.has_shield);

        tokio::time::advance(f.engine.config().power_up_duration).await;
        for key in f.timers.pop_due(Instant::now()) {
            f.engine
                .handle_timer(key, &mut f.state, &mut f.timers, &f.assets);
        }
        assert!(!f.state.has_shield);
    }

    #[tokio::test(start_paused = true)]
    async fn test_obstacle_collision_costs_a_life() {
        let mut f = started();
        let next = grid::step(
            f.state.snake.head(),
            f.state.snake.direction,
            f.engine.config().bounds(),
            f.engine.config().cell_size,
        );
        f.state.obstacles.push(next);

        tick_without_food(&mut f);

        assert_eq!(f.state.lives(), 4);
        assert_eq!(f.store.get(keys::LIVES), Some("4".to_string()));
        assert_eq!(f.state.snake.len(), 1);
        assert_eq!(
            f.state.snake.head(),
            GameState::start_position(f.engine.config())
        );
        assert!(f.state.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shield_absorbs_obstacle_collision() {
        let mut f = started();
        f.state.has_shield = true;
        let next = grid::step(
            f.state.snake.head(),
            f.state.snake.direction,
            f.engine.config().bounds(),
            f.engine.config().cell_size,
        );
        f.state.obstacles.push(next);

        tick_without_food(&mut f);

        assert_eq!(f.state.lives(), 5);
        assert!(f.state.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_collision_with_lives_left_resets_snake() {
        let mut f = started();
        let head = f.state.snake.head();
        f.state.snake.body = vec![head, Position::new(head.x + 20, head.y)];

        tick_without_food(&mut f);

        assert_eq!(f.state.lives(), 4);
        assert_eq!(f.state.snake.len(), 1);
        assert!(f.state.running);
        assert!(f.timers.is_armed(TimerKey::Tick));
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_collision_on_last_life_ends_game() {
        let mut f = started();
        f.state.set_lives(1, &mut f.store.clone());
        let head = f.state.snake.head();
        f.state.snake.body = vec![head, Position::new(head.x + 20, head.y)];

        tick_without_food(&mut f);

        assert_eq!(f.state.lives(), 0);
        assert!(!f.state.running);
        assert!(f.state.game_over);
        assert!(!f.timers.is_armed(TimerKey::Tick));
        // The dead snake is left where it was, not reset.
        assert_eq!(f.state.snake.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_ramps_down_to_floor() {
        let mut f = started();
        f.state.speed_ms = 25;
        f.state.set_score(40, &mut f.store.clone());

        feed(&mut f);
        assert_eq!(f.state.score(), 50);
        assert_eq!(f.state.speed_ms, 20);

        f.state.set_score(90, &mut f.store.clone());
        feed(&mut f);
        assert_eq!(f.state.score(), 100);
        assert_eq!(f.state.speed_ms, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_obstacles_spawn_capped_at_three() {
        let mut f = started();
        f.state.obstacles = vec![
            Position::new(0, 0),
            Position::new(0, 40),
            Position::new(0, 80),
        ];
        f.state.set_score(90, &mut f.store.clone());

        feed(&mut f);

        assert_eq!(f.state.score(), 100);
        assert_eq!(f.state.obstacles.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_tick_and_unpause_resumes() {
        let mut f = started();

        f.engine.toggle_pause(&mut f.state, &mut f.timers);
        assert!(f.state.paused);
        assert!(!f.timers.is_armed(TimerKey::Tick));

        // A tick firing while paused must neither move nor rearm.
        let head = f.state.snake.head();
        f.engine
            .handle_timer(TimerKey::Tick, &mut f.state, &mut f.timers, &f.assets);
        assert_eq!(f.state.snake.head(), head);
        assert!(!f.timers.is_armed(TimerKey::Tick));

        f.engine.toggle_pause(&mut f.state, &mut f.timers);
        assert!(!f.state.paused);
        assert!(f.timers.is_armed(TimerKey::Tick));
    }

    #[tokio::test(start_paused = true)]
    async fn test_steer_gated_and_no_reversal() {
        let mut f = fixture();

        // Not running yet: ignored.
        f.engine.steer(&mut f.state, Direction::Up);
        assert_eq!(f.state.snake.direction, Direction::Right);

        f.engine.start(&mut f.state, &mut f.timers, &f.assets);
        f.engine.steer(&mut f.state, Direction::Left);
        assert_eq!(f.state.snake.direction, Direction::Right);

        f.engine.steer(&mut f.state, Direction::Up);
        assert_eq!(f.state.snake.direction, Direction::Up);

        f.engine.toggle_pause(&mut f.state, &mut f.timers);
        f.engine.steer(&mut f.state, Direction::Left);
        assert_eq!(f.state.snake.direction, Direction::Up);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restores_initial_state_but_keeps_high_score() {
        let mut f = started();
        feed(&mut f);
        feed(&mut f);
        f.state.has_shield = true;

        f.engine.reset(&mut f.state, &mut f.timers, &f.assets);

        assert_eq!(f.state.score(), 0);
        assert_eq!(f.state.high_score(), 20);
        assert_eq!(f.state.lives(), 5);
        assert_eq!(f.state.snake.len(), 1);
        assert!(!f.state.has_shield);
        assert!(!f.state.running);
        assert!(!f.state.game_over);
        assert_eq!(f.timers.next_deadline(), None);
        assert_eq!(f.store.get(keys::SCORE), Some("0".to_string()));
        assert_eq!(f.store.get(keys::HIGH_SCORE), Some("20".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_after_game_over_requires_reset() {
        let mut f = started();
        f.state.set_lives(1, &mut f.store.clone());
        let head = f.state.snake.head();
        f.state.snake.body = vec![head, Position::new(head.x + 20, head.y)];
        tick_without_food(&mut f);
        assert!(f.state.game_over);

        f.engine.start(&mut f.state, &mut f.timers, &f.assets);
        assert!(!f.state.running);

        f.engine.reset(&mut f.state, &mut f.timers, &f.assets);
        f.engine.start(&mut f.state, &mut f.timers, &f.assets);
        assert!(f.state.running);
    }
}
