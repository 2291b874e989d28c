//! Interactive play: terminal lifecycle and the cooperative driver
//!
//! One `tokio::select!` loop races keyboard input, the earliest scheduled
//! deadline, and Ctrl+C. Due timers are drained into the engine and the
//! frame is redrawn after every wake-up, so a tick is always one update
//! followed by one render.

use std::future;
use std::io::{stderr, Stderr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::style::Color;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time::{interval, Instant};
use tracing::warn;

use crate::assets::{AssetLoader, AssetManifest, AssetStore};
use crate::audio::SilentSink;
use crate::game::{GameConfig, GameEngine};
use crate::input::{InputHandler, KeyAction};
use crate::persist::{JsonFileStore, KvStore, MemoryStore};
use crate::render::Renderer;
use crate::sched::TimerQueue;

/// How the host wires the engine to the outside world
pub struct PlayOptions {
    pub manifest_path: PathBuf,
    pub save_path: PathBuf,
    pub skin: Color,
}

pub struct PlayMode {
    config: GameConfig,
    options: PlayOptions,
    renderer: Renderer,
    input: InputHandler,
    should_quit: bool,
}

impl PlayMode {
    pub fn new(config: GameConfig, options: PlayOptions) -> Self {
        let renderer = Renderer::new(options.skin);
        Self {
            config,
            options,
            renderer,
            input: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run with cleanup on both paths
        let result = self.run_inner(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_inner(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let manifest = AssetManifest::load(&self.options.manifest_path);
        let assets = self.load_assets(terminal, &manifest).await?;
        self.run_session(terminal, assets).await
    }

    /// Resolve every asset, polling the shared progress for the gauge.
    /// The game does not start until the join completes.
    async fn load_assets(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
        manifest: &AssetManifest,
    ) -> Result<AssetStore> {
        let loader = AssetLoader::new(self.config.audio_ready_timeout);
        let progress = loader.progress();

        let load = loader.load_all(manifest);
        tokio::pin!(load);

        let mut gauge_timer = interval(Duration::from_millis(100));
        loop {
            tokio::select! {
                store = &mut load => {
                    return Ok(store);
                }
                _ = gauge_timer.tick() => {
                    terminal
                        .draw(|frame| self.renderer.render_loading(frame, progress.percent()))
                        .context("Failed to draw loading screen")?;
                }
            }
        }
    }

    async fn run_session(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
        assets: AssetStore,
    ) -> Result<()> {
        let store: Box<dyn KvStore> = match JsonFileStore::open(&self.options.save_path) {
            Ok(store) => Box::new(store),
            Err(err) => {
                warn!(%err, "save file unusable; scores will not persist");
                Box::new(MemoryStore::new())
            }
        };

        let mut engine = GameEngine::new(self.config.clone(), store, Box::new(SilentSink::new()));
        let mut state = engine.initial_state();
        let mut timers = TimerQueue::new();
        let mut events = EventStream::new();

        terminal
            .draw(|frame| self.renderer.render(frame, &state, &self.config, &assets))
            .context("Failed to draw frame")?;

        loop {
            let next_deadline = timers.next_deadline();

            tokio::select! {
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(event) => {
                            let event = event.context("Failed to read terminal event")?;
                            if let Event::Key(key) = event {
                                // Only process key press events, not release
                                if key.kind == KeyEventKind::Press {
                                    match self.input.handle_key_event(key) {
                                        KeyAction::Steer(direction) => {
                                            engine.steer(&mut state, direction);
                                        }
                                        KeyAction::Start => {
                                            engine.start(&mut state, &mut timers, &assets);
                                        }
                                        KeyAction::TogglePause => {
                                            engine.toggle_pause(&mut state, &mut timers);
                                        }
                                        KeyAction::Reset => {
                                            engine.reset(&mut state, &mut timers, &assets);
                                        }
                                        KeyAction::Quit => {
                                            self.should_quit = true;
                                        }
                                        KeyAction::None => {}
                                    }
                                }
                            }
                        }
                        None => {
                            self.should_quit = true;
                        }
                    }
                }

                // Earliest scheduled deadline: tick or an effect expiry
                _ = sleep_until_deadline(next_deadline) => {
                    for key in timers.pop_due(Instant::now()) {
                        engine.handle_timer(key, &mut state, &mut timers, &assets);
                    }
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            terminal
                .draw(|frame| self.renderer.render(frame, &state, &self.config, &assets))
                .context("Failed to draw frame")?;

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Sleep until the deadline, or forever when nothing is scheduled
async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}
