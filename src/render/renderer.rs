use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use super::intent::{compose_frame, DrawIntent};
use crate::assets::AssetStore;
use crate::game::{GameConfig, GameState, Position};

/// Rasterizes the engine's draw intents into the terminal
pub struct Renderer {
    skin: Color,
}

impl Renderer {
    pub fn new(skin: Color) -> Self {
        Self { skin }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        config: &GameConfig,
        assets: &AssetStore,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(state);
        frame.render_widget(stats, chunks[0]);

        // Center the board horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        if state.game_over {
            let game_over = self.render_game_over(game_area, state);
            frame.render_widget(game_over, game_area);
        } else {
            let board = self.render_board(state, config, assets);
            frame.render_widget(board, game_area);
        }

        let controls = self.render_controls(state);
        frame.render_widget(controls, chunks[2]);
    }

    /// Loading screen with the asset progress gauge
    pub fn render_loading(&self, frame: &mut Frame, percent: f64) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Length(3),
                Constraint::Percentage(45),
            ])
            .split(frame.area());

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Loading game "),
            )
            .gauge_style(Style::default().fg(Color::Green))
            .ratio((percent / 100.0).clamp(0.0, 1.0));
        frame.render_widget(gauge, chunks[1]);
    }

    fn render_board(
        &self,
        state: &GameState,
        config: &GameConfig,
        assets: &AssetStore,
    ) -> Paragraph<'static> {
        let cols = (config.board_width / config.cell_size) as usize;
        let rows = (config.board_height / config.cell_size) as usize;
        let background = Span::styled(". ", Style::default().fg(Color::DarkGray));
        let mut cells = vec![vec![background.clone(); cols]; rows];

        for intent in compose_frame(state, config, self.skin) {
            match intent {
                DrawIntent::Clear => {
                    cells = vec![vec![background.clone(); cols]; rows];
                }
                DrawIntent::FillCell { pos, color, .. } => {
                    put_cell(&mut cells, pos, config, "■ ".to_string(), color);
                }
                DrawIntent::Sprite { key, pos, .. } => {
                    // An unusable sprite degrades to the fallback glyph
                    // without interrupting the frame.
                    let sprite = assets.image(key);
                    let (symbol, color) = match sprite.symbol.chars().next() {
                        Some(symbol) => (symbol, sprite.color),
                        None => {
                            let fallback = assets.fallback();
                            (
                                fallback.symbol.chars().next().unwrap_or('■'),
                                fallback.color,
                            )
                        }
                    };
                    put_cell(&mut cells, pos, config, format!("{symbol} "), color);
                }
            }
        }

        let lines: Vec<Line> = cells.into_iter().map(Line::from).collect();
        let title = if state.paused {
            " Serpent (paused) "
        } else {
            " Serpent "
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState) -> Paragraph<'static> {
        let mut spans = vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score().to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.high_score().to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Lives: ", Style::default().fg(Color::Yellow)),
            Span::styled(state.lives().to_string(), Style::default().fg(Color::White)),
        ];

        if state.has_shield || state.double_points {
            spans.push(Span::raw("    "));
        }
        if state.has_shield {
            spans.push(Span::styled("[shield]", Style::default().fg(Color::Cyan)));
        }
        if state.double_points {
            spans.push(Span::styled("[x2]", Style::default().fg(Color::Magenta)));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, _area: Rect, state: &GameState) -> Paragraph<'static> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score().to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to reset or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, state: &GameState) -> Paragraph<'static> {
        let hint = if !state.running && !state.game_over {
            Span::styled(
                "Enter to start | ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("")
        };

        let text = vec![Line::from(vec![
            hint,
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" to pause | "),
            Span::styled("R", Style::default().fg(Color::Yellow)),
            Span::raw(" to reset | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

fn put_cell(
    cells: &mut [Vec<Span<'static>>],
    pos: Position,
    config: &GameConfig,
    symbol: String,
    color: Color,
) {
    let col = (pos.x / config.cell_size) as usize;
    let row = (pos.y / config.cell_size) as usize;
    if let Some(cell) = cells.get_mut(row).and_then(|line| line.get_mut(col)) {
        *cell = Span::styled(symbol, Style::default().fg(color));
    }
}
