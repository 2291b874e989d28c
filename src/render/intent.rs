//! Frame composition as draw intents
//!
//! The engine side of the render-surface contract: each frame is a clear,
//! a filled square per snake cell in the skin color, and an
//! image-or-fallback draw per board entity. Rasterization happens in the
//! renderer; substituting for an unusable sprite is the renderer's job.

use ratatui::style::Color;

use crate::game::{GameConfig, GameState, Position};

pub const FOOD_SPRITE: &str = "food";
pub const OBSTACLE_SPRITE: &str = "obstacle";

/// One drawing operation on the surface
#[derive(Debug, Clone, PartialEq)]
pub enum DrawIntent {
    /// Wipe the surface
    Clear,
    /// Filled square, used for snake cells
    FillCell {
        pos: Position,
        size: i32,
        color: Color,
    },
    /// Image draw; the surface substitutes the fallback when the image
    /// is unusable
    Sprite {
        key: &'static str,
        pos: Position,
        size: i32,
    },
}

/// Compose the draw intents for one frame of the current state
pub fn compose_frame(state: &GameState, config: &GameConfig, skin: Color) -> Vec<DrawIntent> {
    let mut intents = vec![DrawIntent::Clear];

    for &cell in &state.snake.body {
        intents.push(DrawIntent::FillCell {
            pos: cell,
            size: config.cell_size - 2,
            color: skin,
        });
    }

    if let Some(food) = state.food {
        intents.push(DrawIntent::Sprite {
            key: FOOD_SPRITE,
            pos: food,
            size: config.cell_size,
        });
    }

    if let Some(power_up) = state.power_up {
        intents.push(DrawIntent::Sprite {
            key: power_up.kind.sprite_key(),
            pos: power_up.pos,
            size: config.power_up_size,
        });
    }

    for &obstacle in &state.obstacles {
        intents.push(DrawIntent::Sprite {
            key: OBSTACLE_SPRITE,
            pos: obstacle,
            size: config.obstacle_size,
        });
    }

    intents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{PowerUp, PowerUpKind};

    #[test]
    fn test_frame_starts_with_clear() {
        let config = GameConfig::default();
        let state = GameState::new(&config, 0);
        let intents = compose_frame(&state, &config, Color::Green);

        assert_eq!(intents[0], DrawIntent::Clear);
        // Fresh state: one snake cell, no food or entities yet.
        assert_eq!(intents.len(), 2);
        assert!(matches!(
            intents[1],
            DrawIntent::FillCell {
                color: Color::Green,
                ..
            }
        ));
    }

    #[test]
    fn test_frame_covers_all_entities() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 0);
        state.food = Some(Position::new(100, 100));
        state.power_up = Some(PowerUp {
            pos: Position::new(200, 200),
            kind: PowerUpKind::DoublePoints,
        });
        state.obstacles = vec![Position::new(300, 300), Position::new(320, 300)];

        let intents = compose_frame(&state, &config, Color::Cyan);

        // Clear + snake cell + food + power-up + two obstacles.
        assert_eq!(intents.len(), 6);
        assert!(intents.contains(&DrawIntent::Sprite {
            key: FOOD_SPRITE,
            pos: Position::new(100, 100),
            size: config.cell_size,
        }));
        assert!(intents.contains(&DrawIntent::Sprite {
            key: "double_points",
            pos: Position::new(200, 200),
            size: config.power_up_size,
        }));
        assert_eq!(
            intents
                .iter()
                .filter(|intent| matches!(intent, DrawIntent::Sprite { key, .. } if *key == OBSTACLE_SPRITE))
                .count(),
            2
        );
    }
}
