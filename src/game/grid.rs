//! Spatial rules for the board
//!
//! Pure functions over grid positions: toroidal movement, the proximity
//! test shared by every pickup/collision check, and safe spawn placement.

use rand::Rng;

use super::action::Direction;
use super::state::Position;

/// Advance a head one step, wrapping at the board edges.
///
/// A coordinate leaving `[0, bound)` re-enters from the opposite edge;
/// the wrap is movement, not a collision.
pub fn step(head: Position, direction: Direction, bounds: (i32, i32), cell_size: i32) -> Position {
    let (dx, dy) = direction.delta(cell_size);
    let mut next = head.moved_by(dx, dy);

    if next.x < 0 {
        next.x = bounds.0 - cell_size;
    } else if next.x >= bounds.0 {
        next.x = 0;
    }
    if next.y < 0 {
        next.y = bounds.1 - cell_size;
    } else if next.y >= bounds.1 {
        next.y = 0;
    }

    next
}

/// Axis-wise proximity test: both deltas strictly below the threshold.
///
/// This is the uniform collision test for food, power-ups, and obstacles,
/// parameterized by the entity's size.
pub fn near(a: Position, b: Position, threshold: i32) -> bool {
    (a.x - b.x).abs() < threshold && (a.y - b.y).abs() < threshold
}

/// Whether a head coincides exactly with any non-head body cell.
pub fn self_collides(head: Position, body: &[Position]) -> bool {
    body.contains(&head)
}

/// A uniformly random grid-aligned cell on the board.
pub fn random_cell<R: Rng>(rng: &mut R, bounds: (i32, i32), cell_size: i32) -> Position {
    let cols = bounds.0 / cell_size;
    let rows = bounds.1 / cell_size;
    Position::new(
        rng.gen_range(0..cols) * cell_size,
        rng.gen_range(0..rows) * cell_size,
    )
}

/// Sample random cells until one clears `near` against every exclusion.
///
/// Termination relies on the board keeping free cells; a board saturated
/// by exclusion zones is an out-of-scope precondition.
pub fn find_safe_spawn<R: Rng>(
    rng: &mut R,
    bounds: (i32, i32),
    cell_size: i32,
    exclusions: &[Position],
    min_separation: i32,
) -> Position {
    loop {
        let candidate = random_cell(rng, bounds, cell_size);
        if exclusions
            .iter()
            .all(|&zone| !near(candidate, zone, min_separation))
        {
            return candidate;
        }
    }
}
