//! Monsters and Growing Walls
//!
//! Fireflies hug walls turning left, butterflies turning right. Both blow
//! up on contact with the player, amoeba or the voodoo doll; touching the
//! doll dooms the player too.

use crate::core::direction::{Direction, Pos};
use crate::game::element::ElementKind;
use crate::game::events::SoundCue;
use crate::game::explosion::explode;
use crate::game::grid::Cell;
use crate::game::state::CaveState;

/// Which way a monster turns first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    /// Counter-clockwise (firefly)
    Left,
    /// Clockwise (butterfly)
    Right,
}

impl Turn {
    fn apply(self, dir: Direction) -> Direction {
        match self {
            Turn::Left => dir.rotate_left(),
            Turn::Right => dir.rotate_right(),
        }
    }

    fn opposite(self) -> Turn {
        match self {
            Turn::Left => Turn::Right,
            Turn::Right => Turn::Left,
        }
    }
}

/// Scan handler for a firefly or butterfly at `pos`.
pub fn update_monster(state: &mut CaveState, pos: Pos, turn: Turn) -> Pos {
    let touches_victim = Direction::CARDINAL.iter().any(|dir| {
        matches!(
            state.grid.kind(pos.step(*dir)),
            ElementKind::Player | ElementKind::Amoeba
        )
    });
    if touches_victim {
        explode(state, pos);
        return pos;
    }

    let touches_voodoo = Direction::CARDINAL
        .iter()
        .any(|dir| state.grid.kind(pos.step(*dir)) == ElementKind::Voodoo);
    if touches_voodoo {
        explode(state, pos);
        state.voodoo_struck = true;
        return pos;
    }

    let facing = state.grid.get(pos).direction;
    let turned = turn.apply(facing);

    if state.grid.kind(pos.step(turned)) == ElementKind::Empty {
        let to = state.grid.move_cell(pos, turned, state.tick);
        if let Some(cell) = state.grid.cell_mut(to) {
            cell.direction = turned;
        }
        to
    } else if state.grid.kind(pos.step(facing)) == ElementKind::Empty {
        state.grid.move_cell(pos, facing, state.tick)
    } else {
        if let Some(cell) = state.grid.cell_mut(pos) {
            cell.direction = turn.opposite().apply(facing);
        }
        pos
    }
}

/// Scan handler for a growing wall at `pos`.
///
/// Extends into every empty cell along its axis.
pub fn update_growing_wall(state: &mut CaveState, pos: Pos) -> Pos {
    let kind = state.grid.kind(pos);
    let axis = match kind {
        ElementKind::HorizontalGrowingWall => [Direction::Left, Direction::Right],
        _ => [Direction::Up, Direction::Down],
    };

    for dir in axis {
        let target = pos.step(dir);
        if state.grid.kind(target) == ElementKind::Empty {
            state.grid.set(target, Cell::new(kind), state.tick);
            state.sound(SoundCue::GrowingWall);
        }
    }
    pos
}
