//! Gravity
//!
//! Falling, rolling, impact, magic-wall conversion and slime seepage for
//! fallable elements (boulders and diamonds).
//!
//! Every handler returns where the element ended up. A moved element is
//! always written through `Grid::set`, which stamps its new cell so the
//! scan does not visit it again this tick.

use tracing::debug;

use crate::core::direction::{Direction, Pos};
use crate::game::config::MagicWallDrain;
use crate::game::element::ElementKind;
use crate::game::events::SoundCue;
use crate::game::explosion::explode;
use crate::game::grid::Cell;
use crate::game::state::{CaveState, MagicWallStatus};

/// Scan handler for a fallable element at `pos`.
pub fn update_fallable(state: &mut CaveState, pos: Pos) -> Pos {
    if state.grid.get(pos).falling {
        update_falling(state, pos)
    } else {
        update_resting(state, pos)
    }
}

/// Element at rest: start falling, or roll off something round.
fn update_resting(state: &mut CaveState, pos: Pos) -> Pos {
    let below = state.grid.kind(pos.step(Direction::Down));
    match below {
        ElementKind::Empty => fall_to(state, pos, Direction::Down),
        ElementKind::Slime => {
            if let Some(cell) = state.grid.cell_mut(pos) {
                cell.falling = true;
            }
            pos
        }
        kind if kind.rules().rounded => try_roll(state, pos).unwrap_or(pos),
        _ => pos,
    }
}

/// Element in free fall.
fn update_falling(state: &mut CaveState, pos: Pos) -> Pos {
    let below_pos = pos.step(Direction::Down);
    let below = state.grid.kind(below_pos);

    match below {
        ElementKind::Empty => fall_to(state, pos, Direction::Down),
        ElementKind::Voodoo if state.grid.kind(pos) == ElementKind::Diamond => {
            state.grid.clear(pos, state.tick);
            state.collect_diamond();
            pos
        }
        kind if kind.rules().crushable => {
            explode(state, below_pos);
            pos
        }
        ElementKind::MagicWall => enter_magic_wall(state, pos),
        ElementKind::Slime => seep_through_slime(state, pos),
        kind if kind.rules().rounded => match try_roll(state, pos) {
            Some(to) => to,
            None => land(state, pos),
        },
        _ => land(state, pos),
    }
}

/// Move one step and keep falling.
fn fall_to(state: &mut CaveState, pos: Pos, dir: Direction) -> Pos {
    let to = state.grid.move_cell(pos, dir, state.tick);
    if let Some(cell) = state.grid.cell_mut(to) {
        cell.falling = true;
    }
    to
}

/// Roll sideways if both the side cell and the cell below it are empty.
///
/// Sides are tried in the engine's roll preference order.
fn try_roll(state: &mut CaveState, pos: Pos) -> Option<Pos> {
    for side in state.engine.roll_preference.order() {
        let beside = pos.step(side);
        if state.grid.kind(beside) == ElementKind::Empty
            && state.grid.kind(beside.step(Direction::Down)) == ElementKind::Empty
        {
            return Some(fall_to(state, pos, side));
        }
    }
    None
}

/// Stop falling where it is.
fn land(state: &mut CaveState, pos: Pos) -> Pos {
    let Some(cell) = state.grid.cell_mut(pos) else {
        return pos;
    };
    cell.falling = false;
    let cue = match cell.kind {
        ElementKind::Diamond => SoundCue::DiamondFall,
        _ => SoundCue::BoulderFall,
    };
    state.sound(cue);
    pos
}

/// Falling element lands on a magic wall.
///
/// Active: converted and dropped below the wall (absorbed when the exit is
/// blocked). Expired: passes through unchanged, or rests on top.
fn enter_magic_wall(state: &mut CaveState, pos: Pos) -> Pos {
    let tick = state.tick;
    let exit = pos.step(Direction::Down).step(Direction::Down);
    let exit_free = state.grid.kind(exit) == ElementKind::Empty;
    let cell = state.grid.get(pos);

    if state.magic_wall.activate() {
        state.sound(SoundCue::MagicWallActive);
        debug!("Magic wall activated at tick {}", tick);
    }

    match state.magic_wall.status {
        MagicWallStatus::Active => {
            state.grid.clear(pos, tick);
            if !exit_free {
                return pos;
            }
            let output = cell.kind.rules().magic_output.unwrap_or(cell.kind);
            state.grid.set(exit, Cell::falling(output), tick);

            if state.engine.magic_wall_drain == MagicWallDrain::PerConversion && state.magic_wall.spend() {
                state.sound(SoundCue::MagicWallStop);
                debug!("Magic wall expired at tick {}", tick);
            }
            exit
        }
        _ if exit_free => {
            state.grid.clear(pos, tick);
            state.grid.set(exit, Cell::falling(cell.kind), tick);
            exit
        }
        _ => land(state, pos),
    }
}

/// Falling element on slime: seeps through at random when there is room.
fn seep_through_slime(state: &mut CaveState, pos: Pos) -> Pos {
    let tick = state.tick;
    let permeable = state
        .rng
        .chance(u32::from(state.config.slime_permeability_pct), 100);
    let exit = pos.step(Direction::Down).step(Direction::Down);

    if !permeable || state.grid.kind(exit) != ElementKind::Empty {
        return pos;
    }

    let kind = state.grid.kind(pos);
    state.grid.clear(pos, tick);
    state.grid.set(exit, Cell::falling(kind), tick);
    state.sound(SoundCue::Slime);
    exit
}
