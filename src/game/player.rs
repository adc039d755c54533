//! Player Controller
//!
//! Resolves one input per tick, after the scan has moved everything else.

use crate::core::direction::Pos;
use crate::game::element::ElementKind;
use crate::game::events::SoundCue;
use crate::game::explosion::explode;
use crate::game::input::{Modifier, PlayerInput};
use crate::game::state::{CavePhase, CaveState};

/// What the player's input did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    /// No input, no player, or the cave is not being played
    Idle,
    /// Target could not be entered
    Blocked,
    /// Stepped into open space or dirt
    Moved,
    /// Cleared dirt without moving
    Dug,
    /// Collected a diamond (moved unless grabbing)
    Collected,
    /// Pushed a boulder and followed it
    Pushed,
    /// Walked into a monster
    Killed,
}

/// Scan handler for the player at `pos`.
///
/// Records the position for input resolution, or blows the player up if a
/// monster has reached the voodoo doll.
pub fn update_player(state: &mut CaveState, pos: Pos) -> Pos {
    if state.voodoo_struck && state.phase == CavePhase::Playing {
        explode(state, pos);
    } else {
        state.player_pos = Some(pos);
    }
    pos
}

/// Apply `input` to the player.
pub fn resolve_input(state: &mut CaveState, input: PlayerInput) -> PlayerAction {
    if state.phase != CavePhase::Playing || input.is_idle() {
        return PlayerAction::Idle;
    }
    let Some(pos) = state.player_pos else {
        return PlayerAction::Idle;
    };
    if state.grid.kind(pos) != ElementKind::Player {
        return PlayerAction::Idle;
    }

    let dir = input.direction;
    let grab = input.modifier == Modifier::Grab;
    let target = pos.step(dir);
    let cell = state.grid.get(target);
    let rules = cell.kind.rules();

    if cell.kind.is_monster() {
        explode(state, pos);
        return PlayerAction::Killed;
    }

    if cell.kind == ElementKind::Empty {
        if grab {
            return PlayerAction::Blocked;
        }
        step_to(state, pos, target);
        state.sound(SoundCue::WalkEmpty);
        return PlayerAction::Moved;
    }

    if rules.diggable {
        state.sound(SoundCue::WalkDirt);
        if grab {
            state.grid.clear(target, state.tick);
            return PlayerAction::Dug;
        }
        step_to(state, pos, target);
        return PlayerAction::Moved;
    }

    if rules.collectable {
        if grab {
            state.grid.clear(target, state.tick);
        } else {
            step_to(state, pos, target);
        }
        state.collect_diamond();
        return PlayerAction::Collected;
    }

    if rules.pushable && !grab && dir.is_horizontal() && !cell.falling {
        let beyond = target.step(dir);
        if state.grid.kind(beyond) == ElementKind::Empty {
            state.grid.move_cell(target, dir, state.tick);
            step_to(state, pos, target);
            state.sound(SoundCue::BoulderPush);
            return PlayerAction::Pushed;
        }
    }

    PlayerAction::Blocked
}

fn step_to(state: &mut CaveState, from: Pos, to: Pos) {
    let tick = state.tick;
    let player = state.grid.get(from);
    state.grid.set(to, player, tick);
    state.grid.clear(from, tick);
    state.player_pos = Some(to);
}
