//! Amoeba Growth
//!
//! All amoeba cells share one `AmoebaState`. The scan counts the cells and
//! rolls growth per cell; the post-pass decides whether the amoeba settles.
//! A settled amoeba is converted cell by cell on the following scan.

use tracing::debug;

use crate::core::direction::{Direction, Pos};
use crate::game::element::ElementKind;
use crate::game::events::SoundCue;
use crate::game::grid::Cell;
use crate::game::state::CaveState;

/// Scan handler for an amoeba cell at `pos`.
pub fn update_amoeba(state: &mut CaveState, pos: Pos) -> Pos {
    let tick = state.tick;

    if let Some(kind) = state.amoeba.settled {
        state.grid.set(pos, Cell::new(kind), tick);
        return pos;
    }

    let has_room = state.amoeba_has_room(pos);
    if state.amoeba.record_cell(has_room) {
        state.sound(SoundCue::AmoebaStart);
    }

    let odds = if state.amoeba.is_slow() {
        state.engine.amoeba_slow_odds
    } else {
        state.engine.amoeba_fast_odds
    };
    let grow = state.rng.chance(odds.numerator, odds.denominator);
    let dir = state
        .rng
        .choose(&Direction::CARDINAL)
        .unwrap_or(Direction::None);

    if grow {
        let target = pos.step(dir);
        if matches!(state.grid.kind(target), ElementKind::Empty | ElementKind::Dirt) {
            state.grid.set(target, Cell::new(ElementKind::Amoeba), tick);
        }
    }
    pos
}

/// Post-pass: close the amoeba scan and settle it if needed.
pub fn finish_scan(state: &mut CaveState) {
    let limit = state.engine.amoeba_enclosed_ticks;
    if let Some(kind) = state.amoeba.finish_scan(limit) {
        state.sound(SoundCue::AmoebaStop);
        debug!(
            "Amoeba of {} cells settles into {:?} at tick {}",
            state.amoeba.size, kind, state.tick
        );
    }
}
