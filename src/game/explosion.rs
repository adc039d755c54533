//! Explosions
//!
//! An explosion replaces its centre and every consumable cell of the
//! 8-neighbourhood with fragments. Fragments count down in the post-pass
//! and then resolve to empty space or diamonds. A voodoo doll caught in a
//! blast turns straight into a gravestone.

use crate::core::direction::Pos;
use crate::game::element::ElementKind;
use crate::game::events::SoundCue;
use crate::game::grid::Cell;
use crate::game::state::CaveState;

/// Blow up the element at `centre`.
///
/// The centre's own rules decide the fragment flavour (butterflies leave
/// diamonds). Kills the player if it is caught in the blast.
pub fn explode(state: &mut CaveState, centre: Pos) {
    let tick = state.tick;
    let fragment = state.grid.kind(centre).rules().blast.fragment();
    let stages = state.engine.explosion_stages;
    let mut player_hit = false;
    let mut voodoo_hit = false;

    let targets = std::iter::once(centre).chain(
        Pos::NEIGHBOURS_8
            .iter()
            .map(|(dx, dy)| centre.offset(*dx, *dy)),
    );

    for (i, pos) in targets.enumerate() {
        let kind = state.grid.kind(pos);
        // The centre always goes, its neighbours only when consumable
        if i > 0 && !kind.rules().consumable {
            continue;
        }
        if !state.grid.in_bounds(pos) {
            continue;
        }
        match kind {
            ElementKind::Voodoo => {
                voodoo_hit = true;
                state.grid.set(pos, Cell::new(ElementKind::Gravestone), tick);
                continue;
            }
            ElementKind::Player => player_hit = true,
            _ => {}
        }
        let mut cell = Cell::new(fragment);
        cell.sub_timer = stages;
        state.grid.set(pos, cell, tick);
    }

    state.sound(if voodoo_hit {
        SoundCue::VoodooExplosion
    } else {
        SoundCue::Explosion
    });
    if player_hit {
        state.player_died();
    }
}

/// Count fragments down and resolve the finished ones.
///
/// Fragments created during this tick are left alone so every explosion
/// lasts the configured number of ticks.
pub fn age_fragments(state: &mut CaveState) {
    let tick = state.tick;
    let fragments: Vec<Pos> = state
        .grid
        .positions()
        .filter(|pos| state.grid.kind(*pos).is_fragment() && !state.grid.touched_on(*pos, tick))
        .collect();

    for pos in fragments {
        let Some(cell) = state.grid.cell_mut(pos) else {
            continue;
        };
        cell.sub_timer = cell.sub_timer.saturating_sub(1);
        if cell.sub_timer > 0 {
            continue;
        }
        let resolved = match cell.kind {
            ElementKind::DiamondBirth => Cell::new(ElementKind::Diamond),
            _ => Cell::default(),
        };
        state.grid.set(pos, resolved, tick);
    }
}
