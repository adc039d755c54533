//! Cave Tick
//!
//! The per-frame update. Given the same cave and the same inputs it always
//! produces the same grid, events and state hash.
//!
//! Order within a tick:
//! 1. Scan every cell row-major, top to bottom, left to right
//! 2. Resolve the player's input
//! 3. Post-pass: amoeba verdict, magic-wall drain, fragment ageing, animation
//! 4. Timer
//! 5. Drain events

use serde::{Serialize, Deserialize};
use tracing::debug;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::game::amoeba;
use crate::game::config::{CaveDefinition, ConfigError, EngineConfig, MagicWallDrain};
use crate::game::creatures::{self, Turn};
use crate::game::element::{ElementKind, ScanBehavior};
use crate::game::events::{Event, FailureCause, SoundCue};
use crate::game::explosion;
use crate::game::input::{InputRecording, PlayerInput};
use crate::game::physics;
use crate::game::player;
use crate::game::state::{CavePhase, CaveState};
use crate::core::hash::StateHash;

/// Result of a tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickResult {
    /// Tick number that ran (unchanged when the cave is frozen)
    pub tick: u32,
    /// Events generated this tick, in order
    pub events: Vec<Event>,
    /// Cave completed or failed
    pub level_ended: bool,
}

/// Run one simulation tick.
///
/// A completed cave is frozen and returns an empty result. A failed cave
/// keeps simulating so explosions play out, but input and the timer stop.
pub fn advance_one_tick(state: &mut CaveState, input: PlayerInput) -> TickResult {
    if state.phase == CavePhase::Completed {
        return TickResult {
            tick: state.tick,
            events: Vec::new(),
            level_ended: true,
        };
    }

    // 0. Advance tick counter
    state.tick += 1;

    // 1. Element state machines
    scan_cells(state);

    // 2. Player
    let _action = player::resolve_input(state, input);
    #[cfg(feature = "debug-tracing")]
    trace!("tick {} player {:?} -> {:?}", state.tick, input, _action);

    // 3. Post-pass
    post_pass(state);

    // 4. Timer
    update_timer(state);

    TickResult {
        tick: state.tick,
        events: state.take_events(),
        level_ended: state.is_ended(),
    }
}

/// Visit every cell once, in scan order.
///
/// Cells written earlier in this tick are skipped, so an element that moved
/// down or right is not processed twice.
fn scan_cells(state: &mut CaveState) {
    let tick = state.tick;
    state.amoeba.begin_scan();
    state.player_pos = None;

    let cell_count = state.grid.cells().len();
    for index in 0..cell_count {
        let pos = state.grid.pos_of(index);
        if state.grid.touched_on(pos, tick) {
            continue;
        }

        let end = match state.grid.kind(pos).rules().scan {
            ScanBehavior::Inert => pos,
            ScanBehavior::Fallable => physics::update_fallable(state, pos),
            ScanBehavior::Firefly => creatures::update_monster(state, pos, Turn::Left),
            ScanBehavior::Butterfly => creatures::update_monster(state, pos, Turn::Right),
            ScanBehavior::Amoeba => amoeba::update_amoeba(state, pos),
            ScanBehavior::Player => player::update_player(state, pos),
            ScanBehavior::GrowHorizontal | ScanBehavior::GrowVertical => {
                creatures::update_growing_wall(state, pos)
            }
        };

        debug_assert!(
            end == pos || state.grid.touched_on(end, tick),
            "element moved from {:?} to {:?} without being stamped",
            pos,
            end
        );
    }

    #[cfg(feature = "debug-tracing")]
    trace!("tick {} scan done, amoeba cells {}", tick, state.amoeba.size);
}

/// Cave-wide effects after movement.
fn post_pass(state: &mut CaveState) {
    amoeba::finish_scan(state);

    if state.engine.magic_wall_drain == MagicWallDrain::PerTick && state.magic_wall.spend() {
        state.sound(SoundCue::MagicWallStop);
        debug!("Magic wall expired at tick {}", state.tick);
    }

    explosion::age_fragments(state);
    state.grid.advance_animation();
}

/// Count time down; fail the cave and blow up the player at zero.
fn update_timer(state: &mut CaveState) {
    if !state.timed || state.phase != CavePhase::Playing {
        return;
    }

    let before = state.seconds_remaining();
    state.time_remaining = state.time_remaining.saturating_sub(1);
    let after = state.seconds_remaining();

    if let Some(secs) = after {
        if before != after && (1..=9).contains(&secs) {
            state.sound(SoundCue::Timeout(secs as u8));
        }
    }

    if state.time_remaining == 0 {
        state.fail(FailureCause::TimeUp);
        if let Some(pos) = state.player_pos {
            if state.grid.kind(pos) == ElementKind::Player {
                explosion::explode(state, pos);
            }
        }
    }
}

// =============================================================================
// REPLAY
// =============================================================================

/// Outcome of a replay.
#[derive(Clone, Debug)]
pub struct ReplayOutcome {
    /// State after the last tick
    pub state: CaveState,
    /// Every event, in order
    pub events: Vec<Event>,
    /// Hash of the final state
    pub final_hash: StateHash,
}

/// Replay a cave from recorded inputs with default engine tunables.
pub fn replay_cave(
    definition: &CaveDefinition,
    recording: &InputRecording,
    max_ticks: u32,
) -> Result<ReplayOutcome, ConfigError> {
    replay_cave_with(definition, EngineConfig::default(), recording, max_ticks)
}

/// Replay a cave from recorded inputs.
///
/// Runs until `max_ticks` ticks have passed or the level ends. Ticks past
/// the end of the recording get no input.
pub fn replay_cave_with(
    definition: &CaveDefinition,
    engine: EngineConfig,
    recording: &InputRecording,
    max_ticks: u32,
) -> Result<ReplayOutcome, ConfigError> {
    let mut state = CaveState::new(definition, engine)?;
    let mut events = Vec::new();

    for _ in 0..max_ticks {
        let next = state.tick + 1;
        let input = if next > recording.end_tick {
            PlayerInput::IDLE
        } else {
            recording.input_at(next)
        };

        let result = advance_one_tick(&mut state, input);
        events.extend(result.events);

        if result.level_ended {
            break;
        }
    }

    let final_hash = state.compute_hash();
    Ok(ReplayOutcome {
        state,
        events,
        final_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::direction::{Direction, Pos};
    use crate::game::config::CaveConfig;
    use crate::game::events::EventData;
    use crate::game::state::MagicWallStatus;

    fn cave_with(rows: &[&str], config: CaveConfig) -> CaveState {
        let def = CaveDefinition::from_rows("test", rows, config).unwrap();
        CaveState::from_definition(&def).unwrap()
    }

    fn cave(rows: &[&str]) -> CaveState {
        cave_with(rows, CaveConfig { time_limit_secs: 0, ..CaveConfig::default() })
    }

    fn data(result: &TickResult) -> Vec<EventData> {
        result.events.iter().map(|e| e.data.clone()).collect()
    }

    #[test]
    fn test_boulder_falls_one_row_per_tick() {
        let mut state = cave(&["  r  ", "     ", "     ", "     ", "     "]);

        advance_one_tick(&mut state, PlayerInput::IDLE);
        let cell = state.grid.get(Pos::new(2, 1));
        assert_eq!(cell.kind, ElementKind::Boulder);
        assert!(cell.falling);

        for _ in 2..=4 {
            advance_one_tick(&mut state, PlayerInput::IDLE);
        }
        assert!(state.grid.get(Pos::new(2, 4)).falling);

        advance_one_tick(&mut state, PlayerInput::IDLE);
        let cell = state.grid.get(Pos::new(2, 4));
        assert_eq!(cell.kind, ElementKind::Boulder);
        assert!(!cell.falling);
        assert_eq!(state.grid.count(ElementKind::Boulder), 1);
    }

    #[test]
    fn test_stacked_boulders_separate() {
        let mut state = cave(&["r", "r", " ", " "]);

        // Upper boulder is scanned first and is still supported
        advance_one_tick(&mut state, PlayerInput::IDLE);
        assert_eq!(state.grid.kind(Pos::new(0, 0)), ElementKind::Boulder);
        assert_eq!(state.grid.kind(Pos::new(0, 1)), ElementKind::Empty);
        assert_eq!(state.grid.kind(Pos::new(0, 2)), ElementKind::Boulder);

        advance_one_tick(&mut state, PlayerInput::IDLE);
        assert_eq!(state.grid.kind(Pos::new(0, 1)), ElementKind::Boulder);
        assert_eq!(state.grid.kind(Pos::new(0, 3)), ElementKind::Boulder);
    }

    #[test]
    fn test_falling_boulder_kills_player() {
        let mut state = cave(&["r", " ", "P"]);
        let first = advance_one_tick(&mut state, PlayerInput::IDLE);
        assert!(data(&first).is_empty());

        let second = advance_one_tick(&mut state, PlayerInput::IDLE);
        let events = data(&second);
        let life_lost = events.iter().position(|e| *e == EventData::LifeLost);
        let failed = events
            .iter()
            .position(|e| *e == EventData::LevelFailed { cause: FailureCause::Killed });
        assert!(life_lost.is_some());
        assert!(life_lost < failed);
        assert!(second.level_ended);
        assert_eq!(state.phase, CavePhase::Failed);
    }

    #[test]
    fn test_push_scenario() {
        let mut state = cave(&["WWWWW", "WPr W", "WWWWW"]);
        advance_one_tick(&mut state, PlayerInput::moving(Direction::Right));

        assert_eq!(state.grid.kind(Pos::new(2, 1)), ElementKind::Player);
        assert_eq!(state.grid.kind(Pos::new(3, 1)), ElementKind::Boulder);
    }

    #[test]
    fn test_fifth_diamond_completes_cave() {
        let config = CaveConfig { diamonds_required: 5, time_limit_secs: 100, ..CaveConfig::default() };
        let mut state = cave_with(&["Pddddd"], config);

        for _ in 0..4 {
            advance_one_tick(&mut state, PlayerInput::moving(Direction::Right));
        }
        assert_eq!(state.diamonds_collected, 4);

        let result = advance_one_tick(&mut state, PlayerInput::moving(Direction::Right));
        let events = data(&result);
        let delta = events.iter().position(|e| matches!(e, EventData::ScoreDelta { .. }));
        let complete = events.iter().position(|e| *e == EventData::LevelComplete);
        assert!(delta.is_some() && delta < complete);
        assert!(result.level_ended);

        // Timer stopped, cave frozen
        let time = state.time_remaining;
        let frozen = advance_one_tick(&mut state, PlayerInput::moving(Direction::Right));
        assert!(frozen.events.is_empty());
        assert!(frozen.level_ended);
        assert_eq!(state.time_remaining, time);
        assert_eq!(state.tick, 5);
    }

    #[test]
    fn test_time_up_fails_and_kills_player() {
        let config = CaveConfig { time_limit_secs: 1, ..CaveConfig::default() };
        let mut state = cave_with(&["P "], config);

        let mut events = Vec::new();
        for _ in 0..7 {
            events.extend(data(&advance_one_tick(&mut state, PlayerInput::IDLE)));
        }

        assert_eq!(state.phase, CavePhase::Failed);
        let failed = events
            .iter()
            .filter(|e| matches!(e, EventData::LevelFailed { .. }))
            .collect::<Vec<_>>();
        assert_eq!(failed, vec![&EventData::LevelFailed { cause: FailureCause::TimeUp }]);
        assert!(events.contains(&EventData::LifeLost));
        assert_eq!(state.grid.count(ElementKind::Player), 0);
    }

    #[test]
    fn test_timeout_cues_count_down() {
        let config = CaveConfig { time_limit_secs: 3, ..CaveConfig::default() };
        let mut state = cave_with(&["P"], config);

        let mut cues = Vec::new();
        for _ in 0..21 {
            let result = advance_one_tick(&mut state, PlayerInput::IDLE);
            cues.extend(result.events.iter().filter_map(|e| match e.cue() {
                Some(SoundCue::Timeout(n)) => Some(n),
                _ => None,
            }));
        }
        assert_eq!(cues, vec![2, 1]);
    }

    #[test]
    fn test_failed_cave_keeps_simulating() {
        let mut state = cave(&["Pq", "r ", "  "]);
        // Firefly next to the player explodes both on tick 1
        advance_one_tick(&mut state, PlayerInput::IDLE);
        assert_eq!(state.phase, CavePhase::Failed);

        for _ in 0..5 {
            advance_one_tick(&mut state, PlayerInput::moving(Direction::Right));
        }
        assert_eq!(state.grid.count(ElementKind::Explosion), 0);
        assert_eq!(state.tick, 6);
    }

    #[test]
    fn test_magic_wall_scenario() {
        let mut state = cave(&["r", " ", "M", " ", " "]);
        advance_one_tick(&mut state, PlayerInput::IDLE);
        advance_one_tick(&mut state, PlayerInput::IDLE);

        assert_eq!(state.grid.kind(Pos::new(0, 3)), ElementKind::Diamond);
        assert!(state.magic_wall.is_active());
        assert_eq!(state.grid.count(ElementKind::Boulder), 0);
    }

    fn cave_with_engine(rows: &[&str], config: CaveConfig, engine: EngineConfig) -> CaveState {
        let def = CaveDefinition::from_rows("test", rows, config).unwrap();
        CaveState::new(&def, engine).unwrap()
    }

    fn column(state: &CaveState) -> Vec<ElementKind> {
        (0..state.grid.height() as i32).map(|y| state.grid.kind(Pos::new(0, y))).collect()
    }

    #[test]
    fn test_magic_wall_turns_diamond_into_boulder() {
        let mut state = cave(&["d", " ", "M", " ", " "]);
        advance_one_tick(&mut state, PlayerInput::IDLE);
        advance_one_tick(&mut state, PlayerInput::IDLE);

        assert_eq!(state.grid.kind(Pos::new(0, 3)), ElementKind::Boulder);
        assert!(state.grid.get(Pos::new(0, 3)).falling);
        assert_eq!(state.grid.count(ElementKind::Diamond), 0);
    }

    #[test]
    fn test_magic_wall_spent_by_conversion_lets_next_boulder_through() {
        // One second at one tick per second: budget for a single conversion
        let config = CaveConfig { magic_wall_secs: 1, time_limit_secs: 0, ..CaveConfig::default() };
        let engine = EngineConfig { ticks_per_second: 1, ..EngineConfig::default() };
        let mut state = cave_with_engine(
            &["r", " ", "r", " ", "M", " ", " ", " ", " ", " "],
            config,
            engine,
        );
        assert_eq!(state.magic_wall.budget, 1);

        advance_one_tick(&mut state, PlayerInput::IDLE);
        let converted = advance_one_tick(&mut state, PlayerInput::IDLE);
        let cues: Vec<_> = converted.events.iter().filter_map(|e| e.cue()).collect();
        assert_eq!(cues, vec![SoundCue::MagicWallActive, SoundCue::MagicWallStop]);
        assert_eq!(state.magic_wall.status, MagicWallStatus::Expired);
        assert_eq!(state.grid.kind(Pos::new(0, 5)), ElementKind::Diamond);

        advance_one_tick(&mut state, PlayerInput::IDLE);
        advance_one_tick(&mut state, PlayerInput::IDLE);

        use ElementKind::{Boulder, Diamond, Empty, MagicWall};
        assert_eq!(
            column(&state),
            vec![Empty, Empty, Empty, Empty, MagicWall, Boulder, Empty, Diamond, Empty, Empty]
        );
    }

    #[test]
    fn test_per_tick_drain_counts_down_once_active() {
        let config = CaveConfig { magic_wall_secs: 3, time_limit_secs: 0, ..CaveConfig::default() };
        let engine = EngineConfig {
            ticks_per_second: 1,
            magic_wall_drain: MagicWallDrain::PerTick,
            ..EngineConfig::default()
        };
        let mut state = cave_with_engine(&["r", " ", "M", " ", " ", " "], config, engine);

        // Dormant walls do not drain
        advance_one_tick(&mut state, PlayerInput::IDLE);
        assert_eq!(state.magic_wall.status, MagicWallStatus::Dormant);
        assert_eq!(state.magic_wall.budget, 3);

        let mut trail = Vec::new();
        let mut stop_ticks = Vec::new();
        for _ in 0..3 {
            let result = advance_one_tick(&mut state, PlayerInput::IDLE);
            if result.events.iter().any(|e| e.cue() == Some(SoundCue::MagicWallStop)) {
                stop_ticks.push(result.tick);
            }
            trail.push((state.magic_wall.status, state.magic_wall.budget));
        }

        assert_eq!(
            trail,
            vec![
                (MagicWallStatus::Active, 2),
                (MagicWallStatus::Active, 1),
                (MagicWallStatus::Expired, 0),
            ]
        );
        assert_eq!(stop_ticks, vec![4]);
        // The conversion itself did not spend budget
        assert_eq!(state.grid.count(ElementKind::Diamond), 1);
    }

    #[test]
    fn test_voodoo_death_takes_player_next_scan() {
        // Player scanned before the firefly: dies on the following tick
        let mut state = cave(&["P    ", "     ", "  qV "]);

        let first = advance_one_tick(&mut state, PlayerInput::IDLE);
        assert!(state.voodoo_struck);
        assert!(state.player_alive);
        assert!(!data(&first).contains(&EventData::LifeLost));
        assert_eq!(state.grid.kind(Pos::new(3, 2)), ElementKind::Gravestone);

        let second = advance_one_tick(&mut state, PlayerInput::moving(Direction::Right));
        assert_eq!(state.grid.kind(Pos::new(0, 0)), ElementKind::Explosion);
        assert!(data(&second).contains(&EventData::LifeLost));
        assert!(data(&second).contains(&EventData::LevelFailed { cause: FailureCause::Killed }));
        assert_eq!(state.phase, CavePhase::Failed);
    }

    #[test]
    fn test_voodoo_death_same_tick_when_player_below() {
        let mut state = cave(&["  qV ", "     ", "P    "]);
        let result = advance_one_tick(&mut state, PlayerInput::IDLE);
        assert!(data(&result).contains(&EventData::LifeLost));
        assert!(!state.player_alive);
    }

    #[test]
    fn test_voodoo_catches_diamond_for_the_player() {
        let config = CaveConfig { diamonds_required: 1, time_limit_secs: 0, ..CaveConfig::default() };
        let mut state = cave_with(&["P d", "   ", "  V"], config);

        advance_one_tick(&mut state, PlayerInput::IDLE);
        let result = advance_one_tick(&mut state, PlayerInput::IDLE);

        assert_eq!(state.diamonds_collected, 1);
        assert_eq!(state.grid.count(ElementKind::Diamond), 0);
        assert!(data(&result).contains(&EventData::LevelComplete));
        assert_eq!(state.phase, CavePhase::Completed);
    }

    #[test]
    fn test_amoeba_turns_to_boulders_the_tick_after_overflow() {
        let config = CaveConfig { amoeba_max_size: 2, time_limit_secs: 0, ..CaveConfig::default() };
        let mut state = cave_with(&["aaa", "www"], config);

        advance_one_tick(&mut state, PlayerInput::IDLE);
        assert_eq!(state.amoeba.settled, Some(ElementKind::Boulder));
        assert_eq!(state.grid.count(ElementKind::Amoeba), 3);

        advance_one_tick(&mut state, PlayerInput::IDLE);
        assert_eq!(state.grid.count(ElementKind::Amoeba), 0);
        assert_eq!(state.grid.count(ElementKind::Boulder), 3);
    }

    #[test]
    fn test_replay_determinism() {
        let def = CaveDefinition::from_rows(
            "replay",
            &["WWWWWWWW", "WP.r.dqW", "W..a.. W", "W.r d. W", "WWWWWWWW"],
            CaveConfig { seed: 42, time_limit_secs: 20, ..CaveConfig::default() },
        )
        .unwrap();
        let recording = InputRecording::from_demo_moves(&[0x37, 0x2d, 0x1f, 0x47, 0x2e]);

        let first = replay_cave(&def, &recording, 60).unwrap();
        let second = replay_cave(&def, &recording, 60).unwrap();

        assert_eq!(first.final_hash, second.final_hash);
        assert_eq!(first.events, second.events);
        assert_eq!(first.state.tick, second.state.tick);
    }

    #[test]
    fn test_replay_rejects_bad_definition() {
        let mut def = CaveDefinition::from_rows("bad", &["P"], CaveConfig::default()).unwrap();
        def.cells[0].code = 99;
        assert!(replay_cave(&def, &InputRecording::new(), 10).is_err());
    }
}
