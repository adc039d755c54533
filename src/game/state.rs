//! Cave State
//!
//! One play-through of one cave: the grid plus every cave-wide counter
//! the tick needs. Built from a `CaveDefinition`, mutated only by the tick
//! and the player controller, dropped when the level ends.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::direction::{Direction, Pos};
use crate::core::hash::{StateHash, StateHasher};
use crate::core::rng::DeterministicRng;
use crate::game::config::{CaveConfig, CaveDefinition, ConfigError, EngineConfig};
use crate::game::element::{validate_rule_table, ElementKind};
use crate::game::events::{Event, EventData, EventSink, FailureCause, SoundCue};
use crate::game::grid::{Grid, GridSnapshot};

// =============================================================================
// CAVE PHASE
// =============================================================================

/// Lifecycle of a cave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CavePhase {
    /// Normal play
    #[default]
    Playing,
    /// Diamond requirement met; the cave is frozen
    Completed,
    /// Player dead or time up; physics keeps running, input is ignored
    Failed,
}

// =============================================================================
// MAGIC WALL
// =============================================================================

/// Activity of the cave's magic walls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagicWallStatus {
    /// Nothing has fallen in yet
    #[default]
    Dormant,
    /// Converting
    Active,
    /// Budget spent
    Expired,
}

/// Shared state of every magic wall in the cave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicWallState {
    /// Current activity
    pub status: MagicWallStatus,
    /// Remaining budget units
    pub budget: u32,
}

impl MagicWallState {
    /// Dormant wall with `budget` units.
    pub fn new(budget: u32) -> Self {
        let status = if budget == 0 {
            MagicWallStatus::Expired
        } else {
            MagicWallStatus::Dormant
        };
        Self { status, budget }
    }

    /// Converting right now?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == MagicWallStatus::Active
    }

    /// Switch a dormant wall on. Returns true on the transition.
    pub fn activate(&mut self) -> bool {
        if self.status == MagicWallStatus::Dormant {
            self.status = MagicWallStatus::Active;
            return true;
        }
        false
    }

    /// Spend one unit. Returns true when this exhausts the budget.
    pub fn spend(&mut self) -> bool {
        if self.status != MagicWallStatus::Active {
            return false;
        }
        self.budget = self.budget.saturating_sub(1);
        if self.budget == 0 {
            self.status = MagicWallStatus::Expired;
            return true;
        }
        false
    }
}

// =============================================================================
// AMOEBA
// =============================================================================

/// Shared state of every amoeba cell in the cave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmoebaState {
    /// Cells counted by the last completed scan
    pub size: u32,
    /// Converts to boulders once `size` exceeds this
    pub max_size: u32,
    /// Remaining ticks of slow growth
    pub slow_ticks: u32,
    /// Consecutive ticks with no growth candidate
    pub enclosed_ticks: u32,
    /// Has never had room to grow
    pub dormant: bool,
    /// What every amoeba cell turns into on the next scan
    pub settled: Option<ElementKind>,
    /// Cells counted so far this scan
    scan_size: u32,
    /// No cell with room seen so far this scan
    scan_enclosed: bool,
}

impl AmoebaState {
    /// Fresh amoeba state.
    pub fn new(max_size: u32, slow_ticks: u32) -> Self {
        Self {
            size: 0,
            max_size,
            slow_ticks,
            enclosed_ticks: 0,
            dormant: true,
            settled: None,
            scan_size: 0,
            scan_enclosed: true,
        }
    }

    /// Reset the per-scan counters.
    pub fn begin_scan(&mut self) {
        self.scan_size = 0;
        self.scan_enclosed = true;
    }

    /// Count one live cell. Returns true if this wakes a dormant amoeba.
    pub fn record_cell(&mut self, has_room: bool) -> bool {
        self.scan_size += 1;
        if has_room {
            self.scan_enclosed = false;
            if self.dormant {
                self.dormant = false;
                return true;
            }
        }
        false
    }

    /// Close the scan and decide whether the amoeba settles.
    ///
    /// Returns the element it settles into, once.
    pub fn finish_scan(&mut self, enclosed_limit: u32) -> Option<ElementKind> {
        self.size = self.scan_size;
        if self.settled.is_some() || self.size == 0 {
            return None;
        }

        if self.scan_enclosed && !self.dormant {
            self.enclosed_ticks += 1;
        } else {
            self.enclosed_ticks = 0;
        }

        let outcome = if self.enclosed_ticks > 0 && self.enclosed_ticks >= enclosed_limit {
            Some(ElementKind::Diamond)
        } else if self.size > self.max_size {
            Some(ElementKind::Boulder)
        } else {
            self.slow_ticks = self.slow_ticks.saturating_sub(1);
            None
        };
        self.settled = outcome;
        outcome
    }

    /// In the slow-growth period?
    #[inline]
    pub fn is_slow(&self) -> bool {
        self.slow_ticks > 0
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Everything a renderer or HUD reads between ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaveSnapshot {
    /// Tick the snapshot was taken after
    pub tick: u32,
    /// Cave phase
    pub phase: CavePhase,
    /// Cell views
    pub grid: GridSnapshot,
    /// Diamonds collected
    pub diamonds_collected: u32,
    /// Diamonds required
    pub diamonds_required: u32,
    /// Score earned in this cave
    pub score: u32,
    /// Whole seconds left (`None` when untimed)
    pub seconds_remaining: Option<u32>,
    /// Magic walls converting
    pub magic_wall_active: bool,
}

// =============================================================================
// CAVE STATE
// =============================================================================

/// Complete state of one cave play-through.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaveState {
    /// Cave display name
    pub name: String,

    /// Last completed tick (0 = none yet)
    pub tick: u32,

    /// Lifecycle phase
    pub phase: CavePhase,

    /// Cell grid
    pub grid: Grid,

    /// Level scalars
    pub config: CaveConfig,

    /// Engine tunables
    pub engine: EngineConfig,

    /// Seed the RNG was created from
    pub rng_seed: u64,

    /// Cave RNG
    pub rng: DeterministicRng,

    /// Diamonds collected so far
    pub diamonds_collected: u32,

    /// Diamonds needed to complete the cave
    pub diamonds_required: u32,

    /// Score earned in this cave
    pub score: u32,

    /// Remaining time in ticks (meaningless when untimed)
    pub time_remaining: u32,

    /// Has a time limit
    pub timed: bool,

    /// Amoeba sub-state
    pub amoeba: AmoebaState,

    /// Magic-wall sub-state
    pub magic_wall: MagicWallState,

    /// Player position seen by the last scan
    pub player_pos: Option<Pos>,

    /// Player not yet killed
    pub player_alive: bool,

    /// A monster blew up next to the voodoo doll; the player explodes when
    /// the scan next reaches it
    pub voodoo_struck: bool,

    /// Events waiting for the end of the tick
    #[serde(skip)]
    pub events: EventSink,
}

impl CaveState {
    /// Build a cave from its definition.
    ///
    /// Every configuration problem is reported here; once built, a cave
    /// ticks without errors.
    pub fn new(definition: &CaveDefinition, engine: EngineConfig) -> Result<Self, ConfigError> {
        validate_rule_table()?;
        engine.validate()?;
        let grid = definition.build_grid()?;
        let config = definition.config.clone();

        let diamonds_required = if config.diamonds_required == 0 {
            grid.count(ElementKind::Diamond) as u32
        } else {
            config.diamonds_required
        };
        if diamonds_required == 0 {
            return Err(ConfigError::InvalidCaveConfig(
                "cave needs every diamond but contains none".into(),
            ));
        }
        let player_pos = grid.find(ElementKind::Player).first().copied();

        let mut state = Self {
            name: definition.name.clone(),
            tick: 0,
            phase: CavePhase::Playing,
            rng_seed: config.seed,
            rng: DeterministicRng::new(config.seed),
            diamonds_collected: 0,
            diamonds_required,
            score: 0,
            time_remaining: engine.secs_to_ticks(config.time_limit_secs),
            timed: config.time_limit_secs > 0,
            amoeba: AmoebaState::new(
                config.amoeba_max_size,
                engine.secs_to_ticks(config.amoeba_slow_growth_secs),
            ),
            magic_wall: MagicWallState::new(engine.secs_to_ticks(config.magic_wall_secs)),
            player_alive: player_pos.is_some(),
            voodoo_struck: false,
            player_pos,
            events: EventSink::new(),
            grid,
            config,
            engine,
        };
        state.amoeba.dormant = !state.any_amoeba_has_room();

        debug!(
            "Cave '{}' built: {}x{}, {} diamonds required, {} ticks",
            state.name,
            state.grid.width(),
            state.grid.height(),
            state.diamonds_required,
            state.time_remaining
        );
        Ok(state)
    }

    /// Build with default engine tunables.
    pub fn from_definition(definition: &CaveDefinition) -> Result<Self, ConfigError> {
        Self::new(definition, EngineConfig::default())
    }

    /// Can amoeba at `pos` grow somewhere?
    pub fn amoeba_has_room(&self, pos: Pos) -> bool {
        Direction::CARDINAL.iter().any(|dir| {
            matches!(self.grid.kind(pos.step(*dir)), ElementKind::Empty | ElementKind::Dirt)
        })
    }

    fn any_amoeba_has_room(&self) -> bool {
        self.grid
            .find(ElementKind::Amoeba)
            .into_iter()
            .any(|pos| self.amoeba_has_room(pos))
    }

    /// Level over (won or lost)?
    pub fn is_ended(&self) -> bool {
        self.phase != CavePhase::Playing
    }

    /// Whole seconds left, rounded up (`None` when untimed).
    pub fn seconds_remaining(&self) -> Option<u32> {
        if !self.timed {
            return None;
        }
        let tps = self.engine.ticks_per_second.max(1);
        Some(self.time_remaining.div_ceil(tps))
    }

    /// Queue an event for this tick.
    #[inline]
    pub fn push_event(&mut self, data: EventData) {
        self.events.push(Event::new(self.tick, data));
    }

    /// Queue a sound for this tick.
    #[inline]
    pub fn sound(&mut self, cue: SoundCue) {
        self.events.sound(self.tick, cue);
    }

    /// Take the tick's events.
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Credit one collected diamond.
    ///
    /// Emits the collect sound and the score delta; completes the cave when
    /// the requirement is reached.
    pub fn collect_diamond(&mut self) {
        self.diamonds_collected += 1;
        let points = if self.diamonds_collected > self.diamonds_required {
            self.config.extra_diamond_value
        } else {
            self.config.diamond_value
        };
        self.score = self.score.saturating_add(points);

        self.sound(SoundCue::DiamondCollect);
        self.events.push(Event::score_delta(self.tick, points, self.score));

        if self.phase == CavePhase::Playing && self.diamonds_collected >= self.diamonds_required {
            self.phase = CavePhase::Completed;
            self.push_event(EventData::LevelComplete);
            self.sound(SoundCue::Finished);
            debug!("Cave '{}' completed at tick {}", self.name, self.tick);
        }
    }

    /// The player was destroyed.
    ///
    /// Emits life-lost once; fails the cave if it was still being played.
    pub fn player_died(&mut self) {
        if !self.player_alive || self.phase == CavePhase::Completed {
            return;
        }
        self.player_alive = false;
        self.player_pos = None;
        self.push_event(EventData::LifeLost);

        if self.phase == CavePhase::Playing {
            self.fail(FailureCause::Killed);
        }
    }

    /// Move to the failed phase with `cause`.
    pub fn fail(&mut self, cause: FailureCause) {
        if self.phase != CavePhase::Playing {
            return;
        }
        self.phase = CavePhase::Failed;
        self.events.push(Event::level_failed(self.tick, cause));
        debug!("Cave '{}' failed at tick {}: {:?}", self.name, self.tick, cause);
    }

    /// Grant bonus time.
    ///
    /// Ignored when the cave is untimed or no longer being played.
    pub fn add_extra_time(&mut self, seconds: u32) {
        if !self.timed || self.phase != CavePhase::Playing {
            return;
        }
        self.time_remaining = self
            .time_remaining
            .saturating_add(self.engine.secs_to_ticks(seconds));
        self.push_event(EventData::ExtraTime { seconds });
    }

    /// Immutable view for renderers and the HUD.
    pub fn snapshot(&self) -> CaveSnapshot {
        CaveSnapshot {
            tick: self.tick,
            phase: self.phase,
            grid: self.grid.snapshot(),
            diamonds_collected: self.diamonds_collected,
            diamonds_required: self.diamonds_required,
            score: self.score,
            seconds_remaining: self.seconds_remaining(),
            magic_wall_active: self.magic_wall.is_active(),
        }
    }

    /// Compute deterministic state hash.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::cave_state(self.tick, self.rng_seed);
        hasher.field(self.phase as u8);
        self.grid.hash_into(&mut hasher);

        let [s0, s1] = self.rng.state();
        hasher
            .field(s0)
            .field(s1)
            .field(self.diamonds_collected)
            .field(self.diamonds_required)
            .field(self.score)
            .field(self.time_remaining)
            .field(self.player_alive)
            .field(self.voodoo_struck)
            .field(self.amoeba.size)
            .field(self.amoeba.slow_ticks)
            .field(self.amoeba.enclosed_ticks)
            .field(self.amoeba.dormant)
            .field(self.amoeba.settled)
            .field(self.magic_wall.status as u8)
            .field(self.magic_wall.budget);
        hasher.finish()
    }
}
