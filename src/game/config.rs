//! Cave and Engine Configuration
//!
//! Two layers:
//! - `CaveConfig`: per-level scalars handed over by the level loader.
//! - `EngineConfig`: engine tunables shared by every cave (tick rate,
//!   roll tie-break, amoeba odds, explosion length).
//!
//! `CaveDefinition` is the loader's immutable starting snapshot. Everything
//! is validated before a cave is built; a cave never starts corrupt.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::direction::Direction;
use crate::game::element::ElementKind;
use crate::game::grid::{Cell, Grid};

/// Largest accepted width or height.
pub const MAX_CAVE_DIMENSION: u32 = 1024;

/// Configuration errors, reported before any tick runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Width or height is zero or too large.
    #[error("invalid cave dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Map does not have width*height cells.
    #[error("cave map has {actual} cells, expected {expected}")]
    CellCountMismatch {
        /// width * height
        expected: usize,
        /// Cells supplied
        actual: usize,
    },

    /// Loader supplied an element code with no kind.
    #[error("unknown element code {code} at cell {index}")]
    UnknownElement {
        /// Offending code
        code: u8,
        /// Row-major cell index
        index: usize,
    },

    /// Map row uses a character outside the legend.
    #[error("unknown map character {0:?}")]
    UnknownLegend(char),

    /// Map rows differ in length.
    #[error("map row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        /// Row index
        row: usize,
        /// Width of row 0
        expected: usize,
        /// Width of this row
        actual: usize,
    },

    /// More than one player on the map.
    #[error("cave has {0} players, at most one is allowed")]
    MultiplePlayers(usize),

    /// Element kind without a rule-table entry.
    #[error("no rule-table entry for {0:?}")]
    MissingRule(ElementKind),

    /// Cave scalar out of range.
    #[error("invalid cave config: {0}")]
    InvalidCaveConfig(String),

    /// Engine tunable out of range.
    #[error("invalid engine config: {0}")]
    InvalidEngineConfig(String),
}

// =============================================================================
// ENGINE CONFIG
// =============================================================================

/// Which side a fallable tries first when rolling off a round element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollPreference {
    /// Left, then right
    #[default]
    LeftFirst,
    /// Right, then left
    RightFirst,
}

impl RollPreference {
    /// Sides in the order they are tried.
    pub const fn order(self) -> [Direction; 2] {
        match self {
            RollPreference::LeftFirst => [Direction::Left, Direction::Right],
            RollPreference::RightFirst => [Direction::Right, Direction::Left],
        }
    }
}

/// How the magic-wall budget is spent once the wall is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagicWallDrain {
    /// One unit per converted element
    #[default]
    PerConversion,
    /// One unit per tick while active
    PerTick,
}

/// A `numerator` in `denominator` chance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Odds {
    /// Successes
    pub numerator: u32,
    /// Out of
    pub denominator: u32,
}

impl Odds {
    /// Create odds.
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self { numerator, denominator }
    }
}

/// Engine tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Logical ticks per second (converts level seconds to ticks)
    pub ticks_per_second: u32,
    /// Roll tie-break
    pub roll_preference: RollPreference,
    /// Per-cell amoeba growth odds during the slow period
    pub amoeba_slow_odds: Odds,
    /// Per-cell amoeba growth odds afterwards
    pub amoeba_fast_odds: Odds,
    /// Consecutive enclosed ticks before amoeba turns to diamonds
    pub amoeba_enclosed_ticks: u32,
    /// Ticks an explosion fragment lasts
    pub explosion_stages: u16,
    /// Magic-wall budget accounting
    pub magic_wall_drain: MagicWallDrain,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: crate::DEFAULT_TICKS_PER_SECOND,
            roll_preference: RollPreference::LeftFirst,
            amoeba_slow_odds: Odds::new(3, 128),
            amoeba_fast_odds: Odds::new(1, 4),
            amoeba_enclosed_ticks: 1,
            explosion_stages: 5,
            magic_wall_drain: MagicWallDrain::PerConversion,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let parse_u32 = |key: &str, fallback: u32| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(fallback)
        };

        Self {
            ticks_per_second: parse_u32("CAVE_TICKS_PER_SECOND", defaults.ticks_per_second),
            roll_preference: match std::env::var("CAVE_ROLL_PREFERENCE").as_deref() {
                Ok("right") => RollPreference::RightFirst,
                Ok("left") => RollPreference::LeftFirst,
                _ => defaults.roll_preference,
            },
            amoeba_enclosed_ticks: parse_u32("CAVE_AMOEBA_ENCLOSED_TICKS", defaults.amoeba_enclosed_ticks),
            explosion_stages: std::env::var("CAVE_EXPLOSION_STAGES")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.explosion_stages),
            magic_wall_drain: match std::env::var("CAVE_MAGIC_WALL_DRAIN").as_deref() {
                Ok("tick") => MagicWallDrain::PerTick,
                Ok("conversion") => MagicWallDrain::PerConversion,
                _ => defaults.magic_wall_drain,
            },
            ..defaults
        }
    }

    /// Reject values the tick code cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::InvalidEngineConfig("ticks_per_second must be positive".into()));
        }
        if self.explosion_stages == 0 {
            return Err(ConfigError::InvalidEngineConfig("explosion_stages must be positive".into()));
        }
        for (name, odds) in [("amoeba_slow_odds", self.amoeba_slow_odds), ("amoeba_fast_odds", self.amoeba_fast_odds)] {
            if odds.denominator == 0 || odds.numerator > odds.denominator {
                return Err(ConfigError::InvalidEngineConfig(format!(
                    "{} must satisfy 0 <= numerator <= denominator, denominator > 0",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Seconds to ticks.
    #[inline]
    pub fn secs_to_ticks(&self, secs: u32) -> u32 {
        secs.saturating_mul(self.ticks_per_second)
    }
}

// =============================================================================
// CAVE CONFIG
// =============================================================================

/// Per-level scalars supplied by the level loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaveConfig {
    /// Seed for the cave's deterministic RNG
    pub seed: u64,
    /// Time limit in seconds (0 = untimed)
    pub time_limit_secs: u32,
    /// Diamonds needed (0 = every diamond present at start)
    pub diamonds_required: u32,
    /// Points per diamond until the requirement is met
    pub diamond_value: u32,
    /// Points per diamond afterwards
    pub extra_diamond_value: u32,
    /// Amoeba converts to boulders once its size exceeds this
    pub amoeba_max_size: u32,
    /// Seconds of slow amoeba growth
    pub amoeba_slow_growth_secs: u32,
    /// Magic-wall budget in seconds
    pub magic_wall_secs: u32,
    /// Chance in percent that a falling element seeps through slime
    pub slime_permeability_pct: u8,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            time_limit_secs: 150,
            diamonds_required: 12,
            diamond_value: 10,
            extra_diamond_value: 15,
            amoeba_max_size: 200,
            amoeba_slow_growth_secs: 0,
            magic_wall_secs: 20,
            slime_permeability_pct: 0,
        }
    }
}

impl CaveConfig {
    /// Reject out-of-range scalars.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slime_permeability_pct > 100 {
            return Err(ConfigError::InvalidCaveConfig(format!(
                "slime permeability {}% exceeds 100%",
                self.slime_permeability_pct
            )));
        }
        Ok(())
    }
}

// =============================================================================
// CAVE DEFINITION
// =============================================================================

/// Initial content of one cell as delivered by a loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialCell {
    /// Element code (see `ElementKind::code`)
    pub code: u8,
    /// Initial facing
    pub direction: Direction,
}

impl InitialCell {
    /// Cell of a known kind with its default facing.
    pub fn of(kind: ElementKind) -> Self {
        Self {
            code: kind.code(),
            direction: default_facing(kind),
        }
    }
}

/// Facing given to monsters placed without one.
pub fn default_facing(kind: ElementKind) -> Direction {
    match kind {
        ElementKind::Firefly => Direction::Left,
        ElementKind::Butterfly => Direction::Down,
        _ => Direction::None,
    }
}

/// Immutable starting snapshot of a cave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaveDefinition {
    /// Display name
    pub name: String,
    /// Columns
    pub width: u32,
    /// Rows
    pub height: u32,
    /// Row-major initial cells
    pub cells: Vec<InitialCell>,
    /// Level scalars
    pub config: CaveConfig,
}

impl CaveDefinition {
    /// Build a definition from rows of map characters.
    ///
    /// Legend: `' '` empty, `.` dirt, `w` brick, `W` steel, `r` boulder,
    /// `d` diamond, `q` firefly, `B` butterfly, `a` amoeba, `M` magic wall,
    /// `s` slime, `P` player, `x` horizontal growing wall, `v` vertical
    /// growing wall.
    pub fn from_rows(name: &str, rows: &[&str], config: CaveConfig) -> Result<Self, ConfigError> {
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut cells = Vec::with_capacity(width * rows.len());

        for (row_index, row) in rows.iter().enumerate() {
            let row_width = row.chars().count();
            if row_width != width {
                return Err(ConfigError::RaggedRow {
                    row: row_index,
                    expected: width,
                    actual: row_width,
                });
            }
            for ch in row.chars() {
                cells.push(InitialCell::of(legend_kind(ch)?));
            }
        }

        Ok(Self {
            name: name.to_string(),
            width: width as u32,
            height: rows.len() as u32,
            cells,
            config,
        })
    }

    /// Check dimensions, cell codes, and player count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_CAVE_DIMENSION
            || self.height > MAX_CAVE_DIMENSION
        {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let expected = (self.width as usize) * (self.height as usize);
        if self.cells.len() != expected {
            return Err(ConfigError::CellCountMismatch {
                expected,
                actual: self.cells.len(),
            });
        }

        let mut players = 0;
        for (index, cell) in self.cells.iter().enumerate() {
            let kind = ElementKind::from_code(cell.code)
                .ok_or(ConfigError::UnknownElement { code: cell.code, index })?;
            if kind == ElementKind::Player {
                players += 1;
            }
        }
        if players > 1 {
            return Err(ConfigError::MultiplePlayers(players));
        }

        self.config.validate()
    }

    /// Validate and lay the cells out on a fresh grid.
    pub fn build_grid(&self) -> Result<Grid, ConfigError> {
        self.validate()?;

        let mut grid = Grid::new(self.width, self.height);
        for (index, initial) in self.cells.iter().enumerate() {
            let kind = ElementKind::from_code(initial.code)
                .ok_or(ConfigError::UnknownElement { code: initial.code, index })?;
            let direction = if kind.is_monster() && initial.direction == Direction::None {
                default_facing(kind)
            } else {
                initial.direction
            };
            grid.set(grid.pos_of(index), Cell::facing(kind, direction), 0);
        }
        Ok(grid)
    }
}

/// Map character to element kind.
pub fn legend_kind(ch: char) -> Result<ElementKind, ConfigError> {
    let kind = match ch {
        ' ' => ElementKind::Empty,
        '.' => ElementKind::Dirt,
        'w' => ElementKind::BrickWall,
        'W' => ElementKind::SteelWall,
        'r' => ElementKind::Boulder,
        'd' => ElementKind::Diamond,
        'q' => ElementKind::Firefly,
        'B' => ElementKind::Butterfly,
        'a' => ElementKind::Amoeba,
        'M' => ElementKind::MagicWall,
        's' => ElementKind::Slime,
        'P' => ElementKind::Player,
        'x' => ElementKind::HorizontalGrowingWall,
        'v' => ElementKind::VerticalGrowingWall,
        'V' => ElementKind::Voodoo,
        'G' => ElementKind::Gravestone,
        other => return Err(ConfigError::UnknownLegend(other)),
    };
    Ok(kind)
}
