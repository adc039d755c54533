//! Cave Simulation Module
//!
//! All cave simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `element`: Element kinds and the static rule table
//! - `grid`: Cell grid and renderer snapshots
//! - `config`: Cave/engine configuration and cave definitions
//! - `state`: Cave state, amoeba and magic-wall sub-state
//! - `tick`: Per-tick scheduler and replay
//! - `physics`: Falling, rolling, magic wall, slime
//! - `creatures`: Fireflies, butterflies, growing walls
//! - `amoeba`: Amoeba growth and settling
//! - `explosion`: Explosions and fragment ageing
//! - `player`: Player controller
//! - `input`: Per-tick input and recordings
//! - `events`: Outward-facing events

pub mod element;
pub mod grid;
pub mod config;
pub mod state;
pub mod tick;
pub mod physics;
pub mod creatures;
pub mod amoeba;
pub mod explosion;
pub mod player;
pub mod input;
pub mod events;

// Re-export key types
pub use element::{ElementKind, ElementRules, RULES};
pub use grid::{Cell, Grid, GridSnapshot};
pub use config::{CaveConfig, CaveDefinition, ConfigError, EngineConfig};
pub use state::{CavePhase, CaveSnapshot, CaveState};
pub use tick::{advance_one_tick, replay_cave, TickResult};
pub use input::{InputRecording, Modifier, PlayerInput, RecordingError};
pub use events::{Event, EventData, SoundCue};
