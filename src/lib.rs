//! # Cave Engine
//!
//! Deterministic tick engine for Boulder-Dash style caves.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CAVE ENGINE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── direction.rs - Directions and grid positions            │
//! │  ├── rng.rs       - Seeded xoroshiro128** PRNG               │
//! │  └── hash.rs      - State hashing for verification           │
//! │                                                              │
//! │  game/            - Cave simulation (deterministic)          │
//! │  ├── element.rs   - Element kinds and rule table             │
//! │  ├── grid.rs      - Cell grid and snapshots                  │
//! │  ├── config.rs    - Cave/engine config, definitions          │
//! │  ├── state.rs     - Cave state                               │
//! │  ├── tick.rs      - Per-tick scheduler and replay            │
//! │  ├── physics.rs   - Gravity, magic wall, slime               │
//! │  ├── creatures.rs - Monsters and growing walls               │
//! │  ├── amoeba.rs    - Amoeba growth                            │
//! │  ├── explosion.rs - Explosions                               │
//! │  ├── player.rs    - Player controller                        │
//! │  ├── input.rs     - Inputs and recordings                    │
//! │  └── events.rs    - Outward-facing events                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! - No floating-point arithmetic in cave logic
//! - No system time dependencies
//! - All randomness from the cave's own seeded RNG
//!
//! Given the same cave definition and the same inputs, every tick produces
//! **identical grids, events and state hashes**.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::direction::{Direction, Pos};
pub use core::rng::DeterministicRng;
pub use game::config::{CaveConfig, CaveDefinition, ConfigError, EngineConfig};
pub use game::input::{InputRecording, Modifier, PlayerInput};
pub use game::state::{CavePhase, CaveState};
pub use game::tick::{advance_one_tick, replay_cave, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default logical tick rate (Hz)
pub const DEFAULT_TICKS_PER_SECOND: u32 = 7;
