//! Core deterministic primitives.
//!
//! Everything here is platform independent: integer coordinates,
//! a seeded PRNG, and SHA-256 state hashing.

pub mod direction;
pub mod rng;
pub mod hash;

// Re-export core types
pub use direction::{Direction, Pos};
pub use rng::DeterministicRng;
pub use hash::{HashDomain, HashField, StateHash, StateHasher};
