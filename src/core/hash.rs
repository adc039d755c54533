//! Cave State Digests
//!
//! SHA-256 over a fixed field order. Two runs of the same cave with the same
//! inputs must produce byte-identical digests; a replay that disagrees with
//! its live run has desynced.
//!
//! Every digest starts with a [`HashDomain`] tag so a cave digest can never
//! collide with a recording digest over the same bytes.

use sha2::{Digest, Sha256};

use super::direction::{Direction, Pos};

/// 32-byte SHA-256 digest.
pub type StateHash = [u8; 32];

/// What a digest covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashDomain {
    /// Full cave state after a tick
    CaveState,
    /// An input recording
    InputRecording,
}

impl HashDomain {
    const fn tag(self) -> &'static [u8] {
        match self {
            HashDomain::CaveState => b"CAVE_ENGINE_STATE_V1",
            HashDomain::InputRecording => b"CAVE_ENGINE_INPUTS_V1",
        }
    }
}

/// A value with a canonical byte encoding for digests.
///
/// Integers are little-endian; enums feed their `u8` code.
pub trait HashField {
    /// Append the canonical bytes to `digest`.
    fn feed(&self, digest: &mut Sha256);
}

macro_rules! le_field {
    ($($ty:ty),*) => {
        $(impl HashField for $ty {
            #[inline]
            fn feed(&self, digest: &mut Sha256) {
                digest.update(self.to_le_bytes());
            }
        })*
    };
}

le_field!(u8, u16, u32, u64, i32);

impl HashField for bool {
    #[inline]
    fn feed(&self, digest: &mut Sha256) {
        digest.update([u8::from(*self)]);
    }
}

impl HashField for Direction {
    #[inline]
    fn feed(&self, digest: &mut Sha256) {
        digest.update([*self as u8]);
    }
}

impl HashField for Pos {
    #[inline]
    fn feed(&self, digest: &mut Sha256) {
        self.x.feed(digest);
        self.y.feed(digest);
    }
}

impl<T: HashField> HashField for Option<T> {
    fn feed(&self, digest: &mut Sha256) {
        match self {
            Some(value) => {
                digest.update([1]);
                value.feed(digest);
            }
            None => digest.update([0]),
        }
    }
}

/// Incremental digest builder.
///
/// ```
/// use cave_engine::core::hash::{HashDomain, StateHasher};
///
/// let mut a = StateHasher::new(HashDomain::CaveState);
/// a.field(3u32).field(true);
/// let mut b = StateHasher::new(HashDomain::CaveState);
/// b.field(3u32).field(true);
/// assert_eq!(a.finish(), b.finish());
/// ```
pub struct StateHasher {
    digest: Sha256,
}

impl StateHasher {
    /// Start a digest in `domain`.
    pub fn new(domain: HashDomain) -> Self {
        let mut digest = Sha256::new();
        digest.update(domain.tag());
        Self { digest }
    }

    /// Start a cave-state digest. Tick and seed always lead.
    pub fn cave_state(tick: u32, rng_seed: u64) -> Self {
        let mut hasher = Self::new(HashDomain::CaveState);
        hasher.field(tick).field(rng_seed);
        hasher
    }

    /// Append one field.
    #[inline]
    pub fn field<T: HashField>(&mut self, value: T) -> &mut Self {
        value.feed(&mut self.digest);
        self
    }

    /// Append raw bytes, length-prefixed.
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.field(bytes.len() as u64);
        self.digest.update(bytes);
        self
    }

    /// Consume the builder.
    pub fn finish(self) -> StateHash {
        self.digest.finalize().into()
    }
}
