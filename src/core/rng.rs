//! Cave RNG
//!
//! xoroshiro128** seeded through SplitMix64. Only integer arithmetic, so a
//! seed yields the same rolls on every platform and amoeba growth and slime
//! seepage replay exactly.

use serde::{Serialize, Deserialize};

/// Seeded generator owned by one cave.
///
/// ```
/// use cave_engine::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(2024);
/// let mut b = DeterministicRng::new(2024);
/// assert_eq!(a.next_int(100), b.next_int(100));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    s0: u64,
    s1: u64,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Expand `seed` into the 128-bit state.
    pub fn new(seed: u64) -> Self {
        let mut mix = SplitMix64(seed);
        let (s0, s1) = (mix.next(), mix.next());
        // xoroshiro is stuck at zero forever
        if s0 | s1 == 0 {
            return Self { s0: 1, s1: 0 };
        }
        Self { s0, s1 }
    }

    /// Next raw 64-bit output.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let (s0, mut s1) = (self.s0, self.s1);
        let out = s0.wrapping_mul(5).rotate_left(7).wrapping_mul(9);

        s1 ^= s0;
        self.s0 = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.s1 = s1.rotate_left(37);
        out
    }

    /// Uniform-ish integer below `bound`; 0 when `bound` is 0.
    ///
    /// Multiply-shift on the high 32 bits.
    #[inline]
    pub fn next_int(&mut self, bound: u32) -> u32 {
        let high = self.next_u64() >> 32;
        ((high * u64::from(bound)) >> 32) as u32
    }

    /// True with probability `numerator / denominator`.
    ///
    /// A zero denominator never succeeds.
    #[inline]
    pub fn chance(&mut self, numerator: u32, denominator: u32) -> bool {
        denominator != 0 && self.next_int(denominator) < numerator
    }

    /// Pick one element, or `None` from an empty slice.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_int(items.len() as u32) as usize;
        items.get(index).copied()
    }

    /// Raw state words, for hashing and checkpoints.
    pub fn state(&self) -> [u64; 2] {
        [self.s0, self.s1]
    }

    /// Resume from words taken with [`state`](Self::state).
    pub fn set_state(&mut self, [s0, s1]: [u64; 2]) {
        self.s0 = s0;
        self.s1 = s1;
    }
}

struct SplitMix64(u64);

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}
