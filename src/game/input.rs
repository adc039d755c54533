//! Player Input and Recordings
//!
//! One `PlayerInput` per tick. Recordings are delta-compressed: an entry is
//! stored only on ticks where the input changes, so a long idle stretch or
//! a held direction costs one entry.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::direction::Direction;
use crate::core::hash::{HashDomain, StateHash, StateHasher};

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Action modifier held together with a direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Modifier {
    /// Plain move
    #[default]
    None = 0,
    /// Act on the neighbouring cell without moving
    Grab = 1,
}

/// Player input for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Requested direction (`None` = stand still)
    pub direction: Direction,
    /// Held modifier
    pub modifier: Modifier,
}

impl PlayerInput {
    /// No input.
    pub const IDLE: PlayerInput = PlayerInput {
        direction: Direction::None,
        modifier: Modifier::None,
    };

    /// Move in `direction`.
    pub const fn moving(direction: Direction) -> Self {
        Self {
            direction,
            modifier: Modifier::None,
        }
    }

    /// Grab towards `direction`.
    pub const fn grabbing(direction: Direction) -> Self {
        Self {
            direction,
            modifier: Modifier::Grab,
        }
    }

    /// No direction requested?
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.direction == Direction::None
    }
}

/// Input change recorded at a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input began
    pub tick: u32,
    /// The new input
    pub input: PlayerInput,
}

/// Recording (de)serialisation failure.
#[derive(Debug, Error)]
pub enum RecordingError {
    /// bincode rejected the data
    #[error("recording codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Deltas are not in strictly increasing tick order
    #[error("recording deltas out of order at entry {0}")]
    OutOfOrder(usize),
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Complete input recording for one play-through of one cave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecording {
    /// First recorded tick (ticks start at 1)
    pub start_tick: u32,

    /// Last recorded tick
    pub end_tick: u32,

    /// Only ticks where input changed
    deltas: Vec<InputDelta>,

    /// Last recorded input, for delta comparison
    #[serde(skip)]
    last_input: PlayerInput,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self {
            start_tick: 1,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_input: PlayerInput::IDLE,
        }
    }

    /// Record input for a tick. Stored only if it changed.
    pub fn record(&mut self, tick: u32, input: PlayerInput) {
        self.end_tick = tick;

        if input != self.last_input {
            self.deltas.push(InputDelta { tick, input });
            self.last_input = input;
        }
    }

    /// Input in effect at `tick`.
    pub fn input_at(&self, tick: u32) -> PlayerInput {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        match idx.checked_sub(1).and_then(|i| self.deltas.get(i)) {
            Some(delta) => delta.input,
            None => PlayerInput::IDLE,
        }
    }

    /// Recorded changes.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of recorded ticks.
    pub fn len(&self) -> u32 {
        (self.end_tick + 1).saturating_sub(self.start_tick)
    }

    /// Nothing recorded?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extend the recording to `end_tick` without a new change.
    pub fn finalize(&mut self, end_tick: u32) {
        self.end_tick = self.end_tick.max(end_tick);
    }

    /// Iterate `(tick, input)` over every recorded tick.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current: PlayerInput::IDLE,
        }
    }

    /// Decode the classic demo move table.
    ///
    /// Each byte packs a direction in the low nibble (`0x0f` none, `0x07`
    /// right, `0x0b` left, `0x0d` down, `0x0e` up) and a repeat count in the
    /// high nibble. A zero byte ends the table. Unknown direction nibbles
    /// are treated as no input.
    pub fn from_demo_moves(moves: &[u8]) -> Self {
        let mut recording = Self::new();
        let mut tick = recording.start_tick;

        for &byte in moves.iter().take_while(|b| **b != 0) {
            let direction = match byte & 0x0f {
                0x07 => Direction::Right,
                0x0b => Direction::Left,
                0x0d => Direction::Down,
                0x0e => Direction::Up,
                _ => Direction::None,
            };
            let repeat = u32::from(byte >> 4);
            for _ in 0..repeat {
                recording.record(tick, PlayerInput::moving(direction));
                tick += 1;
            }
        }
        recording
    }

    /// Serialise with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordingError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialise with bincode, rejecting unordered deltas.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordingError> {
        let mut recording: InputRecording = bincode::deserialize(bytes)?;
        for (i, pair) in recording.deltas.windows(2).enumerate() {
            if pair[1].tick <= pair[0].tick {
                return Err(RecordingError::OutOfOrder(i + 1));
            }
        }
        recording.last_input = recording
            .deltas
            .last()
            .map(|d| d.input)
            .unwrap_or(PlayerInput::IDLE);
        Ok(recording)
    }

    /// Digest of the recording contents.
    pub fn hash(&self) -> StateHash {
        let mut hasher = StateHasher::new(HashDomain::InputRecording);
        hasher.field(self.start_tick).field(self.end_tick);
        for delta in &self.deltas {
            hasher
                .field(delta.tick)
                .field(delta.input.direction)
                .field(delta.input.modifier as u8);
        }
        hasher.finish()
    }
}

impl Default for InputRecording {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current: PlayerInput,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, PlayerInput);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current = delta.input;
            self.delta_idx += 1;
        }

        let item = (self.current_tick, self.current);
        self.current_tick += 1;
        Some(item)
    }
}
