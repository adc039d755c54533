//! Cave Events
//!
//! Outward-facing events produced during a tick, in the order the
//! interactions happened. Audio, score, and level-flow collaborators
//! consume them after each tick; nothing in the engine reads them back.

use serde::{Serialize, Deserialize};

/// Symbolic audio trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundCue {
    /// Boulder landed
    BoulderFall,
    /// Diamond landed
    DiamondFall,
    /// Diamond picked up
    DiamondCollect,
    /// Player stepped into open space
    WalkEmpty,
    /// Player dug through dirt
    WalkDirt,
    /// Boulder pushed
    BoulderPush,
    /// Something exploded
    Explosion,
    /// An explosion caught the voodoo doll
    VoodooExplosion,
    /// Magic wall switched on
    MagicWallActive,
    /// Magic wall ran out of budget
    MagicWallStop,
    /// Amoeba woke up
    AmoebaStart,
    /// Amoeba settled into boulders or diamonds
    AmoebaStop,
    /// Element seeped through slime
    Slime,
    /// Countdown beep, seconds remaining (1..=9)
    Timeout(u8),
    /// Level finished
    Finished,
    /// Growing wall extended
    GrowingWall,
}

/// Why a cave was failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCause {
    /// Player was crushed, blown up, or walked into a monster
    Killed,
    /// Timer reached zero
    TimeUp,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EventData {
    /// Play a sound
    Sound {
        /// Which sound
        cue: SoundCue,
    },

    /// Score changed
    ScoreDelta {
        /// Points awarded
        points: u32,
        /// Cave score after the award
        total: u32,
    },

    /// Bonus time granted
    ExtraTime {
        /// Seconds added
        seconds: u32,
    },

    /// The player died
    LifeLost,

    /// Diamond requirement reached
    LevelComplete,

    /// The cave cannot be completed any more
    LevelFailed {
        /// What ended it
        cause: FailureCause,
    },
}

/// A cave event stamped with its tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Tick when the event occurred
    pub tick: u32,

    /// Event data
    pub data: EventData,
}

impl Event {
    /// Create a new event.
    pub fn new(tick: u32, data: EventData) -> Self {
        Self { tick, data }
    }

    /// Create sound event.
    pub fn sound(tick: u32, cue: SoundCue) -> Self {
        Self::new(tick, EventData::Sound { cue })
    }

    /// Create score delta event.
    pub fn score_delta(tick: u32, points: u32, total: u32) -> Self {
        Self::new(tick, EventData::ScoreDelta { points, total })
    }

    /// Create level failed event.
    pub fn level_failed(tick: u32, cause: FailureCause) -> Self {
        Self::new(tick, EventData::LevelFailed { cause })
    }

    /// Sound cue carried by this event, if any.
    pub fn cue(&self) -> Option<SoundCue> {
        match self.data {
            EventData::Sound { cue } => Some(cue),
            _ => None,
        }
    }
}

// =============================================================================
// EVENT SINK
// =============================================================================

/// Append-only event queue, drained once per tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSink {
    pending: Vec<Event>,
}

impl EventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    #[inline]
    pub fn push(&mut self, event: Event) {
        self.pending.push(event);
    }

    /// Append a sound cue.
    #[inline]
    pub fn sound(&mut self, tick: u32, cue: SoundCue) {
        self.push(Event::sound(tick, cue));
    }

    /// Take every pending event, in emission order.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }
}
