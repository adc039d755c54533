//! Cave Engine Demo
//!
//! Plays a built-in cave with a scripted demo recording, logs what happens,
//! then replays the recording and checks the state hashes match.

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cave_engine::{
    VERSION,
    game::{
        config::{CaveConfig, CaveDefinition, EngineConfig},
        events::EventData,
        input::InputRecording,
        state::CaveState,
        tick::{advance_one_tick, replay_cave_with},
    },
};

/// Built-in demo cave.
const DEMO_CAVE: &[&str] = &[
    "WWWWWWWWWWWWWWWWWWWW",
    "WP..r...d.....r..d.W",
    "W.....r......q.....W",
    "W..d.....wwwww...r.W",
    "W...r........d.....W",
    "W.rrr...MMMM.......W",
    "W............B..d..W",
    "W..d..a.........r..W",
    "W.......d....www...W",
    "WWWWWWWWWWWWWWWWWWWW",
];

/// Demo moves: low nibble direction, high nibble repeat count.
const DEMO_MOVES: &[u8] = &[
    0x37, 0x2d, 0x1f, 0x47, 0x2e, 0x37, 0x3d, 0x2b, 0x1f, 0x57, 0x2d, 0x37, 0x00,
];

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let engine = EngineConfig::from_env();
    info!("Cave Engine v{}", VERSION);
    info!("Tick Rate: {} Hz", engine.ticks_per_second);

    demo_cave(engine)
}

/// Play the demo cave and verify it replays identically.
fn demo_cave(engine: EngineConfig) -> Result<()> {
    let config = CaveConfig {
        seed: 12345,
        time_limit_secs: 30,
        diamonds_required: 6,
        amoeba_max_size: 40,
        ..CaveConfig::default()
    };
    let definition = CaveDefinition::from_rows("Demo", DEMO_CAVE, config)?;
    let recording = InputRecording::from_demo_moves(DEMO_MOVES);

    let bytes = recording.to_bytes()?;
    info!(
        "Recording: {} ticks, {} changes, {} bytes, digest {}",
        recording.len(),
        recording.deltas().len(),
        bytes.len(),
        hex::encode(recording.hash())
    );

    let mut state = CaveState::new(&definition, engine.clone())?;
    info!(
        "=== Playing '{}' ({}x{}) ===",
        state.name,
        state.grid.width(),
        state.grid.height()
    );

    let max_ticks = recording.len() + engine.ticks_per_second * 10;
    let mut total_events = 0;

    for (tick, input) in recording.replay_iter().chain(idle_tail(&recording, max_ticks)) {
        let result = advance_one_tick(&mut state, input);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                EventData::ScoreDelta { points, total } => {
                    info!("Tick {}: +{} points ({} total)", tick, points, total);
                }
                EventData::LifeLost => info!("Tick {}: life lost", tick),
                EventData::LevelComplete => info!("Tick {}: cave complete", tick),
                EventData::LevelFailed { cause } => info!("Tick {}: cave failed ({:?})", tick, cause),
                _ => {}
            }
        }

        if result.level_ended {
            info!("Cave ended at tick {}", result.tick);
            break;
        }
    }

    info!("=== Cave Results ===");
    let snapshot = state.snapshot();
    info!(
        "Phase {:?}, diamonds {}/{}, score {}, time left {:?}",
        snapshot.phase,
        snapshot.diamonds_collected,
        snapshot.diamonds_required,
        snapshot.score,
        snapshot.seconds_remaining
    );
    info!("Total events: {}", total_events);

    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying the serialised recording
    info!("=== Verifying Determinism ===");
    let restored = InputRecording::from_bytes(&bytes)?;
    let replay = replay_cave_with(&definition, engine, &restored, max_ticks)?;
    info!("Replay State Hash: {}", hex::encode(replay.final_hash));

    if replay.final_hash != hash {
        bail!("determinism failure: replay hash differs");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}

/// Idle inputs from the end of the recording up to `max_ticks`.
fn idle_tail(
    recording: &InputRecording,
    max_ticks: u32,
) -> impl Iterator<Item = (u32, cave_engine::PlayerInput)> {
    (recording.end_tick + 1..=max_ticks).map(|tick| (tick, cave_engine::PlayerInput::IDLE))
}
