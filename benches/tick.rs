//! Criterion benchmarks for the cave tick.

use cave_engine::game::config::{CaveConfig, CaveDefinition, InitialCell};
use cave_engine::game::element::ElementKind;
use cave_engine::{advance_one_tick, CaveState, Direction, PlayerInput};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Kinds a random cave is filled with, weighted by repetition.
const FILL: &[ElementKind] = &[
    ElementKind::Empty,
    ElementKind::Empty,
    ElementKind::Empty,
    ElementKind::Dirt,
    ElementKind::Dirt,
    ElementKind::Dirt,
    ElementKind::Boulder,
    ElementKind::Boulder,
    ElementKind::Diamond,
    ElementKind::BrickWall,
    ElementKind::Firefly,
    ElementKind::Butterfly,
    ElementKind::Amoeba,
    ElementKind::MagicWall,
    ElementKind::Slime,
];

/// A walled random cave with the player in the top-left corner.
fn random_cave(width: u32, height: u32, seed: u64) -> CaveDefinition {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cells = Vec::with_capacity((width * height) as usize);

    for y in 0..height {
        for x in 0..width {
            let kind = if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                ElementKind::SteelWall
            } else if (x, y) == (1, 1) {
                ElementKind::Player
            } else {
                FILL[rng.gen_range(0..FILL.len())]
            };
            cells.push(InitialCell::of(kind));
        }
    }

    CaveDefinition {
        name: format!("bench-{width}x{height}"),
        width,
        height,
        cells,
        config: CaveConfig {
            seed,
            time_limit_secs: 0,
            amoeba_max_size: width * height,
            magic_wall_secs: 1000,
            ..CaveConfig::default()
        },
    }
}

/// Benchmark: one tick on random caves of increasing size.
fn bench_tick_random_caves(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_random_cave");

    for &(w, h) in &[(40u32, 22u32), (100, 100), (256, 256)] {
        let def = random_cave(w, h, 42);
        let start = CaveState::from_definition(&def).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(format!("{w}x{h}")), &start, |b, start| {
            b.iter_batched(
                || start.clone(),
                |mut state| {
                    let result = advance_one_tick(&mut state, PlayerInput::IDLE);
                    black_box(result);
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Benchmark: 100 ticks of a standard-size cave with the player walking.
fn bench_hundred_ticks(c: &mut Criterion) {
    let def = random_cave(40, 22, 7);
    let start = CaveState::from_definition(&def).unwrap();
    let moves = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];

    c.bench_function("hundred_ticks_40x22", |b| {
        b.iter_batched(
            || start.clone(),
            |mut state| {
                for i in 0..100usize {
                    let input = PlayerInput::moving(moves[(i / 5) % moves.len()]);
                    black_box(advance_one_tick(&mut state, input));
                }
                state
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

/// Benchmark: state hashing of a large cave.
fn bench_state_hash(c: &mut Criterion) {
    let def = random_cave(256, 256, 9);
    let state = CaveState::from_definition(&def).unwrap();

    c.bench_function("state_hash_256x256", |b| {
        b.iter(|| black_box(state.compute_hash()));
    });
}

criterion_group!(
    benches,
    bench_tick_random_caves,
    bench_hundred_ticks,
    bench_state_hash
);
criterion_main!(benches);
