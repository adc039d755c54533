//! Property tests for the tick engine.

use cave_engine::game::element::ElementKind;
use cave_engine::game::tick::replay_cave;
use cave_engine::{
    advance_one_tick, CaveConfig, CaveDefinition, CaveState, Direction, InputRecording, Modifier,
    PlayerInput, Pos,
};
use proptest::prelude::*;

fn untimed(seed: u64) -> CaveConfig {
    CaveConfig {
        seed,
        time_limit_secs: 0,
        ..CaveConfig::default()
    }
}

fn rows_of(cells: &[char], width: usize) -> Vec<String> {
    cells.chunks(width).map(|row| row.iter().collect()).collect()
}

fn definition(rows: &[String], config: CaveConfig) -> CaveDefinition {
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    CaveDefinition::from_rows("prop", &refs, config).unwrap()
}

fn arb_cell() -> impl Strategy<Value = char> {
    prop_oneof![
        4 => Just(' '),
        3 => Just('.'),
        1 => Just('w'),
        1 => Just('W'),
        2 => Just('r'),
        2 => Just('d'),
        1 => Just('q'),
        1 => Just('B'),
        1 => Just('a'),
        1 => Just('M'),
        1 => Just('s'),
        1 => Just('x'),
        1 => Just('v'),
        1 => Just('V'),
        1 => Just('G'),
    ]
}

fn arb_gravity_cell() -> impl Strategy<Value = char> {
    prop_oneof![
        4 => Just(' '),
        2 => Just('.'),
        1 => Just('w'),
        1 => Just('W'),
        2 => Just('r'),
        2 => Just('d'),
    ]
}

fn arb_input() -> impl Strategy<Value = PlayerInput> {
    let dir = prop_oneof![
        Just(Direction::None),
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ];
    let modifier = prop_oneof![3 => Just(Modifier::None), 1 => Just(Modifier::Grab)];
    (dir, modifier).prop_map(|(direction, modifier)| PlayerInput { direction, modifier })
}

/// A random cave with the player placed at `player`.
fn arb_cave() -> impl Strategy<Value = (usize, Vec<char>)> {
    (3usize..12, 3usize..10).prop_flat_map(|(w, h)| {
        (
            Just(w),
            prop::collection::vec(arb_cell(), w * h),
            0..w * h,
        )
            .prop_map(|(w, mut cells, player)| {
                cells[player] = 'P';
                (w, cells)
            })
    })
}

fn count(state: &CaveState, kind: ElementKind) -> usize {
    state.grid.count(kind)
}

proptest! {
    #[test]
    fn same_inputs_same_hash(
        (width, cells) in arb_cave(),
        seed in any::<u64>(),
        inputs in prop::collection::vec(arb_input(), 1..60),
    ) {
        let def = definition(&rows_of(&cells, width), CaveConfig { seed, ..CaveConfig::default() });

        let mut recording = InputRecording::new();
        for (i, input) in inputs.iter().enumerate() {
            recording.record(i as u32 + 1, *input);
        }
        recording.finalize(inputs.len() as u32);

        let first = replay_cave(&def, &recording, 80).unwrap();
        let second = replay_cave(&def, &recording, 80).unwrap();
        prop_assert_eq!(first.final_hash, second.final_hash);
        prop_assert_eq!(first.events, second.events);
        prop_assert_eq!(first.state.tick, second.state.tick);
    }

    #[test]
    fn boulder_falls_one_row_per_tick(height in 2u32..20, x in 0u32..5) {
        let mut cells = vec![' '; 5 * height as usize];
        cells[x as usize] = 'r';
        let def = definition(&rows_of(&cells, 5), untimed(1));
        let mut state = CaveState::from_definition(&def).unwrap();

        for t in 1..height {
            advance_one_tick(&mut state, PlayerInput::IDLE);
            let expected = Pos::new(x as i32, t as i32);
            prop_assert_eq!(state.grid.kind(expected), ElementKind::Boulder);
            prop_assert_eq!(count(&state, ElementKind::Boulder), 1);
        }
    }

    #[test]
    fn gravity_conserves_elements(
        cells in prop::collection::vec(arb_gravity_cell(), 64),
        ticks in 1u32..30,
    ) {
        let def = definition(&rows_of(&cells, 8), untimed(7));
        let mut state = CaveState::from_definition(&def).unwrap();
        let boulders = count(&state, ElementKind::Boulder);
        let diamonds = count(&state, ElementKind::Diamond);

        for _ in 0..ticks {
            advance_one_tick(&mut state, PlayerInput::IDLE);
            prop_assert_eq!(count(&state, ElementKind::Boulder), boulders);
            prop_assert_eq!(count(&state, ElementKind::Diamond), diamonds);
        }
    }

    #[test]
    fn push_needs_space_beyond_and_no_grab(
        beyond in prop_oneof![Just(' '), Just('.'), Just('w'), Just('W'), Just('r'), Just('d')],
        grab in any::<bool>(),
        leftwards in any::<bool>(),
    ) {
        let (top, dir, player_x, boulder_x, beyond_x) = if leftwards {
            (format!("{beyond}rP"), Direction::Left, 2, 1, 0)
        } else {
            (format!("Pr{beyond}"), Direction::Right, 0, 1, 2)
        };
        let rows = vec![top, "WWW".to_string()];
        let def = definition(&rows, untimed(3));
        let mut state = CaveState::from_definition(&def).unwrap();

        let input = if grab { PlayerInput::grabbing(dir) } else { PlayerInput::moving(dir) };
        advance_one_tick(&mut state, input);

        let pushed = beyond == ' ' && !grab;
        if pushed {
            prop_assert_eq!(state.grid.kind(Pos::new(beyond_x, 0)), ElementKind::Boulder);
            prop_assert_eq!(state.grid.kind(Pos::new(boulder_x, 0)), ElementKind::Player);
            prop_assert_eq!(state.grid.kind(Pos::new(player_x, 0)), ElementKind::Empty);
        } else {
            prop_assert_eq!(state.grid.kind(Pos::new(boulder_x, 0)), ElementKind::Boulder);
            prop_assert_eq!(state.grid.kind(Pos::new(player_x, 0)), ElementKind::Player);
        }
    }

    #[test]
    fn amoeba_never_shrinks_while_growing(seed in any::<u64>(), ticks in 1u32..40) {
        let mut rows = vec!["WWWWWWWWWWWW".to_string()];
        for y in 1..11 {
            let mut row = String::from("W");
            for x in 1..11 {
                row.push(if (x, y) == (5, 5) { 'a' } else if (x + y) % 3 == 0 { '.' } else { ' ' });
            }
            row.push('W');
            rows.push(row);
        }
        rows.push("WWWWWWWWWWWW".to_string());

        let config = CaveConfig { amoeba_max_size: 1000, ..untimed(seed) };
        let def = definition(&rows, config);
        let mut state = CaveState::from_definition(&def).unwrap();

        for _ in 0..ticks {
            let before = count(&state, ElementKind::Amoeba);
            let settled = state.amoeba.settled.is_some();
            advance_one_tick(&mut state, PlayerInput::IDLE);
            if !settled {
                prop_assert!(count(&state, ElementKind::Amoeba) >= before);
            }
        }
    }
}
