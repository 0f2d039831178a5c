use proptest::prelude::*;

use pbp_replay::event_file::event_data::{Advance, EventKind};
use pbp_replay::event_file::misc::EventRecord;
use pbp_replay::{parse, replay_game, ReplayOptions};

use crate::common::{play, starters, GAME_ID};

const PLAY_POOL: [&str; 16] = [
    "S7", "D8", "T9", "HR", "K", "W", "63", "8", "E6", "SB2", "CS2(24)", "WP.1-2", "S9.1-3",
    "64(1)3/GDP", "FC6.1X2(64)", "NP",
];

fn notation_like() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            'S', 'D', 'T', 'H', 'R', 'K', 'E', 'W', 'F', 'C', 'B', 'P', 'O', 'X', '1', '2', '3',
            '4', '6', '9', '(', ')', '/', '.', ';', '+', '-', '#', '!', '?',
        ]),
        0..24,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn records(plays: &[&str]) -> Vec<EventRecord> {
    plays
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let batter = format!("a{}", i % 9 + 1);
            play(1, 0, &batter, "00", text)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Arbitrary input either parses or fails with an error.
    #[test]
    fn parse_never_panics(input in "\\PC{0,40}") {
        let _ = parse(&input);
    }

    #[test]
    fn parse_never_panics_on_notation_like_input(input in notation_like()) {
        let _ = parse(&input);
    }

    #[test]
    fn hits_imply_batter_destination(
        (code, kind, advance) in prop::sample::select(vec![
            ("S", EventKind::Single, Advance::First),
            ("D", EventKind::Double, Advance::Second),
            ("T", EventKind::Triple, Advance::Third),
        ]),
        fielder in 1..=9_u8,
    ) {
        let event = parse(&format!("{code}{fielder}")).unwrap();
        prop_assert_eq!(event.event_kind, kind);
        prop_assert_eq!(event.advance[0], advance);
        prop_assert_eq!(event.num_outs(), 0);
    }

    /// Replays are deterministic, including the ones that fail.
    #[test]
    fn replay_is_deterministic(plays in prop::collection::vec(prop::sample::select(PLAY_POOL.to_vec()), 0..30)) {
        let first = replay_game(GAME_ID, &starters(), records(&plays), ReplayOptions::default());
        let second = replay_game(GAME_ID, &starters(), records(&plays), ReplayOptions::default());
        prop_assert_eq!(first, second);
    }
}

#[test]
fn home_run_scores_batter_with_rbi() {
    let event = parse("HR").unwrap();
    assert_eq!(event.advance[0], Advance::Scored);
    assert_eq!(event.num_rbi(), 1);
}
