use pbp_replay::event_file::event_data::Advance;
use pbp_replay::event_file::game_iterator::GameIterator;
use pbp_replay::event_file::game_state::GameState;
use pbp_replay::event_file::misc::{Annotations, EventRecord, RunnerAdjustment};
use pbp_replay::event_file::traits::{BaseRunner, LineupPosition, Side};
use pbp_replay::{replay_game, ReplayError, ReplayOptions};

use crate::common::{play, player, starters, sub, GAME_ID};

fn run(records: &[EventRecord]) -> GameState {
    let mut state = GameState::new(GAME_ID, &starters());
    for record in records {
        state.apply(record).unwrap();
    }
    state
}

fn automatic_runner(inning: u8, batter: &str, runner: &str, text: &str) -> EventRecord {
    play(inning, 0, batter, "00", text).with_annotations(Annotations {
        automatic_runner: Some(RunnerAdjustment {
            runner: player(runner),
            base: BaseRunner::Second,
        }),
        ..Annotations::default()
    })
}

#[test]
fn full_half_inning() {
    let state = run(&[
        play(1, 0, "a1", "10", "S7"),
        play(1, 0, "a2", "31", "W.1-2"),
        play(1, 0, "a3", "00", "54(1)/FO.2-3"),
        play(1, 0, "a4", "12", "S9.3-H;1-2"),
        play(1, 0, "a5", "01", "64(1)3/GDP"),
    ]);
    assert_eq!(state.outs(), 3);
    assert_eq!(state.score(Side::Away), 1);
    assert_eq!(state.hits(Side::Away), 2);
    assert_eq!(state.inning_batters(), 5);
    assert_eq!(state.inning_runs(), 1);
    assert_eq!(state.base(BaseRunner::Second).runner, Some(player("a3")));
    assert_eq!(state.lineup(Side::Away).next_up(), LineupPosition::Sixth);
}

#[test]
fn side_change_resets_half_inning() {
    let state = run(&[
        play(1, 0, "a1", "00", "S7"),
        play(1, 0, "a2", "00", "D8.1-3"),
        play(1, 0, "a3", "00", "K"),
        play(1, 0, "a4", "00", "8"),
        play(1, 0, "a5", "00", "63"),
        play(1, 1, "h1", "00", "43"),
    ]);
    assert_eq!(state.batting_side(), Side::Home);
    assert_eq!(state.left_on_base(Side::Away), 2);
    assert_eq!(state.inning_batters(), 1);
    assert_eq!(state.inning_runs(), 0);
    assert_eq!(state.outs(), 1);
    assert!(BaseRunner::RUNNERS
        .iter()
        .all(|b| !state.base(*b).is_occupied()));
}

#[test]
fn early_side_change_is_tolerated() {
    let state = run(&[
        play(1, 0, "a1", "00", "S7"),
        play(1, 1, "h1", "00", "S7"),
    ]);
    assert_eq!(state.base(BaseRunner::First).runner, Some(player("h1")));
    assert_eq!(state.left_on_base(Side::Away), 1);
}

#[test]
fn responsibility_cascade_reaches_batter() {
    let state = run(&[
        play(1, 0, "a1", "00", "S7"),
        play(1, 0, "a2", "00", "NP").with_substitution(sub("rp", 1, 9, 1)),
        play(1, 0, "a2", "00", "S8.1-2"),
        play(1, 0, "a3", "00", "FC6.2X3(65);1-2"),
    ]);
    // The runner forced at third was the original pitcher's; the runner
    // who moved up to second takes that charge and the batter inherits the
    // reliever's.
    let second = state.base(BaseRunner::Second);
    assert_eq!(second.runner, Some(player("a2")));
    assert_eq!(second.pitcher, Some(player("h9")));
    let first = state.base(BaseRunner::First);
    assert_eq!(first.runner, Some(player("a3")));
    assert_eq!(first.pitcher, Some(player("rp")));

    let mut state = state;
    let outcome = state.apply(&play(1, 0, "a4", "00", "D7.2-H;1-H")).unwrap();
    assert_eq!(outcome.runs.len(), 2);
    assert_eq!(state.pitcher_runs(player("h9")).runs, 1);
    assert_eq!(state.pitcher_runs(player("rp")).runs, 1);
}

#[test]
fn runner_moves_after_out_on_the_play() {
    let state = run(&[
        play(1, 0, "a1", "00", "S7"),
        play(1, 0, "a2", "00", "S7.1-2"),
        play(1, 0, "a3", "00", "5(2)/FO.1-2"),
    ]);
    assert_eq!(state.outs(), 1);
    assert_eq!(state.base(BaseRunner::Second).runner, Some(player("a2")));
    assert_eq!(state.base(BaseRunner::First).runner, Some(player("a3")));
}

#[test]
fn automatic_runner_scores_unearned() {
    let mut state = run(&[play(9, 1, "h1", "00", "63")]);
    let outcome = state
        .apply(&automatic_runner(10, "a1", "a9", "S7.2-H"))
        .unwrap();
    assert_eq!(state.inning(), 10);
    assert_eq!(outcome.runs.len(), 1);
    assert_eq!(outcome.runs[0].runner, player("a9"));
    assert_eq!(outcome.runs[0].advance, Advance::ScoredAutomatic);
    let tally = state.pitcher_runs(player("h9"));
    assert_eq!(tally.runs, 1);
    assert_eq!(tally.earned_runs, 0);
}

#[test]
fn automatic_runner_needs_a_free_base() {
    let mut state = run(&[play(10, 0, "a1", "00", "D7")]);
    let before = state.clone();
    assert_eq!(
        state.apply(&automatic_runner(10, "a2", "a9", "K")),
        Err(ReplayError::BaseOccupied(BaseRunner::Second))
    );
    assert_eq!(state, before);

    let record = play(10, 0, "a2", "00", "K").with_annotations(Annotations {
        automatic_runner: Some(RunnerAdjustment {
            runner: player("a9"),
            base: BaseRunner::Batter,
        }),
        ..Annotations::default()
    });
    assert_eq!(
        state.apply(&record),
        Err(ReplayError::InvalidAutomaticRunnerBase(BaseRunner::Batter))
    );
}

#[test]
fn automatic_runner_fate() {
    let records = vec![
        play(9, 1, "h1", "00", "63"),
        automatic_runner(10, "a1", "a9", "K"),
        play(10, 0, "a2", "00", "S9.2-H"),
    ];
    let mut iter = GameIterator::new(GAME_ID, &starters(), records, ReplayOptions::default());
    iter.next_event().unwrap();
    iter.next_event().unwrap();
    assert_eq!(
        iter.runner_fate(BaseRunner::Second),
        Ok(Advance::ScoredAutomatic)
    );
}

#[test]
fn lineup_adjustment_sets_next_batter() {
    let mut state = run(&[play(1, 0, "a1", "00", "S7")]);
    let record = play(1, 0, "a4", "00", "K").with_annotations(Annotations {
        lineup: Some(pbp_replay::event_file::misc::LineupAdjustment {
            side: Side::Away,
            lineup_position: LineupPosition::Fourth,
        }),
        ..Annotations::default()
    });
    state.apply(&record).unwrap();
    assert_eq!(state.lineup(Side::Away).next_up(), LineupPosition::Fifth);
}

#[test]
fn hand_overrides_last_one_play() {
    let mut state = GameState::new(GAME_ID, &starters());
    let record = play(1, 0, "a1", "00", "NP").with_annotations(Annotations {
        batter_hand: Some(pbp_replay::event_file::misc::HandAdjustment {
            player: player("a1"),
            hand: pbp_replay::event_file::misc::Hand::Left,
        }),
        ..Annotations::default()
    });
    state.apply(&record).unwrap();
    assert_eq!(state.unusual_state().batter_hand, None);
}

#[test]
fn replay_is_repeatable() {
    let records = vec![
        play(1, 0, "a1", "00", "S7"),
        play(1, 0, "a2", "00", "W.1-2"),
        play(1, 0, "a3", "00", "FC5.2X3(5);1-2"),
        play(1, 0, "a4", "00", "HR.2-H;1-H"),
        play(1, 0, "a5", "00", "K"),
        play(1, 0, "a6", "00", "8"),
        play(1, 1, "h1", "00", "E6"),
        play(1, 1, "h2", "00", "SB2"),
    ];
    let first = replay_game(GAME_ID, &starters(), records.clone(), ReplayOptions::default());
    let second = replay_game(GAME_ID, &starters(), records, ReplayOptions::default());
    assert!(first.is_ok());
    assert_eq!(first, second);

    let mut state = first.unwrap();
    assert_eq!(state.summary().score.away, 3);
    assert_eq!(state.summary().errors.away, 1);
    assert_eq!(state.game_winning_rbi(), Some(player("a4")));
    state.reset(&starters());
    assert_eq!(state, GameState::new(GAME_ID, &starters()));
}
