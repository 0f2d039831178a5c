use pbp_replay::event_file::game_iterator::GameIterator;
use pbp_replay::event_file::game_state::{EnteredGameAs, GameState};
use pbp_replay::event_file::traits::{BaseRunner, FieldingPosition, LineupPosition, Side};
use pbp_replay::{ReplayError, ReplayOptions};

use crate::common::{play, player, starters, starters_with_dh, sub, GAME_ID};

fn loaded_bases() -> GameState {
    let mut state = GameState::new(GAME_ID, &starters());
    for record in [
        play(1, 0, "a1", "00", "S7"),
        play(1, 0, "a2", "00", "S7.1-2"),
        play(1, 0, "a3", "00", "S7.2-3;1-2"),
    ] {
        state.apply(&record).unwrap();
    }
    state
}

#[test]
fn pinch_runner_replaces_only_their_base() {
    let mut state = loaded_bases();
    let before = *state.bases();
    state
        .apply(&play(1, 0, "a4", "00", "NP").with_substitution(sub("pr", 0, 2, 12)))
        .unwrap();
    let second = state.base(BaseRunner::Second);
    assert_eq!(second.runner, Some(player("pr")));
    assert_eq!(second.pitcher, before[2].pitcher);
    assert_eq!(second.catcher, before[2].catcher);
    assert_eq!(*state.base(BaseRunner::First), before[1]);
    assert_eq!(*state.base(BaseRunner::Third), before[3]);
    assert_eq!(
        state.batter_slot(Side::Away, player("pr")),
        Some(LineupPosition::Second)
    );
}

#[test]
fn pinch_runner_for_runner_not_on_base_fails() {
    let mut state = loaded_bases();
    let before = state.clone();
    let record = play(1, 0, "a4", "00", "NP").with_substitution(sub("pr", 0, 7, 12));
    assert_eq!(
        state.apply(&record),
        Err(ReplayError::RunnerNotOnBase {
            player: "pr".into(),
            replaced: "a7".into()
        })
    );
    assert_eq!(state, before);
}

#[test]
fn defensive_substitution_updates_fielders() {
    let mut state = GameState::new(GAME_ID, &starters());
    state
        .apply(&play(1, 0, "a1", "00", "63").with_substitution(sub("ss", 1, 2, 6)))
        .unwrap();
    assert_eq!(
        state.fielder(Side::Home, FieldingPosition::Shortstop),
        Ok(player("ss"))
    );
    let slot = state.lineup(Side::Home).slot(LineupPosition::Second);
    assert_eq!(slot.starter().map(|e| e.player), Some(player("h2")));
    assert_eq!(
        slot.current().map(|e| e.entered_game_as),
        Some(EnteredGameAs::DefensiveSubstitution)
    );
    assert_eq!(
        state.fielder(Side::Away, FieldingPosition::DesignatedHitter),
        Err(ReplayError::NoFielder {
            side: Side::Away,
            position: FieldingPosition::DesignatedHitter
        })
    );
}

#[test]
fn position_switch_keeps_the_same_entry() {
    let mut state = GameState::new(GAME_ID, &starters());
    state
        .apply(
            &play(1, 0, "a1", "00", "63")
                .with_substitution(sub("h1", 1, 1, 7))
                .with_substitution(sub("h6", 1, 6, 8)),
        )
        .unwrap();
    let home = state.lineup(Side::Home);
    assert_eq!(home.slot(LineupPosition::First).history().len(), 1);
    assert_eq!(home.fielder(FieldingPosition::LeftFielder), Some(player("h1")));
    assert_eq!(home.fielder(FieldingPosition::CenterFielder), Some(player("h6")));
}

#[test]
fn pinch_hitter_for_dh_becomes_dh() {
    let mut state = GameState::new(GAME_ID, &starters_with_dh());
    assert!(state.lineup(Side::Away).has_dh());
    state
        .apply(&play(1, 0, "a8", "00", "63").with_substitution(sub("ph", 0, 9, 11)))
        .unwrap();
    assert_eq!(
        state.lineup(Side::Away).fielder(FieldingPosition::DesignatedHitter),
        Some(player("adh"))
    );
    state.apply(&play(1, 0, "ph", "00", "K")).unwrap();
    state.apply(&play(1, 1, "h1", "00", "K")).unwrap();

    let away = state.lineup(Side::Away);
    assert!(away.has_dh());
    assert_eq!(
        away.fielder(FieldingPosition::DesignatedHitter),
        Some(player("ph"))
    );
    assert_eq!(
        away.slot(LineupPosition::Ninth).current().map(|e| e.position),
        Some(FieldingPosition::DesignatedHitter)
    );
}

#[test]
fn dh_taking_the_field_ends_the_dh() {
    let mut state = GameState::new(GAME_ID, &starters_with_dh());
    state
        .apply(&play(1, 1, "h1", "00", "63").with_substitution(sub("adh", 0, 9, 7)))
        .unwrap();
    let away = state.lineup(Side::Away);
    assert!(!away.has_dh());
    assert_eq!(away.fielder(FieldingPosition::DesignatedHitter), None);
    assert_eq!(away.fielder(FieldingPosition::LeftFielder), Some(player("adh")));
    assert!(away.slot(LineupPosition::PitcherWithDh).current().is_none());
    assert_eq!(
        away.slot(LineupPosition::PitcherWithDh)
            .starter()
            .map(|e| e.player),
        Some(player("ap"))
    );
}

#[test]
fn pitcher_entering_the_order_ends_the_dh() {
    let mut state = GameState::new(GAME_ID, &starters_with_dh());
    state
        .apply(&play(1, 1, "h1", "00", "63").with_substitution(sub("rp", 0, 5, 1)))
        .unwrap();
    let away = state.lineup(Side::Away);
    assert!(!away.has_dh());
    assert_eq!(away.fielder(FieldingPosition::Pitcher), Some(player("rp")));
    assert_eq!(state.batter_slot(Side::Away, player("rp")), Some(LineupPosition::Fifth));
}

#[test]
fn relief_pitcher_takes_over_slot_zero() {
    let mut state = GameState::new(GAME_ID, &starters_with_dh());
    state
        .apply(&play(1, 1, "h1", "00", "63").with_substitution(sub("rp", 0, 0, 1)))
        .unwrap();
    let away = state.lineup(Side::Away);
    assert!(away.has_dh());
    assert_eq!(state.pitcher(Side::Away), Ok(player("rp")));
}

#[test]
fn strikeout_charged_to_replaced_batter() {
    let records = vec![
        play(1, 0, "a1", "02", "NP").with_substitution(sub("ph", 0, 1, 11)),
        play(1, 0, "ph", "22", "K"),
        play(1, 0, "a2", "02", "NP").with_substitution(sub("ph2", 0, 2, 11)),
        play(1, 0, "ph2", "22", "S7"),
    ];
    let mut iter = GameIterator::new(GAME_ID, &starters(), records, ReplayOptions::default());
    iter.next_event().unwrap();
    iter.next_event().unwrap();
    assert_eq!(iter.charged_batter(), Some(player("a1")));
    iter.next_event().unwrap();
    iter.next_event().unwrap();
    assert_eq!(iter.charged_batter(), Some(player("ph2")));
}

#[test]
fn walk_charged_to_replaced_pitcher() {
    let records = vec![
        play(1, 0, "a1", "31", "NP").with_substitution(sub("rp", 1, 9, 1)),
        play(1, 0, "a1", "41", "W"),
        play(1, 0, "a2", "20", "NP").with_substitution(sub("rp2", 1, 9, 1)),
        play(1, 0, "a2", "21", "S7.1-2"),
    ];
    let mut iter = GameIterator::new(GAME_ID, &starters(), records, ReplayOptions::default());
    iter.next_event().unwrap();
    iter.next_event().unwrap();
    assert_eq!(iter.charged_pitcher(), Some(player("h9")));
    assert_eq!(
        iter.state().base(BaseRunner::First).pitcher,
        Some(player("h9"))
    );
    iter.next_event().unwrap();
    iter.next_event().unwrap();
    assert_eq!(iter.charged_pitcher(), Some(player("rp2")));
    assert_eq!(
        iter.state().base(BaseRunner::First).pitcher,
        Some(player("rp2"))
    );
    assert_eq!(
        iter.state().base(BaseRunner::Second).pitcher,
        Some(player("h9"))
    );
}

#[test]
fn bad_substitution_codes_are_rejected() {
    use pbp_replay::event_file::misc::SubstitutionRecord;
    assert_eq!(
        SubstitutionRecord::new("x", "X", 0, 10, 1),
        Err(ReplayError::LineupOutOfRange(10))
    );
    assert_eq!(
        SubstitutionRecord::new("x", "X", 2, 1, 1),
        Err(ReplayError::SideOutOfRange(2))
    );
}
