use pbp_replay::event_file::misc::{EventRecord, PlayRecord, StartRecord, SubstitutionRecord};
use pbp_replay::event_file::traits::Player;

pub const GAME_ID: &str = "TST202004010";

pub fn player(id: &str) -> Player {
    Player::from(id).unwrap()
}

/// Nine starters a side with no designated hitter. The pitcher bats ninth and
/// the catcher eighth; ids are `a1`..`a9` and `h1`..`h9`.
pub fn starters() -> Vec<StartRecord> {
    let mut starters = vec![];
    for (side, prefix) in [(0, "a"), (1, "h")] {
        for slot in 1..=9_u8 {
            let position = [8, 6, 3, 9, 5, 7, 4, 2, 1][usize::from(slot - 1)];
            let id = format!("{prefix}{slot}");
            starters.push(StartRecord::new(&id, &id, side, slot, position).unwrap());
        }
    }
    starters
}

/// Same as [`starters`] but the away team uses `adh` as designated hitter in
/// the ninth slot and `ap` pitches without batting.
pub fn starters_with_dh() -> Vec<StartRecord> {
    let mut starters = starters();
    starters.retain(|s| s.player.as_str() != "a9");
    starters.push(StartRecord::new("adh", "Designated Hitter", 0, 9, 10).unwrap());
    starters.push(StartRecord::new("ap", "Away Pitcher", 0, 0, 1).unwrap());
    starters
}

pub fn play(inning: u8, side: u8, batter: &str, count: &str, text: &str) -> EventRecord {
    PlayRecord::new(inning, side, batter, count, "", text)
        .unwrap()
        .into()
}

pub fn sub(player: &str, side: u8, slot: u8, position: u8) -> SubstitutionRecord {
    SubstitutionRecord::new(player, player, side, slot, position).unwrap()
}
