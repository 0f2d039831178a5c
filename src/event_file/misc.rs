use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use crate::event_file::error::ReplayError;
use crate::event_file::traits::{
    BaseRunner, FieldingPosition, Inning, LineupPosition, Pitcher, Player, Side,
};
use crate::util::str_to_player;

#[derive(Debug, Eq, PartialEq, EnumString, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum Hand {
    #[strum(serialize = "L")]
    Left,
    #[strum(serialize = "R")]
    Right,
    #[strum(serialize = "S", serialize = "B")]
    Switch,
    #[strum(serialize = "?")]
    Unknown,
}

/// Balls and strikes at the time of the event. Either may be unknown.
#[derive(Debug, Default, Eq, PartialEq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct Count {
    pub balls: Option<u8>,
    pub strikes: Option<u8>,
}

impl Count {
    pub fn new(count_str: &str) -> Self {
        let mut ints = count_str
            .chars()
            .map(|c| c.to_digit(10).and_then(|i| u8::try_from(i).ok()));
        Self {
            balls: ints.next().flatten(),
            strikes: ints.next().flatten(),
        }
    }

    /// Rule 9.15(b): a batter leaving with two strikes is charged with
    /// the strikeout if their replacement completes it.
    pub fn is_old_batter_responsible_strikeout(self) -> bool {
        self.strikes == Some(2)
    }

    /// Rule 9.16(h): a pitcher leaving behind in the count is charged with
    /// the walk if their replacement completes it.
    pub fn is_old_pitcher_responsible_walk(self) -> bool {
        match (self.balls, self.strikes) {
            (Some(b), Some(s)) => b >= 2 && b > s,
            _ => false,
        }
    }
}

/// A `play` record as handed over by the event file reader.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct PlayRecord {
    pub inning: Inning,
    pub batting_side: Side,
    pub batter: Player,
    pub count: Count,
    pub pitch_sequence: String,
    pub play: String,
}

impl PlayRecord {
    pub fn new(
        inning: Inning,
        side: u8,
        batter: &str,
        count: &str,
        pitch_sequence: &str,
        play: &str,
    ) -> Result<Self, ReplayError> {
        Ok(Self {
            inning,
            batting_side: Side::from_code(side)?,
            batter: str_to_player(batter)?,
            count: Count::new(count),
            pitch_sequence: pitch_sequence.to_string(),
            play: play.to_string(),
        })
    }
}

/// A `start` or `sub` record.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct AppearanceRecord {
    pub player: Player,
    pub name: String,
    pub side: Side,
    pub lineup_position: LineupPosition,
    pub fielding_position: FieldingPosition,
}

pub type StartRecord = AppearanceRecord;
pub type SubstitutionRecord = AppearanceRecord;

impl AppearanceRecord {
    pub fn new(
        player: &str,
        name: &str,
        side: u8,
        lineup_position: u8,
        fielding_position: u8,
    ) -> Result<Self, ReplayError> {
        Ok(Self {
            player: str_to_player(player)?,
            name: name.to_string(),
            side: Side::from_code(side)?,
            lineup_position: LineupPosition::from_code(lineup_position)?,
            fielding_position: FieldingPosition::from_code(fielding_position)?,
        })
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct HandAdjustment {
    pub player: Player,
    pub hand: Hand,
}

pub type BatHandAdjustment = HandAdjustment;
pub type PitchHandAdjustment = HandAdjustment;

/// Corrects who is due up next, typically after batting out of turn.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct LineupAdjustment {
    pub side: Side,
    pub lineup_position: LineupPosition,
}

/// Places a runner on base without a play, as in the extra-innings tiebreaker.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct RunnerAdjustment {
    pub runner: Player,
    pub base: BaseRunner,
}

/// Pitcher charged with a runner, overriding the usual assignment.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct PitcherResponsibilityAdjustment {
    pub pitcher: Pitcher,
    pub base: BaseRunner,
}

/// Out-of-band directives that precede the play they apply to.
#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Annotations {
    pub batter_hand: Option<BatHandAdjustment>,
    pub pitcher_hand: Option<PitchHandAdjustment>,
    pub lineup: Option<LineupAdjustment>,
    pub automatic_runner: Option<RunnerAdjustment>,
    pub pitcher_responsibility: Vec<PitcherResponsibilityAdjustment>,
}

/// One play plus everything attached to it.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub annotations: Annotations,
    pub play: PlayRecord,
    #[serde(default)]
    pub substitutions: Vec<SubstitutionRecord>,
}

impl From<PlayRecord> for EventRecord {
    fn from(play: PlayRecord) -> Self {
        Self {
            annotations: Annotations::default(),
            play,
            substitutions: vec![],
        }
    }
}

impl EventRecord {
    #[must_use]
    pub fn with_substitution(mut self, sub: SubstitutionRecord) -> Self {
        self.substitutions.push(sub);
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}
