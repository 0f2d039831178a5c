use thiserror::Error;

use crate::event_file::traits::{BaseRunner, FieldingPosition, Inning, LineupPosition, Side};

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseErrorKind {
    #[error("unknown event code \"{0}\"")]
    UnknownEvent(String),

    #[error("expected {expected}, found {found:?}")]
    Unexpected {
        expected: &'static str,
        found: Option<char>,
    },

    #[error("unknown modifier \"/{0}\"")]
    UnknownFlag(String),

    #[error("unknown advance modifier \"({0})\"")]
    UnknownAdvanceModifier(String),

    #[error("more {0} than a single play can record")]
    TooManyCredits(&'static str),
}

/// A play string that does not match the notation grammar.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("could not parse \"{text}\" at position {position}: {kind}")]
pub struct ParseError {
    pub text: String,
    pub position: usize,
    pub kind: ParseErrorKind,
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ReplayError {
    #[error("game {game_id}, inning {inning}, event {event_index}, batter {batter}: {source}")]
    Parse {
        game_id: String,
        inning: Inning,
        event_index: usize,
        batter: String,
        #[source]
        source: ParseError,
    },

    #[error("side code {0} is out of range")]
    SideOutOfRange(u8),

    #[error("lineup position {0} is out of range")]
    LineupOutOfRange(u8),

    #[error("fielding position {0} is out of range")]
    PositionOutOfRange(u8),

    #[error("player id \"{0}\" is not a valid identifier")]
    InvalidPlayerId(String),

    #[error("{player} is not in the current lineup of side {side}")]
    BatterNotInLineup { side: Side, player: String },

    #[error("no player at {position:?} for side {side}")]
    NoFielder {
        side: Side,
        position: FieldingPosition,
    },

    #[error("lineup slot {slot} for side {side} has never been filled")]
    EmptyLineupSlot { side: Side, slot: LineupPosition },

    #[error("advance from {0:?}, which has no runner on it")]
    NoRunner(BaseRunner),

    #[error("runner moved to {0:?}, which is already occupied")]
    BaseOccupied(BaseRunner),

    #[error("pinch runner {player} replaces {replaced}, who is not on base")]
    RunnerNotOnBase { player: String, replaced: String },

    #[error("more than three outs recorded in a half-inning")]
    TooManyOuts,

    #[error("automatic runner cannot be placed on {0:?}")]
    InvalidAutomaticRunnerBase(BaseRunner),
}
