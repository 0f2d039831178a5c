use arrayvec::ArrayVec;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use strum_macros::{Display, EnumIter, EnumString};

use crate::event_file::traits::{Base, BaseRunner, FieldingPosition};

pub const MAX_PUTOUTS: usize = 3;
pub const MAX_ASSISTS: usize = 10;
pub const MAX_ERRORS: usize = 10;
pub const MAX_TOUCHES: usize = 20;

pub type PutoutVec = ArrayVec<FieldingPosition, MAX_PUTOUTS>;
pub type AssistVec = ArrayVec<FieldingPosition, MAX_ASSISTS>;
pub type ErrorVec = ArrayVec<FieldingError, MAX_ERRORS>;
pub type TouchVec = ArrayVec<FieldingPosition, MAX_TOUCHES>;

/// Event type codes. The numbering is the one used by Retrosheet's
/// event files and downstream tools, so it must never change.
#[derive(
    Debug,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    Copy,
    Clone,
    Hash,
    Display,
    EnumIter,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize_repr,
    Deserialize_repr,
)]
#[repr(u8)]
pub enum EventKind {
    Unknown = 0,
    None = 1,
    GenericOut = 2,
    Strikeout = 3,
    StolenBase = 4,
    DefensiveIndifference = 5,
    CaughtStealing = 6,
    PickoffError = 7,
    Pickoff = 8,
    WildPitch = 9,
    PassedBall = 10,
    Balk = 11,
    OtherAdvance = 12,
    FoulBallError = 13,
    Walk = 14,
    IntentionalWalk = 15,
    HitByPitch = 16,
    Interference = 17,
    Error = 18,
    FieldersChoice = 19,
    Single = 20,
    Double = 21,
    Triple = 22,
    HomeRun = 23,
    Missing = 24,
}

impl Default for EventKind {
    fn default() -> Self {
        Self::Unknown
    }
}

impl EventKind {
    pub const fn is_hit(self) -> bool {
        matches!(
            self,
            Self::Single | Self::Double | Self::Triple | Self::HomeRun
        )
    }

    pub const fn is_walk(self) -> bool {
        matches!(self, Self::Walk | Self::IntentionalWalk)
    }

    /// Whether the event ends the batter's plate appearance.
    pub const fn is_batter_event(self) -> bool {
        matches!(
            self,
            Self::GenericOut
                | Self::Strikeout
                | Self::Walk
                | Self::IntentionalWalk
                | Self::HitByPitch
                | Self::Interference
                | Self::Error
                | Self::FieldersChoice
                | Self::Single
                | Self::Double
                | Self::Triple
                | Self::HomeRun
        )
    }

    /// Base the batter reaches when the advancement clause doesn't say otherwise.
    pub const fn implied_batter_advance(self) -> Advance {
        match self {
            Self::Single
            | Self::Walk
            | Self::IntentionalWalk
            | Self::HitByPitch
            | Self::Interference
            | Self::Error
            | Self::FieldersChoice => Advance::First,
            Self::Double => Advance::Second,
            Self::Triple => Advance::Third,
            Self::HomeRun => Advance::Scored,
            _ => Advance::None,
        }
    }
}

/// Destination of an occupant slot at the end of a play.
#[derive(
    Debug,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    Copy,
    Clone,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize_repr,
    Deserialize_repr,
)]
#[repr(u8)]
pub enum Advance {
    None = 0,
    First = 1,
    Second = 2,
    Third = 3,
    Scored = 4,
    ScoredUnearned = 5,
    ScoredTeamUnearned = 6,
    ScoredAutomatic = 7,
}

impl Default for Advance {
    fn default() -> Self {
        Self::None
    }
}

impl From<Base> for Advance {
    fn from(base: Base) -> Self {
        match base {
            Base::First => Self::First,
            Base::Second => Self::Second,
            Base::Third => Self::Third,
            Base::Home => Self::Scored,
        }
    }
}

impl Advance {
    pub const fn scored(self) -> bool {
        matches!(
            self,
            Self::Scored | Self::ScoredUnearned | Self::ScoredTeamUnearned | Self::ScoredAutomatic
        )
    }

    /// Runs charged to the pitcher as earned. A team-unearned run is still
    /// earned for the pitcher.
    pub const fn earned_for_pitcher(self) -> bool {
        matches!(self, Self::Scored | Self::ScoredTeamUnearned)
    }

    /// The occupant slot this destination corresponds to, if it is a base.
    pub const fn base_runner(self) -> Option<BaseRunner> {
        match self {
            Self::First => Some(BaseRunner::First),
            Self::Second => Some(BaseRunner::Second),
            Self::Third => Some(BaseRunner::Third),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}

pub type RbiFlag = i8;
pub const RBI_SUPPRESSED: RbiFlag = -1;
pub const RBI_NONE: RbiFlag = 0;
pub const RBI_INFERRED: RbiFlag = 1;
pub const RBI_EXPLICIT: RbiFlag = 2;

#[derive(
    Debug,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    Copy,
    Clone,
    Hash,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
pub enum Trajectory {
    #[strum(serialize = "G")]
    GroundBall,
    #[strum(serialize = "F")]
    Fly,
    #[strum(serialize = "L")]
    LineDrive,
    #[strum(serialize = "P")]
    PopUp,
    #[strum(serialize = "")]
    Unknown,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Trajectory {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'G' => Some(Self::GroundBall),
            'F' => Some(Self::Fly),
            'L' => Some(Self::LineDrive),
            'P' => Some(Self::PopUp),
            _ => None,
        }
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, EnumString, Display, Serialize, Deserialize)]
pub enum ErrorType {
    #[strum(serialize = "F")]
    Fielding,
    #[strum(serialize = "T")]
    Throwing,
    #[strum(serialize = "D")]
    DroppedThrow,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct FieldingError {
    pub fielder: FieldingPosition,
    pub error_type: ErrorType,
}

/// Everything a single play string says about a play.
///
/// Per-slot arrays are indexed by [`BaseRunner`]: slot 0 is the batter, 1-3 are
/// the runners on those bases at the start of the play.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct EventData {
    pub event_kind: EventKind,
    pub advance: [Advance; 4],
    pub out_flag: [bool; 4],
    pub rbi_flag: [RbiFlag; 4],
    pub fc_flag: [bool; 4],
    pub muff_flag: [bool; 4],
    pub play: [String; 4],
    pub sb_flag: [bool; 4],
    pub cs_flag: [bool; 4],
    pub po_flag: [bool; 4],
    pub sh_flag: bool,
    pub sf_flag: bool,
    pub dp_flag: bool,
    pub gdp_flag: bool,
    pub tp_flag: bool,
    pub wp_flag: bool,
    pub pb_flag: bool,
    pub foul_flag: bool,
    pub bunt_flag: bool,
    pub force_flag: bool,
    pub putouts: PutoutVec,
    pub assists: AssistVec,
    pub errors: ErrorVec,
    pub touches: TouchVec,
    pub fielded_by: FieldingPosition,
    pub batted_ball_type: Trajectory,
    pub hit_location: String,
}

impl EventData {
    pub fn advance_of(&self, runner: BaseRunner) -> Advance {
        self.advance[runner.index()]
    }

    pub fn is_out(&self, runner: BaseRunner) -> bool {
        self.out_flag[runner.index()]
    }

    pub fn num_outs(&self) -> usize {
        self.out_flag.iter().filter(|o| **o).count()
    }

    pub fn num_runs(&self) -> usize {
        self.advance.iter().filter(|a| a.scored()).count()
    }

    pub fn rbi_credited(&self, runner: BaseRunner) -> bool {
        self.rbi_flag[runner.index()] > RBI_NONE
    }

    pub fn num_rbi(&self) -> usize {
        BaseRunner::ALL
            .iter()
            .filter(|r| self.advance_of(**r).scored() && self.rbi_credited(**r))
            .count()
    }

    /// Whether fielding credit on any slot was recorded as unknown.
    pub fn has_unknown_credit(&self) -> bool {
        self.play.iter().any(|p| p == "99")
    }
}
