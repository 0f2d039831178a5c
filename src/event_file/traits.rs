use std::convert::TryFrom;

use arrayvec::ArrayString;
use fixed_map::Key;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::event_file::error::ReplayError;

pub type Inning = u8;

pub type Player = ArrayString<8>;
pub type Batter = Player;
pub type Pitcher = Player;
pub type Catcher = Player;
pub type Fielder = Player;

#[derive(
    Debug,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    EnumString,
    Display,
    Hash,
    Copy,
    Clone,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum Side {
    #[strum(serialize = "0")]
    Away = 0,
    #[strum(serialize = "1")]
    Home = 1,
}

impl Side {
    pub const fn flip(self) -> Self {
        match self {
            Self::Away => Self::Home,
            Self::Home => Self::Away,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, ReplayError> {
        Self::try_from(code).map_err(|_| ReplayError::SideOutOfRange(code))
    }
}

impl Default for Side {
    fn default() -> Self {
        Self::Away
    }
}

/// A pair of values, one per team.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Hash, Serialize, Deserialize)]
pub struct Matchup<T> {
    pub away: T,
    pub home: T,
}

impl<T> Matchup<T> {
    pub const fn new(away: T, home: T) -> Self {
        Self { away, home }
    }

    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Away => &self.away,
            Side::Home => &self.home,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Away => &mut self.away,
            Side::Home => &mut self.home,
        }
    }
}

impl<T: Clone> Matchup<T> {
    pub fn both(value: T) -> Self {
        Self {
            away: value.clone(),
            home: value,
        }
    }
}

#[derive(
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    TryFromPrimitive,
    IntoPrimitive,
    Copy,
    Clone,
    Hash,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum LineupPosition {
    PitcherWithDh = 0,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
    Ninth,
}

impl Default for LineupPosition {
    fn default() -> Self {
        Self::First
    }
}

impl LineupPosition {
    /// The slot due up after this one. The non-batting pitcher never bats,
    /// so asking for the slot after it restarts the order.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::PitcherWithDh | Self::Ninth => Self::First,
            Self::First => Self::Second,
            Self::Second => Self::Third,
            Self::Third => Self::Fourth,
            Self::Fourth => Self::Fifth,
            Self::Fifth => Self::Sixth,
            Self::Sixth => Self::Seventh,
            Self::Seventh => Self::Eighth,
            Self::Eighth => Self::Ninth,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, ReplayError> {
        Self::try_from(code).map_err(|_| ReplayError::LineupOutOfRange(code))
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    TryFromPrimitive,
    IntoPrimitive,
    Copy,
    Clone,
    Hash,
    Display,
    EnumIter,
    Key,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum FieldingPosition {
    Unknown = 0,
    Pitcher,
    Catcher,
    FirstBaseman,
    SecondBaseman,
    ThirdBaseman,
    Shortstop,
    LeftFielder,
    CenterFielder,
    RightFielder,
    DesignatedHitter,
    PinchHitter,
    PinchRunner,
}

impl Default for FieldingPosition {
    fn default() -> Self {
        Self::Unknown
    }
}

impl FieldingPosition {
    /// Positions that correspond to a spot on the field (or the DH), as opposed
    /// to the pinch-hitting and pinch-running pseudo-positions.
    pub const fn is_true_position(self) -> bool {
        !matches!(self, Self::Unknown | Self::PinchHitter | Self::PinchRunner)
    }

    pub const fn is_defensive(self) -> bool {
        self.is_true_position() && !matches!(self, Self::DesignatedHitter)
    }

    pub const fn is_pinch(self) -> bool {
        matches!(self, Self::PinchHitter | Self::PinchRunner)
    }

    pub fn from_code(code: u8) -> Result<Self, ReplayError> {
        Self::try_from(code).map_err(|_| ReplayError::PositionOutOfRange(code))
    }

    /// Fielders in play notation are single digits. Zero is the
    /// unknown fielder, which the notation allows in errors like `E0`.
    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .and_then(|d| Self::try_from(d).ok())
    }

    pub fn digit(self) -> char {
        let code: u8 = self.into();
        char::from(b'0' + code % 10)
    }
}

#[derive(
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    EnumString,
    Copy,
    Clone,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum Base {
    #[strum(serialize = "1")]
    First = 1,
    #[strum(serialize = "2")]
    Second,
    #[strum(serialize = "3")]
    Third,
    #[strum(serialize = "H", serialize = "4")]
    Home,
}

impl Base {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::First),
            '2' => Some(Self::Second),
            '3' => Some(Self::Third),
            'H' | '4' => Some(Self::Home),
            _ => None,
        }
    }
}

/// Index of an occupant slot in the base state: the batter plus the three bases.
#[derive(
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    EnumString,
    EnumIter,
    Copy,
    Clone,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum BaseRunner {
    #[strum(serialize = "B")]
    Batter = 0,
    #[strum(serialize = "1")]
    First,
    #[strum(serialize = "2")]
    Second,
    #[strum(serialize = "3")]
    Third,
}

impl BaseRunner {
    pub const ALL: [Self; 4] = [Self::Batter, Self::First, Self::Second, Self::Third];
    pub const RUNNERS: [Self; 3] = [Self::First, Self::Second, Self::Third];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' | '0' => Some(Self::Batter),
            '1' => Some(Self::First),
            '2' => Some(Self::Second),
            '3' => Some(Self::Third),
            _ => None,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().and_then(|i| Self::try_from(i).ok())
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The runner who would be standing on `base` before it is reached.
    pub const fn from_target_base(base: Base) -> Self {
        match base {
            Base::First => Self::Batter,
            Base::Second => Self::First,
            Base::Third => Self::Second,
            Base::Home => Self::Third,
        }
    }
}
