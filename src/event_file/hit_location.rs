use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Eq, PartialEq, EnumString, Display, Copy, Clone, Serialize, Deserialize)]
pub enum HitLocationGeneral {
    #[strum(serialize = "1")]
    Pitcher,
    #[strum(serialize = "13")]
    PitcherFirst,
    #[strum(serialize = "15")]
    PitcherThird,
    #[strum(serialize = "2")]
    Catcher,
    #[strum(serialize = "23")]
    CatcherFirst,
    #[strum(serialize = "25")]
    CatcherThird,
    #[strum(serialize = "3")]
    First,
    #[strum(serialize = "34")]
    FirstSecond,
    #[strum(serialize = "4")]
    Second,
    #[strum(serialize = "46")]
    SecondShortstop,
    #[strum(serialize = "5")]
    Third,
    #[strum(serialize = "56")]
    ThirdShortstop,
    #[strum(serialize = "6")]
    Shortstop,
    #[strum(serialize = "7")]
    Left,
    #[strum(serialize = "78")]
    LeftCenter,
    #[strum(serialize = "8")]
    Center,
    #[strum(serialize = "89")]
    RightCenter,
    #[strum(serialize = "9")]
    Right,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
pub enum HitStrength {
    Hard,
    Soft,
    #[default]
    Default,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
pub enum HitDepth {
    Shallow,
    Deep,
    ExtraDeep,
    #[default]
    Default,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
pub enum HitAngle {
    Middle,
    FoulLine,
    #[default]
    Default,
}

/// A hit location code such as `78XD`, `9LS` or `5F+`, broken into its parts.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct HitLocation {
    pub general_location: HitLocationGeneral,
    pub angle: HitAngle,
    pub depth: HitDepth,
    pub foul: bool,
    pub strength: HitStrength,
}

impl FromStr for HitLocation {
    type Err = ();

    /// The general location is a table lookup on the leading digits; the
    /// remaining modifiers must come in angle, depth, foul, strength order and
    /// each may appear at most once.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let split = value
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(value.len());
        let (digits, mut rest) = value.split_at(split);
        let general_location = HitLocationGeneral::from_str(digits).map_err(|_| ())?;

        let mut take = |prefix: &str| -> bool {
            if let Some(r) = rest.strip_prefix(prefix) {
                rest = r;
                true
            } else {
                false
            }
        };

        let angle = if take("M") {
            HitAngle::Middle
        } else if take("L") || take("R") {
            HitAngle::FoulLine
        } else {
            HitAngle::Default
        };
        let depth = if take("XD") {
            HitDepth::ExtraDeep
        } else if take("S") {
            HitDepth::Shallow
        } else if take("D") {
            HitDepth::Deep
        } else {
            HitDepth::Default
        };
        let foul = take("F");
        let strength = if take("+") {
            HitStrength::Hard
        } else if take("-") {
            HitStrength::Soft
        } else {
            HitStrength::Default
        };

        if rest.is_empty() {
            Ok(Self {
                general_location,
                angle,
                depth,
                foul,
                strength,
            })
        } else {
            Err(())
        }
    }
}

pub fn is_hit_location(code: &str) -> bool {
    HitLocation::from_str(code).is_ok()
}
