//! Roster positions.
//!
//! A roster entry is either placed on a named slot (`GK`, `DEF`, ...) or at
//! free percentage coordinates on one side of the pitch diagram. Older
//! clients send both forms as a single string, either the slot name or
//! `"<team>_<x>_<y>"`; [`Position::parse_legacy`] reads those.

#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RuleError;

/// Side of the pitch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "HOME"))]
    Home,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "AWAY"))]
    Away,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Away => "AWAY",
        }
    }

    fn legacy_token(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" | "a" => Ok(Self::Home),
            "away" | "b" => Ok(Self::Away),
            _ => Err(RuleError::InvalidPosition(format!("unknown team '{s}'"))),
        }
    }
}

/// Named slot of the older, list-based lineup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NamedSlot {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "GK"))]
    Gk,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "DEF"))]
    Def,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "MID"))]
    Mid,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "FWD"))]
    Fwd,
}

impl NamedSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gk => "GK",
            Self::Def => "DEF",
            Self::Mid => "MID",
            Self::Fwd => "FWD",
        }
    }
}

impl FromStr for NamedSlot {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GK" | "GOALKEEPER" => Ok(Self::Gk),
            "DEF" | "DEFENDER" => Ok(Self::Def),
            "MID" | "MIDFIELDER" => Ok(Self::Mid),
            "FWD" | "FORWARD" => Ok(Self::Fwd),
            _ => Err(RuleError::InvalidPosition(format!("unknown slot '{s}'"))),
        }
    }
}

/// Where a rostered player stands.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Position {
    Slot { slot: NamedSlot },
    /// `x` and `y` are percentages of the pitch width and height.
    Placement { team: Team, x: f64, y: f64 },
}

impl Position {
    pub fn validate(&self) -> Result<(), RuleError> {
        if let Self::Placement { x, y, .. } = *self {
            for (axis, value) in [("x", x), ("y", y)] {
                if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                    return Err(RuleError::InvalidPosition(format!(
                        "{axis} must be between 0 and 100"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parse the single-string encoding used by older clients.
    pub fn parse_legacy(raw: &str) -> Result<Self, RuleError> {
        let raw = raw.trim();
        let parts: Vec<&str> = raw.split('_').collect();
        let position = match parts.as_slice() {
            [team, x, y] => {
                let team: Team = team.parse()?;
                let x = parse_coordinate(x)?;
                let y = parse_coordinate(y)?;
                Self::Placement { team, x, y }
            }
            [slot] => Self::Slot {
                slot: slot.parse()?,
            },
            _ => {
                return Err(RuleError::InvalidPosition(format!(
                    "cannot read '{raw}'"
                )));
            }
        };
        position.validate()?;
        Ok(position)
    }

    /// Render the single-string encoding read by [`Position::parse_legacy`].
    pub fn to_legacy(&self) -> String {
        match self {
            Self::Slot { slot } => slot.as_str().to_string(),
            Self::Placement { team, x, y } => format!("{}_{}_{}", team.legacy_token(), x, y),
        }
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, RuleError> {
    raw.parse::<f64>()
        .map_err(|_| RuleError::InvalidPosition(format!("'{raw}' is not a number")))
}

/// The nullable columns a [`Position`] is stored in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionColumns {
    pub slot: Option<NamedSlot>,
    pub team: Option<Team>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl PositionColumns {
    /// Rebuild the position. Rows with a partial placement read as unplaced.
    pub fn to_position(&self) -> Option<Position> {
        match (self.slot, self.team, self.x, self.y) {
            (_, Some(team), Some(x), Some(y)) => Some(Position::Placement { team, x, y }),
            (Some(slot), _, _, _) => Some(Position::Slot { slot }),
            _ => None,
        }
    }
}

impl From<Option<Position>> for PositionColumns {
    fn from(position: Option<Position>) -> Self {
        match position {
            Some(Position::Slot { slot }) => Self {
                slot: Some(slot),
                ..Default::default()
            },
            Some(Position::Placement { team, x, y }) => Self {
                slot: None,
                team: Some(team),
                x: Some(x),
                y: Some(y),
            },
            None => Self::default(),
        }
    }
}
