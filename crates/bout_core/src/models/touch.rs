use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::action::RecordedAction;
use crate::error::ModelError;

/// Strip colour of a fencer. The colour tags a side of one match, not a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Green,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Green,
            Side::Green => Side::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Red => "red",
            Side::Green => "green",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Side> {
        match tag {
            "red" => Some(Side::Red),
            "green" => Some(Side::Green),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target zone on the strip, 1..=6.
///
/// Zones 1-3 are the scorer's own half, 4-6 the opponent's half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Zone(u8);

impl Zone {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;
    pub const ALL: [Zone; 6] = [Zone(1), Zone(2), Zone(3), Zone(4), Zone(5), Zone(6)];

    pub fn new(zone: u8) -> Option<Zone> {
        (Self::MIN..=Self::MAX).contains(&zone).then_some(Zone(zone))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_own_half(self) -> bool {
        self.0 <= 3
    }

    pub fn is_opponent_half(self) -> bool {
        !self.is_own_half()
    }
}

impl Default for Zone {
    fn default() -> Self {
        Zone(1)
    }
}

impl TryFrom<u8> for Zone {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Zone::new(value).ok_or(ModelError::InvalidZone(value as i64))
    }
}

impl From<Zone> for u8 {
    fn from(zone: Zone) -> Self {
        zone.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreLine {
    pub red: u32,
    pub green: u32,
}

impl ScoreLine {
    pub fn new(red: u32, green: u32) -> Self {
        Self { red, green }
    }

    pub fn of(&self, side: Side) -> u32 {
        match side {
            Side::Red => self.red,
            Side::Green => self.green,
        }
    }

    pub fn bump(&mut self, side: Side) {
        match side {
            Side::Red => self.red += 1,
            Side::Green => self.green += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.red + self.green
    }

    pub fn as_pair(&self) -> (u32, u32) {
        (self.red, self.green)
    }
}

impl fmt::Display for ScoreLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.red, self.green)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    Single,
    /// One half of a double touch; `partner` is the side of the sibling record.
    Double { partner: Side },
}

impl TouchKind {
    pub fn is_double(self) -> bool {
        matches!(self, TouchKind::Double { .. })
    }
}

/// One scoring record inside a match.
#[derive(Debug, Clone, PartialEq)]
pub struct Touch {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    /// Scoring side. Older records may only carry a name.
    pub side: Option<Side>,
    /// Name of the scorer as it was displayed when the touch was recorded.
    pub fencer_name: Option<String>,
    pub zone: Zone,
    pub action: RecordedAction,
    pub score_after: ScoreLine,
    pub kind: TouchKind,
}

/// Who a touch belongs to, resolved against its match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribution {
    Side(Side),
    /// A name that is neither participant of the match.
    Foreign(String),
    Unattributed,
}

impl Touch {
    pub fn attribution(&self, red_name: &str, green_name: &str) -> Attribution {
        if let Some(side) = self.side {
            return Attribution::Side(side);
        }
        match self.fencer_name.as_deref() {
            Some(name) if !name.is_empty() && name == red_name => Attribution::Side(Side::Red),
            Some(name) if !name.is_empty() && name == green_name => Attribution::Side(Side::Green),
            Some(name) if !name.is_empty() => Attribution::Foreign(name.to_string()),
            _ => Attribution::Unattributed,
        }
    }
}
