use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic partition of competing universities.
///
/// Four base zones plus two fixed combinations of two base zones each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Zone {
    North,
    South,
    East,
    West,
    NorthEast,
    SouthWest,
}

/// Returned when a string does not name a known zone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized zone: {0:?}")]
pub struct UnknownZone(pub String);

impl Zone {
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::North => "north",
            Zone::South => "south",
            Zone::East => "east",
            Zone::West => "west",
            Zone::NorthEast => "north-east",
            Zone::SouthWest => "south-west",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = UnknownZone;

    /// Case-insensitive; `_` and spaces are accepted in place of `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "north" => Ok(Zone::North),
            "south" => Ok(Zone::South),
            "east" => Ok(Zone::East),
            "west" => Ok(Zone::West),
            "north-east" => Ok(Zone::NorthEast),
            "south-west" => Ok(Zone::SouthWest),
            _ => Err(UnknownZone(s.to_owned())),
        }
    }
}
