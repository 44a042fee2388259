//! The fixed set of entity types returned by the data API.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of record returned by the data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A whole house scene.
    Scene,
    /// One floor of a scene.
    Level,
    /// One room of a level.
    Room,
}

impl EntityType {
    /// All entity types, in display order.
    pub const ALL: [Self; 3] = [Self::Scene, Self::Level, Self::Room];

    /// Key of this type's array in a data API response.
    pub fn response_key(self) -> &'static str {
        match self {
            Self::Scene => "scene_results",
            Self::Level => "level_results",
            Self::Room => "room_results",
        }
    }

    /// Lowercase name used in configuration and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Level => "level",
            Self::Room => "room",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown entity type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity type '{0}' (expected scene, level or room)")]
pub struct ParseEntityTypeError(pub String);

impl FromStr for EntityType {
    type Err = ParseEntityTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scene" | "scenes" => Ok(Self::Scene),
            "level" | "levels" => Ok(Self::Level),
            "room" | "rooms" => Ok(Self::Room),
            _ => Err(ParseEntityTypeError(s.to_string())),
        }
    }
}
