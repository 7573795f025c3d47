//! Legislative district code and representative name types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A legislative district code in `STATE-NUMBER` format, e.g. `NY-14`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictCode(String);

/// Error returned when a string is not a well-formed district code.
#[derive(Debug, Error)]
#[error("invalid district code: {0:?} (expected STATE-NUMBER, e.g. NY-14)")]
pub struct DistrictParseError(pub String);

impl DistrictCode {
    /// Build a district code from a state abbreviation and district number.
    pub fn new(state: &str, number: u32) -> Self {
        Self(format!("{}-{}", state.trim().to_uppercase(), number))
    }

    /// Parse a `STATE-NUMBER` string, validating its shape.
    pub fn parse(raw: &str) -> Result<Self, DistrictParseError> {
        let trimmed = raw.trim();
        let Some((state, number)) = trimmed.split_once('-') else {
            return Err(DistrictParseError(raw.to_string()));
        };
        let state_ok =
            state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic());
        let number_ok = !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
        if !state_ok || !number_ok {
            return Err(DistrictParseError(raw.to_string()));
        }
        Ok(Self(format!("{}-{}", state.to_uppercase(), number)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-letter state abbreviation.
    pub fn state(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for DistrictCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name of a district's current representative.
///
/// The `Vacant` sentinel means no sitting representative is on record for
/// the seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Representative(String);

impl Representative {
    /// The sentinel stored when a seat has no sitting representative.
    pub const VACANT: &'static str = "Vacant";

    /// A named representative. A blank name collapses to the vacant sentinel.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Self::vacant()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn vacant() -> Self {
        Self(Self::VACANT.to_string())
    }

    pub fn is_vacant(&self) -> bool {
        self.0 == Self::VACANT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Representative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
