//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an anime record.
///
/// Assigned by the store on first persist. Zero is the "not yet assigned" value a
/// client may send in a creation payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimeId(i32);

impl AnimeId {
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i32 {
        self.0
    }

    /// `true` for the placeholder value `0`.
    pub fn is_unassigned(&self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Display for AnimeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i32> for AnimeId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<AnimeId> for i32 {
    fn from(value: AnimeId) -> Self {
        value.0
    }
}

impl FromStr for AnimeId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<i32>()
            .map_err(|e| DomainError::invalid_id(format!("AnimeId: {e}")))?;
        Ok(Self(value))
    }
}
