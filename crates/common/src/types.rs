use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier assigned to a person when it is first saved.
///
/// Identifiers are handed out sequentially by a collection starting at
/// [`PersonId::first`] and are never reused within that collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(u64);

impl PersonId {
    /// The first identifier a fresh collection assigns.
    pub const fn first() -> Self {
        Self(1)
    }

    /// Creates an identifier from a raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The largest identifier that can be assigned.
    pub const MAX: Self = Self(u64::MAX);

    /// Returns the identifier that follows this one, or `None` at
    /// [`PersonId::MAX`].
    pub const fn next(&self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Returns the raw value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PersonId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<PersonId> for u64 {
    fn from(id: PersonId) -> Self {
        id.0
    }
}

/// Error returned when text does not hold a valid person id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid person id {input:?}: {source}")]
pub struct ParsePersonIdError {
    input: String,
    #[source]
    source: ParseIntError,
}

impl FromStr for PersonId {
    type Err = ParsePersonIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|source| ParsePersonIdError {
                input: s.to_string(),
                source,
            })
    }
}
