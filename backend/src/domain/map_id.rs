//! Map identifier codec.
//!
//! External callers address maps by string; the store only ever sees a parsed
//! [`MapId`], so an unvalidated string cannot reach a lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors raised when decoding an external map identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapIdError {
    /// The identifier was empty.
    #[error("map id must not be empty")]
    Empty,
    /// The identifier is not a UUID encoding.
    #[error("map id must be a valid UUID (got {value:?})")]
    Malformed {
        /// The rejected input.
        value: String,
    },
}

/// Stable map identifier stored as a UUID.
///
/// Renders in the canonical hyphenated lowercase form regardless of the
/// encoding it was parsed from.
///
/// # Examples
/// ```
/// use maps_backend::domain::MapId;
///
/// let id = MapId::parse("6F9619FF-8B86-D011-B42D-00C04FC964FF").expect("valid UUID");
/// assert_eq!(id.to_string(), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
/// assert!(MapId::parse("not-a-uuid").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MapId(Uuid);

impl MapId {
    /// Decode an external identifier.
    ///
    /// Surrounding whitespace is rejected rather than trimmed.
    pub fn parse(raw: &str) -> Result<Self, MapIdError> {
        if raw.is_empty() {
            return Err(MapIdError::Empty);
        }
        let malformed = || MapIdError::Malformed {
            value: raw.to_owned(),
        };
        if raw.trim() != raw {
            return Err(malformed());
        }
        Uuid::parse_str(raw).map(Self).map_err(|_| malformed())
    }

    /// Wrap a UUID already known to be valid, e.g. one read from the store.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for MapId {
    type Err = MapIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MapId {
    type Error = MapIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MapId> for String {
    fn from(value: MapId) -> Self {
        value.to_string()
    }
}
