//! Identifier types for tournament chat.
//!
//! Tokens are assigned by the server and strictly increase in emission
//! order. Rooms are tournament ids. Display names identify the local user
//! when deciding who may delete a message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A server-assigned event token.
///
/// Tokens are unique per room and strictly increasing, so they double as the
/// feed cursor: the client asks for every event with a token greater than
/// the highest one it has applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(u64);

impl Token {
    /// The cursor before any event has been seen.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw token value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Return the raw token value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A chat room, identified by its tournament id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(u64);

impl RoomId {
    /// Wrap a raw tournament id.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Return the raw tournament id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty { field: "room" });
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| IdError::InvalidRoom(trimmed.to_string()))
    }
}

/// The local user's display identity.
///
/// Feed events carry the author's display name in `sender`; a message is
/// owned by the local user when its founding event's sender equals this
/// name exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a display name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Empty`] if nothing remains after trimming.
    pub fn new(name: impl AsRef<str>) -> Result<Self, IdError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty {
                field: "display name",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `sender` names this user.
    #[must_use]
    pub fn is(&self, sender: &str) -> bool {
        self.0 == sender
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayName> for String {
    fn from(name: DisplayName) -> Self {
        name.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// A required identifier was empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Which identifier was empty.
        field: &'static str,
    },

    /// The room id is not a non-negative integer.
    #[error("invalid room id: {0:?}")]
    InvalidRoom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_orders_numerically() {
        assert!(Token::new(2) < Token::new(10));
        assert_eq!(Token::default(), Token::ZERO);
    }

    #[test]
    fn token_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Token::new(42)).unwrap();
        assert_eq!(json, "42");

        let parsed: Token = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, Token::new(7));
    }

    #[test]
    fn room_id_parses_trimmed_integer() {
        assert_eq!(" 12 ".parse::<RoomId>().unwrap(), RoomId::new(12));
    }

    #[test]
    fn room_id_rejects_empty_and_garbage() {
        assert_eq!("".parse::<RoomId>(), Err(IdError::Empty { field: "room" }));
        assert_eq!(
            "abc".parse::<RoomId>(),
            Err(IdError::InvalidRoom("abc".to_string()))
        );
        assert!("-3".parse::<RoomId>().is_err());
    }

    #[test]
    fn display_name_is_trimmed() {
        let name = DisplayName::new("  Alice ").unwrap();
        assert_eq!(name.as_str(), "Alice");
        assert!(name.is("Alice"));
        assert!(!name.is("alice"));
    }

    #[test]
    fn display_name_rejects_blank() {
        assert!(DisplayName::new("   ").is_err());

        let parsed: Result<DisplayName, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
    }
}
