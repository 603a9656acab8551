use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The unique identifier of a tender.
///
/// Identifiers are stable across loads and are the only field a renderer may
/// rely on being present. Surrounding whitespace is stripped; an identifier
/// that is empty after trimming is rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TenderId(NonEmptyString);

impl TenderId {
    /// Creates a new `TenderId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyTenderIdError`] if the string is empty or whitespace.
    pub fn new(s: impl Into<String>) -> Result<Self, EmptyTenderIdError> {
        let s = s.into();
        let trimmed = s.trim();
        let value = if trimmed.len() == s.len() {
            s
        } else {
            trimmed.to_string()
        };
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| EmptyTenderIdError)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Error returned when a tender identifier is empty.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("tender_id must be a non-empty string")]
pub struct EmptyTenderIdError;

impl TryFrom<String> for TenderId {
    type Error = EmptyTenderIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for TenderId {
    type Error = EmptyTenderIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for TenderId {
    type Err = EmptyTenderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TenderId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for TenderId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for TenderId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TenderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TenderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Exported datasets sometimes carry numeric ids.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let raw = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        };
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let id = TenderId::new("  T-100 ").unwrap();
        assert_eq!(id.as_str(), "T-100");
    }

    #[test]
    fn rejects_blank() {
        assert_eq!(TenderId::new("   "), Err(EmptyTenderIdError));
        assert_eq!(TenderId::new(""), Err(EmptyTenderIdError));
    }

    #[test]
    fn deserializes_numeric_id() {
        let id: TenderId = serde_json::from_str("4711").unwrap();
        assert_eq!(id.to_string(), "4711");
    }

    #[test]
    fn deserialize_rejects_empty_string() {
        let result = serde_json::from_str::<TenderId>("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = TenderId::new("GEM/2025/B/1234").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"GEM/2025/B/1234\"");
    }
}
