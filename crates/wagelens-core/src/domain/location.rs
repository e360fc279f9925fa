use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_LOCATION_LEN: usize = 80;

/// Metropolitan-area name, trimmed and non-empty.
///
/// The display form preserves the caller's casing; [`Location::cache_token`]
/// produces the normalized form used in cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyLocation);
        }

        let len = trimmed.chars().count();
        if len > MAX_LOCATION_LEN {
            return Err(ValidationError::LocationTooLong {
                len,
                max: MAX_LOCATION_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase, hyphen-joined form for deterministic cache keys.
    pub fn cache_token(&self) -> String {
        normalize_token(&self.0)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Location {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Location {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.0
    }
}

/// Occupation title, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Occupation(String);

impl Occupation {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyOccupation);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn cache_token(&self) -> String {
        normalize_token(&self.0)
    }
}

impl Display for Occupation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Occupation {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Occupation> for String {
    fn from(value: Occupation) -> Self {
        value.0
    }
}

fn normalize_token(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_preserves_casing() {
        let location = Location::parse("  Atlanta  ").expect("must parse");
        assert_eq!(location.as_str(), "Atlanta");
    }

    #[test]
    fn cache_token_is_normalized() {
        let location = Location::parse("New York City").expect("must parse");
        assert_eq!(location.cache_token(), "new-york-city");

        let occupation = Occupation::parse("Software  Engineer").expect("must parse");
        assert_eq!(occupation.cache_token(), "software-engineer");
    }

    #[test]
    fn rejects_empty_location() {
        let err = Location::parse("   ").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyLocation));
    }
}
