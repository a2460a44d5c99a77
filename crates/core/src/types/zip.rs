//! US postal code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ZipCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZipCodeError {
    /// The input string is empty.
    #[error("zip code cannot be empty")]
    Empty,
    /// The five-digit part is malformed.
    #[error("zip code must start with 5 digits")]
    InvalidBase,
    /// The `+4` extension is malformed.
    #[error("zip code extension must be 4 digits after a hyphen")]
    InvalidExtension,
}

/// A US zip code, either `NNNNN` or `NNNNN-NNNN`.
///
/// Restriction rows are keyed on the five-digit base, so lookups should use
/// [`ZipCode::base`].
///
/// ## Examples
///
/// ```
/// use landscape_supply_core::ZipCode;
///
/// assert_eq!(ZipCode::parse("89052").unwrap().base(), "89052");
/// assert_eq!(ZipCode::parse(" 89052-1234 ").unwrap().base(), "89052");
///
/// assert!(ZipCode::parse("").is_err());
/// assert!(ZipCode::parse("8905").is_err());
/// assert!(ZipCode::parse("89052-12").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    /// Parse a `ZipCode` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Does not start with exactly 5 ASCII digits
    /// - Has an extension that is not a hyphen followed by 4 digits
    pub fn parse(s: &str) -> Result<Self, ZipCodeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ZipCodeError::Empty);
        }

        let (base, extension) = match s.split_once('-') {
            Some((base, ext)) => (base, Some(ext)),
            None => (s, None),
        };

        if base.len() != 5 || !base.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ZipCodeError::InvalidBase);
        }

        if let Some(ext) = extension
            && (ext.len() != 4 || !ext.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(ZipCodeError::InvalidExtension);
        }

        Ok(Self(s.to_owned()))
    }

    /// The five-digit base code.
    #[must_use]
    pub fn base(&self) -> &str {
        self.0.get(..5).unwrap_or(&self.0)
    }

    /// The full code as given (after trimming).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ZipCode {
    type Error = ZipCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ZipCode> for String {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}

impl core::str::FromStr for ZipCode {
    type Err = ZipCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_zip_codes() {
        assert!(ZipCode::parse("89101").is_ok());
        assert!(ZipCode::parse("89101-0001").is_ok());
    }

    #[test]
    fn test_invalid_base() {
        assert_eq!(ZipCode::parse("8910a"), Err(ZipCodeError::InvalidBase));
        assert_eq!(ZipCode::parse("891011"), Err(ZipCodeError::InvalidBase));
        assert_eq!(ZipCode::parse("   "), Err(ZipCodeError::Empty));
    }

    #[test]
    fn test_invalid_extension() {
        assert_eq!(
            ZipCode::parse("89101-"),
            Err(ZipCodeError::InvalidExtension)
        );
        assert_eq!(
            ZipCode::parse("89101-12a4"),
            Err(ZipCodeError::InvalidExtension)
        );
    }

    #[test]
    fn test_base_strips_extension() {
        assert_eq!(ZipCode::parse("89015-4410").unwrap().base(), "89015");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<ZipCode>("\"89015\"").is_ok());
        assert!(serde_json::from_str::<ZipCode>("\"nope\"").is_err());
    }
}
