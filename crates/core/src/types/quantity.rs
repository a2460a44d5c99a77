//! Cart line quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative; the line should be removed instead.
    #[error("quantity must be positive (got {0})")]
    NotPositive(i64),
    /// Larger than a single cart line may hold.
    #[error("quantity must be at most {max} (got {got})")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
        /// Requested quantity.
        got: i64,
    },
}

/// A strictly positive number of units on a cart line.
///
/// Zero and negative inputs are rejected: in a cart they mean "remove this
/// line", which is handled by [`crate::Cart::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Upper bound for a single line.
    pub const MAX: u32 = 100_000;

    /// Build a quantity from raw (possibly user-supplied) input.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] for zero or negative values and
    /// [`QuantityError::TooLarge`] above [`Quantity::MAX`].
    pub fn new(raw: i64) -> Result<Self, QuantityError> {
        if raw <= 0 {
            return Err(QuantityError::NotPositive(raw));
        }
        let value = u32::try_from(raw)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .ok_or(QuantityError::TooLarge {
                max: Self::MAX,
                got: raw,
            })?;
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(QuantityError::NotPositive(raw))
    }

    /// Number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, capping at [`Quantity::MAX`].
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        let sum = self.get().saturating_add(other.get()).min(Self::MAX);
        NonZeroU32::new(sum).map_or(self, Self)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-3), Err(QuantityError::NotPositive(-3)));
    }

    #[test]
    fn test_rejects_too_large() {
        assert!(matches!(
            Quantity::new(i64::from(Quantity::MAX) + 1),
            Err(QuantityError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_saturating_add_caps() {
        let big = Quantity::new(i64::from(Quantity::MAX)).unwrap();
        let one = Quantity::new(1).unwrap();
        assert_eq!(big.saturating_add(one).get(), Quantity::MAX);
        assert_eq!(one.saturating_add(one).get(), 2);
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Quantity>("4").is_ok());
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("-2").is_err());
    }
}
