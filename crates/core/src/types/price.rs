//! Type-safe price representation using decimal arithmetic.
//!
//! All catalog prices, delivery fees and totals are [`Price`] values. Amounts
//! are exact decimals; rounding to cents only happens when a price is
//! displayed.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Quantity;

/// A price with currency information.
///
/// The store sells in a single currency, so arithmetic keeps the left-hand
/// currency and only checks agreement in debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a US dollar price.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Create a US dollar price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self::usd(Decimal::new(cents, 2))
    }

    /// A zero US dollar amount.
    #[must_use]
    pub const fn zero() -> Self {
        Self::usd(Decimal::ZERO)
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Unit price multiplied by a cart quantity.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self::new(
            self.amount * Decimal::from(quantity.get()),
            self.currency_code,
        )
    }

    /// Apply a fractional rate (e.g. a tax rate of `0.0825`). No rounding.
    #[must_use]
    pub fn apply_rate(self, rate: Decimal) -> Self {
        Self::new(self.amount * rate, self.currency_code)
    }

    /// Amount rounded half-away-from-zero to cents, for display.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        debug_assert_eq!(self.currency_code, rhs.currency_code, "currency mismatch");
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.rounded())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    CAD,
    MXN,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::MXN => "$",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::usd(Decimal::new(18825, 2)).to_string(), "$188.25");
        assert_eq!(Price::usd(Decimal::new(8, 0)).to_string(), "$8.00");
        assert_eq!(Price::usd(Decimal::new(1_2345, 3)).to_string(), "$12.35");
    }

    #[test]
    fn test_times_quantity() {
        let qty = Quantity::new(5).unwrap();
        assert_eq!(Price::from_cents(1999).times(qty), Price::from_cents(9995));
    }

    #[test]
    fn test_apply_rate_is_exact() {
        let tax = Price::from_cents(10_000).apply_rate(Decimal::new(825, 4));
        assert_eq!(tax.amount, Decimal::new(825, 2));
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let total: Price = std::iter::empty().sum();
        assert!(total.is_zero());
    }

    #[test]
    fn test_sign_checks() {
        assert!(Price::from_cents(-1).is_negative());
        assert!(!Price::zero().is_negative());
        assert!(!Price::zero().is_positive());
        assert!(Price::from_cents(1).is_positive());
    }
}
