//! Type-safe price representation using decimal arithmetic.
//!
//! Every amount in the shop is in US dollars, so a price is just a decimal
//! with display and arithmetic helpers. Binary floats never touch money.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A dollar amount.
///
/// Deserializes from a JSON number (`129.99`) or a numeric string
/// (`"129.99"`), which is how the catalog API encodes `NUMERIC` columns.
/// Serializes as a string to avoid float rounding on the way back out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Price for `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0.round_dp(2))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        Self(self.0 * rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
        assert_eq!(Price::new(Decimal::from(15)).to_string(), "$15.00");
        assert_eq!(Price::new(Decimal::new(64_008, 4)).to_string(), "$6.40");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Price = serde_json::from_str("129.99").unwrap();
        let b: Price = serde_json::from_str("\"129.99\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Price::from_cents(12_999));
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_cents(1000).times(3), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(3250));
    }

    #[test]
    fn test_is_positive() {
        assert!(Price::from_cents(1).is_positive());
        assert!(!Price::ZERO.is_positive());
        assert!(!Price::from_cents(-5).is_positive());
    }
}
