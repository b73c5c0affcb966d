//! Type-safe price representation using decimal arithmetic.
//!
//! All amounts are Vietnamese đồng, which has no minor unit. Prices travel to
//! and from the backend as JSON numbers, but the backend is not consistent
//! about it (delivery prices sometimes arrive as numeric strings), so
//! deserialization accepts both.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Currency suffix shown after formatted amounts.
pub const CURRENCY_SUFFIX: &str = "VND";

/// A monetary amount in VND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero đồng.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of đồng.
    #[must_use]
    pub fn from_dong(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Parse a price from a numeric string such as `"200000"`.
    ///
    /// Returns `None` for empty, non-numeric or negative input.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let amount = input.trim().parse::<Decimal>().ok()?;
        (!amount.is_sign_negative()).then_some(Self(amount))
    }

    /// Apply a percentage discount (`10` means 10% off).
    ///
    /// Discounts outside `0..=100` are clamped.
    #[must_use]
    pub fn discounted(&self, percent: u8) -> Self {
        let percent = Decimal::from(percent.min(100));
        let hundred = Decimal::ONE_HUNDRED;
        Self(self.0 * (hundred - percent) / hundred)
    }

    /// Format with `.` thousands separators, rounded to whole đồng.
    ///
    /// `200000` becomes `"200.000"`.
    #[must_use]
    pub fn format_local(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let digits = rounded.abs().trunc().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{grouped}")
        } else {
            grouped
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {CURRENCY_SUFFIX}", self.format_local())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_local_groups_thousands() {
        assert_eq!(Price::from_dong(0).format_local(), "0");
        assert_eq!(Price::from_dong(999).format_local(), "999");
        assert_eq!(Price::from_dong(1000).format_local(), "1.000");
        assert_eq!(Price::from_dong(200_000).format_local(), "200.000");
        assert_eq!(Price::from_dong(1_234_567).format_local(), "1.234.567");
    }

    #[test]
    fn test_display_appends_currency() {
        assert_eq!(Price::from_dong(230_000).to_string(), "230.000 VND");
    }

    #[test]
    fn test_discounted() {
        let price = Price::from_dong(100_000);
        assert_eq!(price.discounted(10), Price::from_dong(90_000));
        assert_eq!(price.discounted(0), price);
        assert_eq!(price.discounted(150), Price::ZERO);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Price::parse("200000"), Some(Price::from_dong(200_000)));
        assert_eq!(Price::parse(" 30000 "), Some(Price::from_dong(30_000)));
        assert_eq!(Price::parse(""), None);
        assert_eq!(Price::parse("abc"), None);
        assert_eq!(Price::parse("-5"), None);
    }

    #[test]
    fn test_deserialize_accepts_numbers_and_strings() {
        let from_number: Price = serde_json::from_str("30000").unwrap();
        let from_string: Price = serde_json::from_str("\"30000\"").unwrap();
        assert_eq!(from_number, Price::from_dong(30_000));
        assert_eq!(from_string, Price::from_dong(30_000));
    }

    #[test]
    fn test_serializes_as_number() {
        let value = serde_json::to_value(Price::from_dong(30_000)).unwrap();
        assert!(value.is_number());
        assert!((value.as_f64().unwrap() - 30_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_dong(1), Price::from_dong(2)].into_iter().sum();
        assert_eq!(total, Price::from_dong(3));
    }
}
