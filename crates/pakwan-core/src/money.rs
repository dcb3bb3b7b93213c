//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PRICES ON THIS TERMINAL                                                │
//! │                                                                         │
//! │  Menu prices are whole rupees:  Chicken Biryani  Rs. 320                │
//! │  Weighed items are rounded:     0.75 kg × Rs. 1,200/kg = Rs. 900        │
//! │                                                                         │
//! │  The amount is stored as i64 rupees. The only place a float appears is  │
//! │  the weight/volume multiplier, and its product is rounded back to an    │
//! │  integer immediately by `Money::scale`.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pakwan_core::money::Money;
//!
//! let biryani = Money::from_units(320);
//! let karahi = Money::from_units(550);
//! assert_eq!(biryani * 2 + karahi, Money::from_units(1190));
//!
//! // 0.75 kg of a Rs. 1,200/kg item
//! assert_eq!(Money::from_units(1200).scale(0.75), Money::from_units(900));
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in whole currency units (rupees for PKR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for returned-amount reporting
/// - **Serialized as a bare number**: matches the dataset document (`"price": 320`)
/// - **Lenient decoding**: a float in a stored document (`320.0`, `899.6`) is
///   rounded instead of rejecting the whole dataset
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.price ──┬──► CartLine.price ──► price × quantity               │
/// │                  │                                                      │
/// │  Category.base_price ──► scale(kg) ──► custom CartLine.price            │
/// │                                                                         │
/// │  Cart.subtotal() ──► Order.subtotal == Order.total (tax is always 0)    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use pakwan_core::money::Money;
    ///
    /// let price = Money::from_units(320);
    /// assert_eq!(price.units(), 320);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the amount in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies money by a line quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Prices a measured quantity (kg, litres, ...) against a per-unit price.
    ///
    /// The result is rounded half away from zero to whole units.
    ///
    /// ## Example
    /// ```rust
    /// use pakwan_core::money::Money;
    ///
    /// let per_kg = Money::from_units(850);
    /// assert_eq!(per_kg.scale(0.5), Money::from_units(425));
    /// assert_eq!(per_kg.scale(0.333), Money::from_units(283));
    /// ```
    pub fn scale(&self, quantity: f64) -> Money {
        Money((self.0 as f64 * quantity).round() as i64)
    }

    /// Ratio of this amount to a per-unit price, used to back-calculate the
    /// measured quantity of a custom line from its manually entered price.
    ///
    /// Returns `None` when `per_unit` is not positive.
    pub fn ratio_to(&self, per_unit: Money) -> Option<f64> {
        if per_unit.is_positive() {
            Some(self.0 as f64 / per_unit.0 as f64)
        } else {
            None
        }
    }

    /// Integer average rounded half up, 0 for an empty set.
    ///
    /// ## Example
    /// ```rust
    /// use pakwan_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(1000).average_over(3), Money::from_units(333));
    /// assert_eq!(Money::from_units(1001).average_over(2), Money::from_units(501));
    /// assert_eq!(Money::from_units(500).average_over(0), Money::zero());
    /// ```
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        let count = count as i64;
        Money((2 * self.0 + count).div_euclid(2 * count))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the receipt format: `Rs. 1,190`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{}Rs. {}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (line quantity). Saturates instead of wrapping,
/// since prices can come from imported documents.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Lenient Deserialization
// =============================================================================

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a monetary amount as a number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map(Money)
            .map_err(|_| E::custom("monetary amount out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if v.is_finite() {
            Ok(Money(v.round() as i64))
        } else {
            Err(E::custom("monetary amount must be finite"))
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_units(320).to_string(), "Rs. 320");
        assert_eq!(Money::from_units(1190).to_string(), "Rs. 1,190");
        assert_eq!(Money::from_units(1234567).to_string(), "Rs. 1,234,567");
        assert_eq!(Money::from_units(-550).to_string(), "-Rs. 550");
        assert_eq!(Money::zero().to_string(), "Rs. 0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(1000);
        let b = Money::from_units(500);

        assert_eq!((a + b).units(), 1500);
        assert_eq!((a - b).units(), 500);
        assert_eq!((a * 3).units(), 3000);
        assert_eq!(a.multiply_quantity(2).units(), 2000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.units(), 2000);

        assert_eq!((Money::from_units(i64::MAX / 2) * 3).units(), i64::MAX);
    }

    #[test]
    fn test_scale_rounds_to_whole_units() {
        let per_kg = Money::from_units(1200);
        assert_eq!(per_kg.scale(0.75).units(), 900);
        assert_eq!(per_kg.scale(0.0004).units(), 0);
        assert_eq!(Money::from_units(3).scale(0.5).units(), 2);
    }

    #[test]
    fn test_ratio_to() {
        let price = Money::from_units(600);
        let ratio = price.ratio_to(Money::from_units(1200)).unwrap();
        assert!((ratio - 0.5).abs() < f64::EPSILON);
        assert!(price.ratio_to(Money::zero()).is_none());
    }

    #[test]
    fn test_serde_is_a_bare_number() {
        let json = serde_json::to_string(&Money::from_units(320)).unwrap();
        assert_eq!(json, "320");

        let parsed: Money = serde_json::from_str("450").unwrap();
        assert_eq!(parsed.units(), 450);
    }

    #[test]
    fn test_deserialize_rounds_floats() {
        let parsed: Money = serde_json::from_str("899.6").unwrap();
        assert_eq!(parsed.units(), 900);

        let parsed: Money = serde_json::from_str("320.0").unwrap();
        assert_eq!(parsed.units(), 320);

        assert!(serde_json::from_str::<Money>("\"320\"").is_err());
    }
}
