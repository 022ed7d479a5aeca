//! # Money Module
//!
//! Provides the `Money` type for every monetary value on a tab.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    55.80 * 0.10 = 5.580000000000001  ❌ WRONG!                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    5580 centavos * 1000 bps / 10000 = 558 centavos (R$ 5.58)           │
//! │    Rounding happens once, explicitly, at a known place                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use comanda_core::money::Money;
//!
//! let burger = Money::from_cents(2490); // R$ 24.90
//! let line = burger * 2;                // R$ 49.80
//! let total = line + Money::from_cents(600);
//! assert_eq!(total.cents(), 5580);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::ServiceRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction never wraps; change is checked separately
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Currency is implicit**: the whole engine works in one currency (BRL)
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► Cart subtotal (live price)                           │
/// │        │                                                                │
/// │        └──► OrderItem.unit_price (snapshot) ──► Bill.subtotal           │
/// │                                                      │                  │
/// │                           Bill.service_charge ◄──────┤                  │
/// │                                                      ▼                  │
/// │                           Bill.total ──► Payment.amount_due / change    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::money::Money;
    ///
    /// let price = Money::from_cents(2490); // R$ 24.90
    /// assert_eq!(price.cents(), 2490);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from reais and centavos.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(70, 0).cents(), 7000);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts only the major unit carries the sign.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole reais portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a basis-point rate and rounds half-up to the centavo.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 is the
    /// half-up rounding term (5000/10000 = 0.5 centavo).
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::money::Money;
    /// use comanda_core::types::ServiceRate;
    ///
    /// let subtotal = Money::from_cents(5580); // R$ 55.80
    /// let service = subtotal.apply_rate(ServiceRate::default()); // 10%
    /// assert_eq!(service.cents(), 558);
    /// ```
    pub fn apply_rate(&self, rate: ServiceRate) -> Money {
        // i128 keeps large tabs from overflowing mid-calculation
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use comanda_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2490);
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 4980);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable form used in logs and receipts.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R$ {}.{:02}", sign, self.reais().abs(), self.cents_part())
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

/// Multiplication by a line quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(2490);
        assert_eq!(money.cents(), 2490);
        assert_eq!(money.reais(), 24);
        assert_eq!(money.cents_part(), 90);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(61, 38).cents(), 6138);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(6138).to_string(), "R$ 61.38");
        assert_eq!(Money::from_cents(600).to_string(), "R$ 6.00");
        assert_eq!(Money::from_cents(-862).to_string(), "-R$ 8.62");
        assert_eq!(Money::zero().to_string(), "R$ 0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(7000);
        let b = Money::from_cents(6138);

        assert_eq!((a - b).cents(), 862);
        assert_eq!((a + b).cents(), 13138);
        assert_eq!((Money::from_cents(2490) * 2).cents(), 4980);
    }

    #[test]
    fn test_sum() {
        let lines = [Money::from_cents(4980), Money::from_cents(600)];
        let total: Money = lines.iter().sum();
        assert_eq!(total.cents(), 5580);

        let empty: Money = std::iter::empty::<Money>().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_service_charge_ten_percent() {
        let subtotal = Money::from_cents(5580);
        assert_eq!(subtotal.apply_rate(ServiceRate::from_bps(1000)).cents(), 558);
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // R$ 0.05 at 10% = 0.5 centavo → 1
        assert_eq!(Money::from_cents(5).apply_rate(ServiceRate::from_bps(1000)).cents(), 1);
        // R$ 0.04 at 10% = 0.4 centavo → 0
        assert_eq!(Money::from_cents(4).apply_rate(ServiceRate::from_bps(1000)).cents(), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-550).abs().cents(), 550);
    }
}
