//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! `Multiplier` type used by pricing rules.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A snapshot price that drifts by a cent breaks the order-sum           │
//! │  invariant (`order.sum == Σ item.price × item.quantity`).              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices, snapshots and sums are all i64 cents; rule multipliers      │
//! │    are integer basis points, applied with explicit rounding.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate results of rule math may go negative;
///   the final resolved price is clamped with [`Money::clamp_non_negative`]
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (whole currency) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// Used for line totals: `unit_price.multiply_quantity(qty)`.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a pricing-rule multiplier.
    ///
    /// ## Implementation
    /// Integer math with rounding: `(cents * bps + 5000) / 10000`.
    /// i128 intermediates prevent overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use checkout_core::money::{Money, Multiplier};
    ///
    /// let base = Money::from_cents(10_000);        // $100.00
    /// let discounted = base.apply(Multiplier::from_bps(9_000)); // ×0.9
    /// assert_eq!(discounted.cents(), 9_000);       // $90.00
    /// ```
    pub fn apply(&self, multiplier: Multiplier) -> Money {
        let cents = (self.0 as i128 * multiplier.bps() as i128 + 5_000) / 10_000;
        Money::from_cents(cents as i64)
    }

    /// Clamps the value to a minimum of zero.
    ///
    /// A resolved price is never allowed to go negative, regardless of
    /// what the winning rule computes.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }
}

// =============================================================================
// Multiplier Type
// =============================================================================

/// A pricing-rule multiplier in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.0001× = 1/10000
/// 10000 bps = ×1.0 (identity), 9000 bps = ×0.9 (10% off),
/// 15000 bps = ×1.5 (surcharge)
///
/// Storing the multiplier as an integer keeps rule math exact and the
/// snapshot prices reproducible.
///
/// i64 matches the stored column width: a stored value outside the
/// validated range passes through unchanged instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiplier(i64);

impl Multiplier {
    /// Creates a multiplier from basis points.
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Multiplier(bps)
    }

    /// The identity multiplier (×1.0).
    #[inline]
    pub const fn identity() -> Self {
        Multiplier(10_000)
    }

    /// Returns the multiplier in basis points.
    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    /// Returns the multiplier as a factor (for display only).
    #[inline]
    pub fn factor(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Multiplier::identity()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging, not for localized UI display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Default money is zero.
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_apply_identity() {
        let price = Money::from_cents(12345);
        assert_eq!(price.apply(Multiplier::identity()).cents(), 12345);
    }

    #[test]
    fn test_apply_discount() {
        // $100.00 × 0.9 = $90.00
        let price = Money::from_cents(10_000);
        assert_eq!(price.apply(Multiplier::from_bps(9_000)).cents(), 9_000);
    }

    #[test]
    fn test_apply_surcharge_with_rounding() {
        // $0.99 × 1.5 = $1.485 → rounds to $1.49
        let price = Money::from_cents(99);
        assert_eq!(price.apply(Multiplier::from_bps(15_000)).cents(), 149);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_cents(-100).clamp_non_negative().cents(), 0);
        assert_eq!(Money::from_cents(100).clamp_non_negative().cents(), 100);
        assert_eq!(Money::zero().clamp_non_negative().cents(), 0);
    }

    #[test]
    fn test_multiplier_factor() {
        let m = Multiplier::from_bps(9_000);
        assert!((m.factor() - 0.9).abs() < 1e-9);
    }
}
