//! # Money Module
//!
//! Monetary values as integer cents and percentages as basis points.
//!
//! Floating point is banned from money math: `0.1 + 0.2` is not `0.3`, and
//! a POS that drifts by a cent per transaction is a POS nobody trusts. All
//! amounts are i64 cents; the only float in sight is operator input, which
//! is converted to basis points once at the validation boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Percent
// =============================================================================

/// A percentage in basis points (bps). 1 bps = 0.01%, so 1000 bps = 10%.
///
/// Used for the cart-level discount and per-product discounts. Valid domain
/// values are 0..=10000 (0% to 100%); construction from raw operator input
/// goes through [`crate::validation::parse_percent`], which enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percent(u32);

impl Percent {
    /// Full 100% in basis points.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a display percentage (10.5 for 1050 bps).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

// =============================================================================
// Money
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// - `i64` (signed): refunds and adjustments can go negative in intermediate
///   math even though persisted totals never do
/// - single-field tuple struct: zero-cost wrapper over the raw cents
///
/// ## Example
/// ```rust
/// use till_core::Money;
///
/// let price = Money::from_cents(1099); // $10.99
/// let line = price * 3;
/// assert_eq!(line.cents(), 3297);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Largest accepted single amount: $1,000,000,000.00 in cents.
    ///
    /// Every price and expense is validated against this bound before it is
    /// stored, which keeps line and cart totals far inside i64: the worst
    /// case (`MAX_CENTS` x 999 quantity x 100 lines) is about 10^16, three
    /// orders of magnitude under `i64::MAX`. Plain `+` and `*` on in-range
    /// values therefore cannot wrap.
    pub const MAX_CENTS: i64 = 100_000_000_000;

    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage discount and returns the discounted amount,
    /// rounded half-up on the discount portion.
    ///
    /// Implementation is pure integer math in i128 to avoid overflow:
    /// `discount = (amount * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::{Money, Percent};
    ///
    /// let subtotal = Money::from_cents(10_000); // $100.00
    /// let total = subtotal.apply_discount(Percent::from_bps(1000)); // 10% off
    /// assert_eq!(total.cents(), 9_000);
    /// ```
    pub fn apply_discount(&self, discount: Percent) -> Money {
        let off = (self.0 as i128 * discount.bps() as i128 + 5000) / 10_000;
        Money(self.0 - off as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
