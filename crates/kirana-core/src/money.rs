//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts exactly.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    190 × 18 / 100 = 34.199999999999996  ❌ WRONG!                       │
//! │                                                                         │
//! │  GST on a line is often a fraction of a paisa:                          │
//! │    ₹33.33 × 18% = ₹5.9994                                               │
//! │    Rounding every line drifts the invoice total away from the sum.     │
//! │                                                                         │
//! │  OUR SOLUTION: Fixed-point decimal, rounded only for display           │
//! │    ₹5.9994 stays ₹5.9994 through every sum                             │
//! │    subtotal + tax == total holds exactly, every time                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kirana_core::money::Money;
//!
//! let price = Money::from_minor(1099); // ₹10.99
//! let doubled = price * 2;             // ₹21.98
//! let total = price + Money::from_major(5);
//! assert_eq!(total.to_string(), "₹15.99");
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

/// Number of decimal places shown to the cashier and printed on invoices.
pub const DISPLAY_SCALE: u32 = 2;

/// Currency symbol used by `Display`.
pub const CURRENCY_SYMBOL: &str = "₹";

// =============================================================================
// Money Type
// =============================================================================

/// A rupee amount backed by a fixed-point decimal.
///
/// ## Design Decisions
/// - **Decimal, not paise**: tax on a line may carry sub-paisa precision, and
///   that precision is kept until presentation
/// - **Signed**: a line whose discount exceeds its gross value goes negative
/// - **Serialized as a string**: `"224.2"` round-trips exactly through JSON
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.selling_price ──► LineItem.unit_price ──► line_subtotal       │
/// │                                                        │                │
/// │  LineItem.discount ────────────────────────────────────┘                │
/// │                                                                         │
/// │  cart_subtotal + cart_tax - order_discount ──► cart_total              │
/// │                                                                         │
/// │  Displayed as "₹224.20" (2 dp, half away from zero)                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(as = "String")] Decimal);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.to_string(), "₹10.99");
    /// ```
    #[inline]
    pub fn from_minor(paise: i64) -> Self {
        Money(Decimal::new(paise, 2))
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub fn from_major(rupees: i64) -> Self {
        Money(Decimal::from(rupees))
    }

    /// Wraps an existing decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the exact underlying amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates GST on this amount at the given rate.
    ///
    /// The result is exact: `amount × rate / 100` with no rounding, so a
    /// line's tax can be summed and split without drift.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    /// use kirana_core::types::TaxRate;
    ///
    /// let taxable = Money::from_major(190);
    /// let tax = taxable.calculate_tax(TaxRate::from_percent(18));
    /// assert_eq!(tax, Money::from_minor(3420)); // ₹34.20
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Line: 2 × ₹100 − ₹10 discount = ₹190
    ///      │
    ///      ▼
    /// calculate_tax(18%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Tax: ₹34.20  (CGST ₹17.10 + SGST ₹17.10)
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(self.0 * rate.percent() / Decimal::ONE_HUNDRED)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Rounds to two decimal places, half away from zero.
    ///
    /// Only presentation code should call this. Sums and splits always run
    /// on the exact value.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let tax = Money::from_decimal(Decimal::new(59994, 4)); // 5.9994
    /// assert_eq!(tax.round_for_display(), Money::from_minor(600));
    /// ```
    pub fn round_for_display(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Formats the rounded amount without a currency symbol: `"224.20"`.
    pub fn to_plain_string(&self) -> String {
        let mut rounded = self.round_for_display().0;
        rounded.rescale(DISPLAY_SCALE);
        rounded.to_string()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the rounded amount with the rupee symbol: `₹224.20`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.round_for_display().is_negative() {
            "-"
        } else {
            ""
        };
        write!(f, "{}{}{}", sign, CURRENCY_SYMBOL, self.abs().to_plain_string())
    }
}

/// Parses cashier input such as `"12.50"` or `"₹12.50"`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix(CURRENCY_SYMBOL).unwrap_or(trimmed).trim();
        Decimal::from_str(trimmed)
            .map(Money)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("'{}' is not a number", s.trim()),
            })
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
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
