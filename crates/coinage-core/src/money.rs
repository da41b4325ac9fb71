//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    3.00 - 2.12 = 0.8799999999999999  ❌ WRONG!                          │
//! │                                                                         │
//! │  A change engine that sees 87.99999 cents hands out 87 cents.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    300 - 212 = 88  (exact, always)                                      │
//! │    Decimals are converted ONCE, at the boundary, by rounding.           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use coinage_core::money::Money;
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! // Create from minor units (preferred)
//! let owed = Money::from_minor_units(212); // 2.12
//!
//! // Or convert a decimal at the boundary
//! let paid = Money::from_decimal(Decimal::from_str("3.00").unwrap(), 2).unwrap();
//!
//! assert_eq!((paid - owed).minor_units(), 88);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD and EUR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Subtraction can go negative before validation
///   rejects it; the engine itself only ever sees non-negative change
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as a bare integer**: `{"change_cents": 88}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use coinage_core::money::Money;
    ///
    /// let change = Money::from_minor_units(88);
    /// assert_eq!(change.minor_units(), 88);
    /// ```
    #[inline]
    pub const fn from_minor_units(units: i64) -> Self {
        Money(units)
    }

    /// Alias of [`Money::from_minor_units`] for two-digit currencies.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount into minor units.
    ///
    /// ## Rounding
    /// The amount is scaled by `10^minor_digits` and rounded to the nearest
    /// unit, ties to even (Bankers Rounding):
    /// ```text
    /// 2.125 → 212.5 → 212
    /// 2.135 → 213.5 → 214
    /// ```
    ///
    /// Returns `None` when the result does not fit in an `i64`.
    ///
    /// ```rust
    /// use coinage_core::money::Money;
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    ///
    /// let amount = Decimal::from_str("2.12").unwrap();
    /// assert_eq!(Money::from_decimal(amount, 2), Some(Money::from_cents(212)));
    /// ```
    pub fn from_decimal(amount: Decimal, minor_digits: u32) -> Option<Self> {
        let scale = Decimal::from(10i64.checked_pow(minor_digits)?);
        amount
            .checked_mul(scale)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .map(Money)
    }

    /// Converts back to a decimal amount with `minor_digits` fraction digits.
    ///
    /// ```rust
    /// use coinage_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(88).to_decimal(2).to_string(), "0.88");
    /// ```
    #[inline]
    pub fn to_decimal(&self, minor_digits: u32) -> Decimal {
        Decimal::new(self.0, minor_digits)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// True when the amount splits evenly into `divisor` parts.
    ///
    /// A zero divisor never divides anything.
    #[inline]
    pub const fn is_divisible_by(&self, divisor: i64) -> bool {
        divisor != 0 && self.0 % divisor == 0
    }

    /// Renders the amount with a currency symbol and explicit precision.
    ///
    /// ```rust
    /// use coinage_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(88).display_with("€", 2), "€0.88");
    /// ```
    pub fn display_with(&self, symbol: &str, minor_digits: u32) -> String {
        format!("{}{}", symbol, self.to_decimal(minor_digits))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows a two-digit amount without a symbol.
///
/// ## Note
/// This is for logs and error messages. Locale-aware output goes through
/// [`Money::display_with`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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

/// Multiplication by a piece count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
