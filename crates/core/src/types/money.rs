//! Type-safe money representation using decimal arithmetic.
//!
//! QuickBite prices everything in a single currency, so [`Money`] is a thin
//! wrapper around [`Decimal`] rather than an amount/currency pair. It never
//! goes through floating point.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, Sub};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount of money in the currency's standard unit (dollars, not cents).
///
/// Arithmetic saturates at [`Money::MIN`] and [`Money::MAX`] instead of
/// panicking on overflow.
///
/// Serializes as a decimal string. Deserializes from either a string or a
/// JSON number, since backends send both.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest representable amount.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Smallest representable amount.
    pub const MIN: Self = Self(Decimal::MIN);

    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to whole cents, midpoint away from zero.
    #[must_use]
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// `percent`% of this amount (unrounded).
    #[must_use]
    pub fn percent(self, percent: Decimal) -> Self {
        self.0
            .checked_mul(percent)
            .map(|product| product / Decimal::ONE_HUNDRED)
            .or_else(|| (self.0 / Decimal::ONE_HUNDRED).checked_mul(percent))
            .map_or_else(|| Self::saturated_product(self.0, percent), Self)
    }

    /// Subtract, flooring at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs >= self { Self::ZERO } else { self - rhs }
    }

    /// Whether this amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether this amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// The bound an overflowing `lhs * rhs` ends up at.
    fn saturated_product(lhs: Decimal, rhs: Decimal) -> Self {
        if lhs.is_sign_negative() == rhs.is_sign_negative() {
            Self::MAX
        } else {
            Self::MIN
        }
    }

    /// The bound an overflowing sum or difference starting at `lhs` ends up at.
    fn saturated_from(lhs: Decimal) -> Self {
        if lhs.is_sign_negative() {
            Self::MIN
        } else {
            Self::MAX
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.round_cents().0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim().trim_start_matches('$')).map(Self)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.0
            .checked_add(rhs.0)
            .map_or_else(|| Self::saturated_from(self.0), Self)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.0
            .checked_sub(rhs.0)
            .map_or_else(|| Self::saturated_from(self.0), Self)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self * Decimal::from(rhs)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        self.0
            .checked_mul(rhs)
            .map_or_else(|| Self::saturated_product(self.0, rhs), Self)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Serde helpers that put [`Money`] on the wire as a JSON number.
///
/// For request bodies sent to backends that read prices as numbers. Use with
/// `#[serde(with = "quickbite_core::types::money::as_number")]`. Deserializing still
/// accepts strings.
pub mod as_number {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    /// Serialize as a JSON number.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&money.0, serializer)
    }

    /// Deserialize from a JSON number or string.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a decimal amount.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        Money::deserialize(deserializer)
    }
}
