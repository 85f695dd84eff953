//! Coupons and the known-coupon list.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::money::Money;

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` percent of the subtotal, optionally capped.
    Percentage,
    /// `discount_value` off, flat.
    Fixed,
}

/// A discount coupon.
///
/// Codes match case-insensitively. The engine applies whatever coupon it is
/// given; resolving a typed code to a coupon is the caller's job (see
/// [`CouponBook`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Code the diner types in.
    pub code: String,
    /// Percentage or fixed.
    pub discount_type: DiscountType,
    /// Percent (0-100) for percentage coupons, amount for fixed coupons.
    pub discount_value: Decimal,
    /// Upper bound on the discount. Only meaningful for percentage coupons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Money>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Coupon {
    /// Create a percentage coupon.
    #[must_use]
    pub fn percentage(code: impl Into<String>, percent: Decimal, max_discount: Option<Money>) -> Self {
        Self {
            code: code.into(),
            discount_type: DiscountType::Percentage,
            discount_value: percent,
            max_discount,
            description: None,
        }
    }

    /// Create a fixed-amount coupon.
    #[must_use]
    pub fn fixed(code: impl Into<String>, amount: Money) -> Self {
        Self {
            code: code.into(),
            discount_type: DiscountType::Fixed,
            discount_value: amount.amount(),
            max_discount: None,
            description: None,
        }
    }

    /// Whether `code` refers to this coupon (case-insensitive, surrounding
    /// whitespace ignored).
    #[must_use]
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.trim().to_lowercase() == code.trim().to_lowercase()
    }

    /// Discount this coupon gives on `subtotal`.
    ///
    /// Percentage coupons take `subtotal * value / 100`, capped at
    /// `max_discount`. Fixed coupons take `value` flat. The result is rounded
    /// to cents and never negative or larger than the subtotal.
    #[must_use]
    pub fn discount_for(&self, subtotal: Money) -> Money {
        let raw = match self.discount_type {
            DiscountType::Percentage => {
                let discount = subtotal.percent(self.discount_value);
                self.max_discount
                    .map_or(discount, |cap| discount.min(cap))
            }
            DiscountType::Fixed => Money::new(self.discount_value),
        };
        raw.round_cents().clamp(Money::ZERO, subtotal.max(Money::ZERO))
    }
}

/// Errors that can occur when building a [`CouponBook`].
#[derive(Debug, Error)]
pub enum CouponBookError {
    /// The coupon list is not valid JSON or does not match the coupon shape.
    #[error("invalid coupon list: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two coupons share a code (compared case-insensitively).
    #[error("duplicate coupon code: {0}")]
    DuplicateCode(String),
}

/// The list of coupons a client knows about.
///
/// Used to resolve a typed code to a [`Coupon`] before applying it. An empty
/// book means the client knows no coupons and defers to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponBook {
    coupons: Vec<Coupon>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CouponList {
    Wrapped { coupons: Vec<Coupon> },
    Bare(Vec<Coupon>),
}

impl CouponBook {
    /// Build a book from coupons.
    ///
    /// # Errors
    ///
    /// Returns [`CouponBookError::DuplicateCode`] if two coupons share a code.
    pub fn new(coupons: Vec<Coupon>) -> Result<Self, CouponBookError> {
        for (i, coupon) in coupons.iter().enumerate() {
            if coupons
                .iter()
                .skip(i + 1)
                .any(|other| other.matches_code(&coupon.code))
            {
                return Err(CouponBookError::DuplicateCode(coupon.code.clone()));
            }
        }
        Ok(Self { coupons })
    }

    /// Parse a book from JSON: either an array of coupons or an object with a
    /// `coupons` array.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or contains duplicate codes.
    pub fn from_json(json: &str) -> Result<Self, CouponBookError> {
        let coupons = match serde_json::from_str::<CouponList>(json)? {
            CouponList::Wrapped { coupons } | CouponList::Bare(coupons) => coupons,
        };
        Self::new(coupons)
    }

    /// Look up a coupon by code, case-insensitively.
    #[must_use]
    pub fn find(&self, code: &str) -> Option<&Coupon> {
        self.coupons.iter().find(|c| c.matches_code(code))
    }

    /// Whether the book holds no coupons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// Number of coupons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Iterate over the coupons.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.iter()
    }
}
