//! Cart totals.
//!
//! All derived money fields come from [`PricingPolicy::totals`]. Nothing else
//! computes a discount, and nothing derives one from a total mismatch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::item::CartItem;
use crate::types::{Coupon, Money};

/// Delivery fee and tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Flat fee charged whenever the subtotal is positive.
    pub delivery_fee: Money,
    /// Tax as a fraction of the subtotal (0.08 = 8%).
    pub tax_rate: Decimal,
}

impl PricingPolicy {
    /// Default delivery fee: 2.99.
    pub const DEFAULT_DELIVERY_FEE_CENTS: i64 = 299;
    /// Default tax rate numerator, in hundredths: 0.08.
    pub const DEFAULT_TAX_RATE_HUNDREDTHS: i64 = 8;

    /// Compute totals for `items` with an optional coupon.
    ///
    /// - `subtotal = sum(price * quantity)`
    /// - `delivery_fee` applies only when the subtotal is positive
    /// - `tax = subtotal * tax_rate`, rounded to cents
    /// - `total = subtotal + delivery_fee + tax - discount`
    #[must_use]
    pub fn totals(&self, items: &[CartItem], coupon: Option<&Coupon>) -> Totals {
        let subtotal: Money = items.iter().map(CartItem::line_total).sum();
        let delivery_fee = if subtotal.is_positive() {
            self.delivery_fee
        } else {
            Money::ZERO
        };
        let tax = (subtotal * self.tax_rate).round_cents();
        let discount = coupon.map_or(Money::ZERO, |c| c.discount_for(subtotal));
        let total = (subtotal + delivery_fee + tax).saturating_sub(discount);

        Totals {
            subtotal,
            delivery_fee,
            tax,
            discount,
            total,
        }
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            delivery_fee: Money::from_cents(Self::DEFAULT_DELIVERY_FEE_CENTS),
            tax_rate: Decimal::new(Self::DEFAULT_TAX_RATE_HUNDREDTHS, 2),
        }
    }
}

/// Derived money fields of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}
