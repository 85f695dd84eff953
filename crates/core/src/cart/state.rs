//! Cart state and its operations.

use serde::{Deserialize, Serialize};

use super::item::CartItem;
use super::pricing::{PricingPolicy, Totals};
use super::snapshot::{CartPayload, CartSnapshot};
use crate::types::{Coupon, Customization, MenuItemId, Money, RestaurantId};

/// A diner's cart.
///
/// ## Invariants
///
/// - Every item belongs to `restaurant_id`
/// - No two items share an `(id, customization)` identity
/// - Every item has a quantity of at least 1
/// - After any local operation, `subtotal`, `delivery_fee`, `tax` and `total`
///   are exactly what [`PricingPolicy::totals`] gives for the current items
///   and coupon
///
/// [`reconcile`](Self::reconcile) is the exception to the last point: it takes
/// the backend's totals as given.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(default)]
    items: Vec<CartItem>,
    #[serde(default)]
    restaurant_id: Option<RestaurantId>,
    #[serde(default)]
    restaurant_name: Option<String>,
    #[serde(default)]
    applied_coupon: Option<Coupon>,
    #[serde(default)]
    subtotal: Money,
    #[serde(default)]
    delivery_fee: Money,
    #[serde(default)]
    tax: Money,
    #[serde(default)]
    total: Money,
    #[serde(skip)]
    policy: PricingPolicy,
}

impl CartState {
    /// An empty cart with the default pricing policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty cart with a custom pricing policy.
    #[must_use]
    pub fn with_policy(policy: PricingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `item` to the cart.
    ///
    /// If the cart is empty or already holds items from `restaurant_id`, the
    /// item merges into an existing line with the same identity (adding its
    /// quantity) or is appended. If the cart holds items from another
    /// restaurant, the whole cart is replaced by this single item and any
    /// applied coupon is dropped.
    ///
    /// A quantity of 0 on `item` counts as 1.
    pub fn add_item(
        &mut self,
        mut item: CartItem,
        restaurant_id: RestaurantId,
        restaurant_name: impl Into<String>,
    ) {
        item.quantity = item.quantity.max(1);

        if self.would_replace(&restaurant_id) {
            self.items = vec![item];
            self.applied_coupon = None;
        } else if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.matches(&item.id, &item.customization))
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }

        self.restaurant_id = Some(restaurant_id);
        self.restaurant_name = Some(restaurant_name.into());
        self.recompute_totals();
    }

    /// Set the quantity of the line identified by `(item_id, customization)`.
    ///
    /// A quantity of 0 or less removes the line. Unknown lines are ignored.
    pub fn update_quantity(
        &mut self,
        item_id: &MenuItemId,
        customization: &Customization,
        quantity: i64,
    ) {
        if quantity <= 0 {
            self.items.retain(|line| !line.matches(item_id, customization));
        } else if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.matches(item_id, customization))
        {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        self.recompute_totals();
    }

    /// Remove the line identified by `(item_id, customization)`.
    pub fn remove_item(&mut self, item_id: &MenuItemId, customization: &Customization) {
        self.items
            .retain(|line| !line.matches(item_id, customization));
        self.recompute_totals();
    }

    /// Apply a coupon, replacing any previous one.
    pub fn apply_coupon(&mut self, coupon: Coupon) {
        self.applied_coupon = Some(coupon);
        self.recompute_totals();
    }

    /// Drop the applied coupon.
    pub fn remove_coupon(&mut self) {
        self.applied_coupon = None;
        self.recompute_totals();
    }

    /// Reset to the empty cart, keeping the pricing policy.
    pub fn clear(&mut self) {
        *self = Self::with_policy(self.policy);
    }

    /// Recompute the derived money fields from the items and coupon.
    pub fn recompute_totals(&mut self) {
        let totals = self.computed_totals();
        self.subtotal = totals.subtotal;
        self.delivery_fee = totals.delivery_fee;
        self.tax = totals.tax;
        self.total = totals.total;
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Overwrite this cart with an authoritative payload.
    pub fn reconcile_payload(&mut self, payload: CartPayload) {
        self.reconcile(payload.into_snapshot());
    }

    /// Overwrite this cart with an authoritative snapshot.
    ///
    /// Every field present in the snapshot replaces the local value; absent
    /// fields keep it. `items`, when present, replaces the whole list (it is
    /// not merged). Lines without a usable ID or with a quantity below 1 are
    /// dropped. Totals are taken as given, not recomputed.
    pub fn reconcile(&mut self, snapshot: CartSnapshot) {
        if let Some(items) = snapshot.items {
            self.items = items
                .into_iter()
                .filter_map(super::snapshot::RemoteCartItem::into_cart_item)
                .collect();
        }
        if let Some(subtotal) = snapshot.subtotal {
            self.subtotal = subtotal;
        }
        if let Some(delivery_fee) = snapshot.delivery_fee {
            self.delivery_fee = delivery_fee;
        }
        if let Some(tax) = snapshot.tax {
            self.tax = tax;
        }
        if let Some(total) = snapshot.total {
            self.total = total;
        }
        if let Some(restaurant_id) = snapshot.restaurant_id {
            self.restaurant_id = Some(restaurant_id);
        }
        if let Some(restaurant_name) = snapshot.restaurant_name {
            self.restaurant_name = Some(restaurant_name);
        }
        if let Some(coupon) = snapshot.applied_coupon {
            self.applied_coupon = coupon;
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether adding an item from `restaurant_id` would replace the cart.
    #[must_use]
    pub fn would_replace(&self, restaurant_id: &RestaurantId) -> bool {
        !self.items.is_empty() && self.restaurant_id.as_ref() != Some(restaurant_id)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Find the line identified by `(item_id, customization)`.
    #[must_use]
    pub fn find(&self, item_id: &MenuItemId, customization: &Customization) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|line| line.matches(item_id, customization))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    #[must_use]
    pub const fn restaurant_id(&self) -> Option<&RestaurantId> {
        self.restaurant_id.as_ref()
    }

    #[must_use]
    pub fn restaurant_name(&self) -> Option<&str> {
        self.restaurant_name.as_deref()
    }

    #[must_use]
    pub const fn applied_coupon(&self) -> Option<&Coupon> {
        self.applied_coupon.as_ref()
    }

    #[must_use]
    pub const fn subtotal(&self) -> Money {
        self.subtotal
    }

    #[must_use]
    pub const fn delivery_fee(&self) -> Money {
        self.delivery_fee
    }

    #[must_use]
    pub const fn tax(&self) -> Money {
        self.tax
    }

    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    /// Discount from the applied coupon on the current subtotal.
    #[must_use]
    pub fn discount(&self) -> Money {
        self.applied_coupon
            .as_ref()
            .map_or(Money::ZERO, |c| c.discount_for(self.subtotal))
    }

    /// The stored totals, with the discount computed from the coupon.
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            tax: self.tax,
            discount: self.discount(),
            total: self.total,
        }
    }

    /// What the totals would be if recomputed now.
    #[must_use]
    pub fn computed_totals(&self) -> Totals {
        self.policy
            .totals(&self.items, self.applied_coupon.as_ref())
    }

    #[must_use]
    pub const fn policy(&self) -> &PricingPolicy {
        &self.policy
    }
}
