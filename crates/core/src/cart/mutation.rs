//! Local cart mutations as values.
//!
//! The sync layer keeps mutations that the backend has not confirmed yet so it
//! can replay them on top of the latest authoritative state.

use super::item::CartItem;
use super::state::CartState;
use crate::types::{Coupon, Customization, MenuItemId, RestaurantId};

/// A user-initiated change to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMutation {
    AddItem {
        item: CartItem,
        restaurant_id: RestaurantId,
        restaurant_name: String,
    },
    UpdateQuantity {
        item_id: MenuItemId,
        customization: Customization,
        quantity: i64,
    },
    RemoveItem {
        item_id: MenuItemId,
        customization: Customization,
    },
    ApplyCoupon(Coupon),
    RemoveCoupon,
    Clear,
}

impl CartMutation {
    /// Apply this mutation to `cart`.
    pub fn apply(&self, cart: &mut CartState) {
        match self {
            Self::AddItem {
                item,
                restaurant_id,
                restaurant_name,
            } => cart.add_item(item.clone(), restaurant_id.clone(), restaurant_name.as_str()),
            Self::UpdateQuantity {
                item_id,
                customization,
                quantity,
            } => cart.update_quantity(item_id, customization, *quantity),
            Self::RemoveItem {
                item_id,
                customization,
            } => cart.remove_item(item_id, customization),
            Self::ApplyCoupon(coupon) => cart.apply_coupon(coupon.clone()),
            Self::RemoveCoupon => cart.remove_coupon(),
            Self::Clear => cart.clear(),
        }
    }

    /// Short name for logs and notices.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::AddItem { .. } => "add item",
            Self::UpdateQuantity { .. } => "update quantity",
            Self::RemoveItem { .. } => "remove item",
            Self::ApplyCoupon(_) => "apply coupon",
            Self::RemoveCoupon => "remove coupon",
            Self::Clear => "clear cart",
        }
    }
}
