//! Authoritative cart payloads from a backend.
//!
//! Backends return the whole cart after every mutation, sometimes wrapped in
//! a `cart` envelope, with every field optional. A field that is absent means
//! "unchanged" to [`CartState::reconcile`](super::CartState::reconcile); a
//! coupon that is explicitly `null` means "no coupon".

use serde::{Deserialize, Deserializer, Serialize};

use super::item::CartItem;
use super::state::CartState;
use crate::types::{Coupon, Customization, MenuItemId, Money, RestaurantId};

/// A cart payload as received, with or without a `cart` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CartPayload {
    /// `{ "cart": { ... } }`
    Enveloped { cart: CartSnapshot },
    /// `{ ... }`
    Bare(CartSnapshot),
}

impl CartPayload {
    /// Unwrap the envelope.
    #[must_use]
    pub fn into_snapshot(self) -> CartSnapshot {
        match self {
            Self::Enveloped { cart } | Self::Bare(cart) => cart,
        }
    }
}

impl From<CartSnapshot> for CartPayload {
    fn from(snapshot: CartSnapshot) -> Self {
        Self::Bare(snapshot)
    }
}

/// An authoritative cart snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<RemoteCartItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<RestaurantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    /// `None`: key absent, keep the current coupon. `Some(None)`: explicit
    /// `null`, clear it.
    #[serde(
        default,
        alias = "coupon",
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub applied_coupon: Option<Option<Coupon>>,
}

impl From<&CartState> for CartSnapshot {
    fn from(state: &CartState) -> Self {
        Self {
            items: Some(state.items().iter().map(RemoteCartItem::from).collect()),
            subtotal: Some(state.subtotal()),
            delivery_fee: Some(state.delivery_fee()),
            tax: Some(state.tax()),
            total: Some(state.total()),
            restaurant_id: state.restaurant_id().cloned(),
            restaurant_name: state.restaurant_name().map(str::to_owned),
            applied_coupon: Some(state.applied_coupon().cloned()),
        }
    }
}

/// A line item as a backend describes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartItem {
    /// The menu item, either as a bare ID or populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<RemoteItemRef>,
    /// Fallback when `menu_item_id` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MenuItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Kept exactly as received so later lookups match what the backend stored.
    #[serde(default)]
    pub customization: Customization,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

impl RemoteCartItem {
    /// Convert to a local line item.
    ///
    /// Returns `None` when the line has no usable menu item ID or a quantity
    /// below 1. Fields missing on the line fall back to the populated menu
    /// item, then to empty values.
    #[must_use]
    pub fn into_cart_item(self) -> Option<CartItem> {
        let quantity = u32::try_from(self.quantity).ok().filter(|q| *q > 0)?;

        let (id, populated) = match self.menu_item_id {
            Some(RemoteItemRef::Id(id)) => (Some(id), None),
            Some(RemoteItemRef::Populated(item)) => (Some(item.id.clone()), Some(item)),
            None => (None, None),
        };
        let id = id.or(self.id)?;

        let name = self
            .name
            .or_else(|| populated.as_ref().and_then(|p| p.name.clone()))
            .unwrap_or_default();
        let price = self
            .price
            .or_else(|| populated.as_ref().and_then(|p| p.price))
            .unwrap_or(Money::ZERO);
        let image = self
            .image
            .or_else(|| populated.and_then(|p| p.image));

        Some(CartItem {
            id,
            name,
            price,
            image,
            customization: self.customization,
            quantity,
        })
    }
}

impl From<&CartItem> for RemoteCartItem {
    fn from(item: &CartItem) -> Self {
        Self {
            menu_item_id: Some(RemoteItemRef::Id(item.id.clone())),
            id: None,
            name: Some(item.name.clone()),
            price: Some(item.price),
            image: item.image.clone(),
            customization: item.customization.clone(),
            quantity: i64::from(item.quantity),
        }
    }
}

/// Reference to a menu item inside a remote line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteItemRef {
    /// A bare menu item ID.
    Id(MenuItemId),
    /// The menu item document itself.
    Populated(PopulatedMenuItem),
}

/// A menu item document embedded in a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedMenuItem {
    #[serde(alias = "_id")]
    pub id: MenuItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Distinguish an absent key (`None`, via `default`) from an explicit `null`
/// (`Some(None)`).
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
