//! Request and response bodies for the cart backend.
//!
//! Customizations always cross the wire as a string: `"{}"` when there is
//! none, JSON text otherwise (see [`Customization::to_wire`]). The backend
//! matches lines on that exact string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quickbite_core::{
    CartItem, Customization, MenuItemId, Money, OrderId, OrderStatus, PaymentMethod, RestaurantId,
};

// =============================================================================
// Cart Requests
// =============================================================================

/// Body of `POST /cart/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub menu_item_id: MenuItemId,
    pub name: String,
    #[serde(with = "quickbite_core::types::money::as_number")]
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
    /// Wire-encoded customization.
    pub customization: String,
    pub restaurant_id: RestaurantId,
    pub restaurant_name: String,
}

impl AddItemRequest {
    /// Build the request for adding `item` from a restaurant.
    #[must_use]
    pub fn new(item: &CartItem, restaurant_id: &RestaurantId, restaurant_name: &str) -> Self {
        Self {
            menu_item_id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            image: item.image.clone(),
            quantity: item.quantity.max(1),
            customization: item.customization.to_wire(),
            restaurant_id: restaurant_id.clone(),
            restaurant_name: restaurant_name.to_owned(),
        }
    }
}

/// Body of `PUT /cart/items/{menu_item_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    /// Path parameter, not sent in the body.
    #[serde(skip)]
    pub menu_item_id: MenuItemId,
    pub quantity: i64,
    /// Wire-encoded customization.
    pub customization: String,
}

impl UpdateItemRequest {
    #[must_use]
    pub fn new(menu_item_id: &MenuItemId, customization: &Customization, quantity: i64) -> Self {
        Self {
            menu_item_id: menu_item_id.clone(),
            quantity,
            customization: customization.to_wire(),
        }
    }
}

/// Body of `DELETE /cart/items/{menu_item_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    /// Path parameter, not sent in the body.
    #[serde(skip)]
    pub menu_item_id: MenuItemId,
    /// Wire-encoded customization.
    pub customization: String,
}

impl RemoveItemRequest {
    #[must_use]
    pub fn new(menu_item_id: &MenuItemId, customization: &Customization) -> Self {
        Self {
            menu_item_id: menu_item_id.clone(),
            customization: customization.to_wire(),
        }
    }
}

/// Body of `POST /cart/coupon`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

// =============================================================================
// Orders
// =============================================================================

/// Body of `POST /orders`. The order is built from the server-side cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A placed order, as acknowledged by the backend.
///
/// Decoding is lenient: the order already exists by the time this is read,
/// so unknown statuses and repeated ID fields must not fail it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RemoteOrder")]
pub struct OrderConfirmation {
    pub id: OrderId,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An order as backends send it. Mongo-style bodies carry both `_id` and
/// `id`, so each spelling gets its own field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteOrder {
    #[serde(default)]
    id: Option<OrderId>,
    #[serde(default, rename = "_id")]
    object_id: Option<OrderId>,
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(default)]
    status: Option<OrderStatus>,
    #[serde(default)]
    total: Option<Money>,
    #[serde(default)]
    total_amount: Option<Money>,
    #[serde(default)]
    estimated_delivery_minutes: Option<u32>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<RemoteOrder> for OrderConfirmation {
    type Error = &'static str;

    fn try_from(order: RemoteOrder) -> Result<Self, Self::Error> {
        let id = order
            .id
            .or(order.object_id)
            .or(order.order_id)
            .ok_or("order has no id")?;

        Ok(Self {
            id,
            status: order.status.unwrap_or_default(),
            total: order.total.or(order.total_amount),
            estimated_delivery_minutes: order.estimated_delivery_minutes,
            created_at: order.created_at,
        })
    }
}

/// An order response, with or without an `order` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderPayload {
    Enveloped { order: OrderConfirmation },
    Bare(OrderConfirmation),
}

impl OrderPayload {
    #[must_use]
    pub fn into_confirmation(self) -> OrderConfirmation {
        match self {
            Self::Enveloped { order } | Self::Bare(order) => order,
        }
    }
}

// =============================================================================
// Error Bodies
// =============================================================================

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_add_item_request_encodes_empty_customization() {
        let item = CartItem::new(MenuItemId::new("m1"), "Dosa", Money::from_cents(450));
        let request = AddItemRequest::new(&item, &RestaurantId::new("r1"), "Dosa Corner");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["customization"], json!("{}"));
        assert_eq!(body["menuItemId"], json!("m1"));
        assert_eq!(body["price"], json!(4.5));
        assert_eq!(body["quantity"], json!(1));
        assert_eq!(body["restaurantId"], json!("r1"));
        assert!(body.get("image").is_none());
    }

    #[test]
    fn test_add_item_request_encodes_structured_customization_as_string() {
        let item = CartItem::new(MenuItemId::new("m1"), "Pizza", Money::from_cents(1200))
            .with_customization(Customization::structured([
                ("size", json!("large")),
                ("extras", json!(["olives"])),
            ]));
        let request = AddItemRequest::new(&item, &RestaurantId::new("r1"), "Slice");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body["customization"],
            json!(r#"{"size":"large","extras":["olives"]}"#)
        );
    }

    #[test]
    fn test_update_request_keeps_id_out_of_body() {
        let request = UpdateItemRequest::new(&MenuItemId::new("m1"), &Customization::None, 3);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({"quantity": 3, "customization": "{}"}));
    }

    #[test]
    fn test_remove_request_preserves_raw_customization() {
        let raw = Customization::Raw(r#"{"spice": "hot"}"#.to_string());
        let request = RemoveItemRequest::new(&MenuItemId::new("m1"), &raw);
        assert_eq!(request.customization, r#"{"spice": "hot"}"#);
    }

    #[test]
    fn test_order_payload_shapes() {
        let enveloped: OrderPayload = serde_json::from_str(
            r#"{"order": {"_id": "o1", "status": "confirmed", "totalAmount": 27.5}}"#,
        )
        .unwrap();
        let order = enveloped.into_confirmation();
        assert_eq!(order.id, OrderId::new("o1"));
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.total, Some(Money::from_cents(2750)));

        let bare: OrderPayload = serde_json::from_str(r#"{"id": 12}"#).unwrap();
        let order = bare.into_confirmation();
        assert_eq!(order.id, OrderId::new("12"));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_order_with_repeated_ids_and_unknown_status() {
        let order = serde_json::from_str::<OrderPayload>(
            r#"{"order": {"_id": "o1", "id": "o1", "status": "placed", "total": "31.40"}}"#,
        )
        .unwrap()
        .into_confirmation();
        assert_eq!(order.id, OrderId::new("o1"));
        assert_eq!(order.status, OrderStatus::Unknown);
        assert_eq!(order.total, Some(Money::from_cents(3140)));

        let order = serde_json::from_str::<OrderPayload>(
            r#"{"order": {"_id": "o2", "status": null, "createdAt": "2026-10-17T12:00:00Z"}}"#,
        )
        .unwrap()
        .into_confirmation();
        assert_eq!(order.id, OrderId::new("o2"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_order_without_id_is_rejected() {
        let result = serde_json::from_str::<OrderPayload>(r#"{"order": {"status": "confirmed"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_checkout_request_shape() {
        let request = CheckoutRequest {
            delivery_address: "12 Curry Lane".to_string(),
            payment_method: PaymentMethod::Upi,
            notes: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({"deliveryAddress": "12 Curry Lane", "paymentMethod": "upi"})
        );
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": "Invalid coupon"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid coupon"));
        let empty: ErrorBody = serde_json::from_str(r#"{"message": " "}"#).unwrap();
        assert!(empty.into_message().is_none());
    }
}
