//! Transport seam between the cart session and the backend.
//!
//! [`CartApiClient`](crate::api::CartApiClient) implements this over HTTP.
//! Tests plug in an in-memory backend instead.

use async_trait::async_trait;

use quickbite_core::CartPayload;

use crate::api::{
    AddItemRequest, ApiError, CheckoutRequest, OrderConfirmation, RemoveItemRequest,
    UpdateItemRequest,
};

/// Remote cart operations. Every cart call answers with the full cart.
#[async_trait]
pub trait CartTransport: Send + Sync {
    /// Fetch the current cart.
    async fn fetch_cart(&self) -> Result<CartPayload, ApiError>;

    /// Add an item (the backend merges matching lines).
    async fn add_item(&self, request: &AddItemRequest) -> Result<CartPayload, ApiError>;

    /// Set the quantity of one line.
    async fn update_item(&self, request: &UpdateItemRequest) -> Result<CartPayload, ApiError>;

    /// Remove one line.
    async fn remove_item(&self, request: &RemoveItemRequest) -> Result<CartPayload, ApiError>;

    /// Remove every line and the coupon.
    async fn clear_cart(&self) -> Result<CartPayload, ApiError>;

    /// Apply a coupon by code. The backend validates the code.
    async fn apply_coupon(&self, code: &str) -> Result<CartPayload, ApiError>;

    /// Remove the applied coupon.
    async fn remove_coupon(&self) -> Result<CartPayload, ApiError>;

    /// Fetch server-computed totals.
    async fn fetch_pricing(&self) -> Result<CartPayload, ApiError>;

    /// Place an order from the server-side cart.
    async fn create_order(&self, request: &CheckoutRequest)
    -> Result<OrderConfirmation, ApiError>;
}
