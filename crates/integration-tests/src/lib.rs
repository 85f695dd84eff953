//! Integration tests for QuickBite.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quickbite-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_engine` - Cart state engine properties
//! - `session_sync` - Cart session against an in-memory backend
//!
//! [`InMemoryBackend`] stands in for the QuickBite backend. It keeps its own
//! cart with the core engine, stores customizations exactly as they arrive on
//! the wire, records every call, and can fail or delay chosen calls.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::{Mutex, oneshot};

use quickbite_client::CartTransport;
use quickbite_client::api::{
    AddItemRequest, ApiError, CheckoutRequest, OrderConfirmation, RemoveItemRequest,
    UpdateItemRequest,
};
use quickbite_core::{
    CartItem, CartPayload, CartSnapshot, CartState, CouponBook, Customization, MenuItemId, Money,
    OrderId, OrderStatus,
};

/// A call the backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    FetchCart,
    AddItem(AddItemRequest),
    UpdateItem(UpdateItemRequest),
    RemoveItem(RemoveItemRequest),
    ClearCart,
    ApplyCoupon(String),
    RemoveCoupon,
    FetchPricing,
    CreateOrder(CheckoutRequest),
}

/// How an injected failure answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// A status the backend chose, with its message.
    Status(u16, String),
    Unauthorized,
}

impl Failure {
    fn into_error(self) -> ApiError {
        match self {
            Self::Status(status, message) => ApiError::Rejected { status, message },
            Self::Unauthorized => ApiError::Unauthorized,
        }
    }
}

#[derive(Default)]
struct BackendState {
    cart: CartState,
    coupons: CouponBook,
    calls: Vec<BackendCall>,
    failures: VecDeque<Option<Failure>>,
    holds: VecDeque<oneshot::Receiver<()>>,
    orders: u32,
}

/// In-memory cart backend.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    /// A backend with an empty cart that accepts no coupons.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that accepts the coupons in `coupons`.
    #[must_use]
    pub fn with_coupons(coupons: CouponBook) -> Self {
        Self {
            state: Mutex::new(BackendState {
                coupons,
                ..BackendState::default()
            }),
        }
    }

    /// Replace the backend's cart.
    pub async fn seed(&self, cart: CartState) {
        self.state.lock().await.cart = cart;
    }

    /// The backend's cart.
    pub async fn cart(&self) -> CartState {
        self.state.lock().await.cart.clone()
    }

    /// Every call received so far.
    pub async fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().await.calls.clone()
    }

    /// Fail the next call without changing the cart.
    ///
    /// Queued after [`pass_next`](Self::pass_next), this fails the call after
    /// the passed ones.
    pub async fn fail_next(&self, failure: Failure) {
        self.state.lock().await.failures.push_back(Some(failure));
    }

    /// Let the next call through before any queued failure applies.
    pub async fn pass_next(&self) {
        self.state.lock().await.failures.push_back(None);
    }

    /// Hold the answer to the next call until the returned sender fires.
    ///
    /// The call is still applied to the backend cart when it arrives; only the
    /// response is delayed.
    pub async fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().await.holds.push_back(rx);
        tx
    }

    /// Record `call`, apply `op` unless a failure is queued, then wait for any
    /// hold before answering.
    async fn handle<T: Send>(
        &self,
        call: BackendCall,
        op: impl FnOnce(&mut BackendState) -> Result<T, ApiError> + Send,
    ) -> Result<T, ApiError> {
        let (result, hold) = {
            let mut state = self.state.lock().await;
            state.calls.push(call);
            let hold = state.holds.pop_front();
            let result = match state.failures.pop_front().flatten() {
                Some(failure) => Err(failure.into_error()),
                None => op(&mut state),
            };
            (result, hold)
        };

        if let Some(hold) = hold {
            let _ = hold.await;
        }
        result
    }
}

/// Answer with the whole cart, through the JSON wire shape.
fn respond(cart: &CartState) -> Result<CartPayload, ApiError> {
    let body = serde_json::json!({ "cart": CartSnapshot::from(cart) });
    Ok(serde_json::from_value(body)?)
}

fn wire_customization(wire: &str) -> Customization {
    Customization::Raw(wire.to_string())
}

#[async_trait]
impl CartTransport for InMemoryBackend {
    async fn fetch_cart(&self) -> Result<CartPayload, ApiError> {
        self.handle(BackendCall::FetchCart, |state| respond(&state.cart))
            .await
    }

    async fn add_item(&self, request: &AddItemRequest) -> Result<CartPayload, ApiError> {
        self.handle(BackendCall::AddItem(request.clone()), |state| {
            let mut item = CartItem::new(
                request.menu_item_id.clone(),
                request.name.clone(),
                request.price,
            )
            .with_quantity(request.quantity)
            .with_customization(wire_customization(&request.customization));
            if let Some(image) = &request.image {
                item = item.with_image(image.clone());
            }
            state.cart.add_item(
                item,
                request.restaurant_id.clone(),
                request.restaurant_name.clone(),
            );
            respond(&state.cart)
        })
        .await
    }

    async fn update_item(&self, request: &UpdateItemRequest) -> Result<CartPayload, ApiError> {
        self.handle(BackendCall::UpdateItem(request.clone()), |state| {
            let customization = wire_customization(&request.customization);
            if state
                .cart
                .find(&request.menu_item_id, &customization)
                .is_none()
            {
                return Err(ApiError::NotFound(format!(
                    "/cart/items/{}",
                    request.menu_item_id
                )));
            }
            state
                .cart
                .update_quantity(&request.menu_item_id, &customization, request.quantity);
            respond(&state.cart)
        })
        .await
    }

    async fn remove_item(&self, request: &RemoveItemRequest) -> Result<CartPayload, ApiError> {
        self.handle(BackendCall::RemoveItem(request.clone()), |state| {
            state.cart.remove_item(
                &request.menu_item_id,
                &wire_customization(&request.customization),
            );
            respond(&state.cart)
        })
        .await
    }

    async fn clear_cart(&self) -> Result<CartPayload, ApiError> {
        self.handle(BackendCall::ClearCart, |state| {
            state.cart.clear();
            respond(&state.cart)
        })
        .await
    }

    async fn apply_coupon(&self, code: &str) -> Result<CartPayload, ApiError> {
        self.handle(BackendCall::ApplyCoupon(code.to_string()), |state| {
            let coupon = state
                .coupons
                .find(code)
                .cloned()
                .ok_or_else(|| ApiError::Rejected {
                    status: 400,
                    message: "Invalid coupon code".to_string(),
                })?;
            state.cart.apply_coupon(coupon);
            respond(&state.cart)
        })
        .await
    }

    async fn remove_coupon(&self) -> Result<CartPayload, ApiError> {
        self.handle(BackendCall::RemoveCoupon, |state| {
            state.cart.remove_coupon();
            respond(&state.cart)
        })
        .await
    }

    async fn fetch_pricing(&self) -> Result<CartPayload, ApiError> {
        self.handle(BackendCall::FetchPricing, |state| {
            // Pricing answers carry totals only
            let body = serde_json::json!({
                "subtotal": state.cart.subtotal(),
                "deliveryFee": state.cart.delivery_fee(),
                "tax": state.cart.tax(),
                "total": state.cart.total(),
            });
            Ok(serde_json::from_value(body)?)
        })
        .await
    }

    async fn create_order(
        &self,
        request: &CheckoutRequest,
    ) -> Result<OrderConfirmation, ApiError> {
        self.handle(BackendCall::CreateOrder(request.clone()), |state| {
            if state.cart.is_empty() {
                return Err(ApiError::Rejected {
                    status: 400,
                    message: "Cart is empty".to_string(),
                });
            }
            state.orders += 1;
            let order = OrderConfirmation {
                id: OrderId::new(format!("order-{}", state.orders)),
                status: OrderStatus::Confirmed,
                total: Some(state.cart.total()),
                estimated_delivery_minutes: Some(35),
                created_at: None,
            };
            state.cart.clear();
            Ok(order)
        })
        .await
    }
}

/// A menu item line for tests.
#[must_use]
pub fn menu_item(id: &str, name: &str, cents: i64) -> CartItem {
    CartItem::new(MenuItemId::new(id), name, Money::from_cents(cents))
}
