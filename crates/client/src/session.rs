//! The cart session: one diner's cart kept in sync with the backend.
//!
//! Every operation updates the local cart optimistically, sends the matching
//! request, then reconciles the backend's answer through [`SyncedCart`]:
//!
//! 1. Apply the mutation locally and tag it with a sequence number
//! 2. Await the transport (the cart lock is not held across the call)
//! 3. On success, the response becomes the confirmed cart unless a newer one
//!    was already applied
//! 4. On failure, the mutation is dropped and a [`Notice`] is queued
//!
//! The session is an explicit, cloneable handle; nothing here is global.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use quickbite_core::{
    CartItem, CartMutation, CartPayload, CartState, CouponBook, Customization, MenuItemId,
    PricingPolicy, Reconciliation, RestaurantId, Seq, SyncedCart,
};

use crate::api::{
    AddItemRequest, ApiError, CheckoutRequest, OrderConfirmation, RemoveItemRequest,
    UpdateItemRequest,
};
use crate::notice::Notice;
use crate::transport::CartTransport;

/// Errors returned by session operations.
///
/// Every error is also reported as a [`Notice`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),
    #[error("Cart is empty")]
    EmptyCart,
}

/// A diner's cart session.
///
/// Cheap to clone; clones share the same cart.
#[derive(Clone)]
pub struct CartSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    transport: Arc<dyn CartTransport>,
    coupons: CouponBook,
    cart: Mutex<SyncedCart>,
    notices: Mutex<Vec<Notice>>,
}

impl std::fmt::Debug for CartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSession")
            .field("coupons", &self.inner.coupons.len())
            .finish_non_exhaustive()
    }
}

impl CartSession {
    /// Create a session with an empty cart.
    ///
    /// An empty `coupons` book leaves coupon validation to the backend.
    #[must_use]
    pub fn new(
        transport: Arc<dyn CartTransport>,
        coupons: CouponBook,
        policy: PricingPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                transport,
                coupons,
                cart: Mutex::new(SyncedCart::with_policy(policy)),
                notices: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The known coupons.
    #[must_use]
    pub fn coupons(&self) -> &CouponBook {
        &self.inner.coupons
    }

    /// The cart as the diner should see it, pending changes included.
    pub async fn snapshot(&self) -> CartState {
        self.inner.cart.lock().await.view().clone()
    }

    /// Number of changes still waiting for the backend.
    pub async fn pending_changes(&self) -> usize {
        self.inner.cart.lock().await.pending_len()
    }

    /// Drain queued notices.
    pub async fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.inner.notices.lock().await)
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    /// Load the cart from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> Result<CartState, SessionError> {
        let seq = self.inner.cart.lock().await.begin_fetch();
        let result = self.inner.transport.fetch_cart().await;
        self.settle(seq, "load cart", result).await
    }

    /// Add an item from a restaurant.
    ///
    /// Adding from a different restaurant than the one in the cart replaces
    /// the cart: the backend cart is cleared before the item is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change; the local cart is
    /// rolled back.
    #[instrument(skip_all, fields(menu_item_id = %item.id, restaurant_id = %restaurant_id))]
    pub async fn add_item(
        &self,
        item: CartItem,
        restaurant_id: RestaurantId,
        restaurant_name: &str,
    ) -> Result<CartState, SessionError> {
        let request = AddItemRequest::new(&item, &restaurant_id, restaurant_name);
        let mutation = CartMutation::AddItem {
            item,
            restaurant_id,
            restaurant_name: restaurant_name.to_string(),
        };

        let (seq, replaces) = {
            let mut cart = self.inner.cart.lock().await;
            let replaces = cart.view().would_replace(&request.restaurant_id);
            (cart.submit(mutation), replaces)
        };

        if replaces {
            info!("Switching restaurant, replacing cart");
            match self.inner.transport.clear_cart().await {
                Ok(payload) => {
                    // The backend cart is empty from here on, even if the add fails
                    if self.inner.cart.lock().await.advance(seq, payload)
                        == Reconciliation::Stale
                    {
                        debug!(%seq, "Ignoring stale clear response");
                    }
                }
                Err(e) => return self.settle(seq, "add item", Err(e)).await,
            }
        }

        let result = self.inner.transport.add_item(&request).await;
        self.settle(seq, "add item", result).await
    }

    /// Set the quantity of a line. A quantity of 0 or less removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change; the local cart is
    /// rolled back.
    #[instrument(skip(self, item_id, customization), fields(menu_item_id = %item_id))]
    pub async fn update_quantity(
        &self,
        item_id: &MenuItemId,
        customization: &Customization,
        quantity: i64,
    ) -> Result<CartState, SessionError> {
        let seq = self
            .inner
            .cart
            .lock()
            .await
            .submit(CartMutation::UpdateQuantity {
                item_id: item_id.clone(),
                customization: customization.clone(),
                quantity,
            });

        let result = if quantity <= 0 {
            let request = RemoveItemRequest::new(item_id, customization);
            self.inner.transport.remove_item(&request).await
        } else {
            let request = UpdateItemRequest::new(item_id, customization, quantity);
            self.inner.transport.update_item(&request).await
        };
        self.settle(seq, "update quantity", result).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change; the local cart is
    /// rolled back.
    #[instrument(skip_all, fields(menu_item_id = %item_id))]
    pub async fn remove_item(
        &self,
        item_id: &MenuItemId,
        customization: &Customization,
    ) -> Result<CartState, SessionError> {
        let seq = self
            .inner
            .cart
            .lock()
            .await
            .submit(CartMutation::RemoveItem {
                item_id: item_id.clone(),
                customization: customization.clone(),
            });

        let request = RemoveItemRequest::new(item_id, customization);
        let result = self.inner.transport.remove_item(&request).await;
        self.settle(seq, "remove item", result).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change; the local cart is
    /// rolled back.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<CartState, SessionError> {
        let seq = self.inner.cart.lock().await.submit(CartMutation::Clear);
        let result = self.inner.transport.clear_cart().await;
        self.settle(seq, "clear cart", result).await
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Apply a coupon by code.
    ///
    /// With a non-empty coupon book, unknown codes are refused without a
    /// request and known ones are applied optimistically. With an empty book
    /// the backend decides, and the coupon shows up once it answers.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCoupon`] if the code is blank, unknown
    /// or refused by the backend.
    #[instrument(skip(self))]
    pub async fn apply_coupon(&self, code: &str) -> Result<CartState, SessionError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(self.invalid_coupon(code).await);
        }

        let seq = if self.inner.coupons.is_empty() {
            self.inner.cart.lock().await.begin_fetch()
        } else {
            let Some(coupon) = self.inner.coupons.find(code) else {
                return Err(self.invalid_coupon(code).await);
            };
            self.inner
                .cart
                .lock()
                .await
                .submit(CartMutation::ApplyCoupon(coupon.clone()))
        };

        match self.inner.transport.apply_coupon(code).await {
            Err(e) if e.is_rejection() => {
                debug!(error = %e, "Backend refused coupon");
                self.inner.cart.lock().await.reject(seq);
                Err(self.invalid_coupon(code).await)
            }
            result => self.settle(seq, "apply coupon", result).await,
        }
    }

    /// Remove the applied coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change; the local cart is
    /// rolled back.
    #[instrument(skip(self))]
    pub async fn remove_coupon(&self) -> Result<CartState, SessionError> {
        let seq = self
            .inner
            .cart
            .lock()
            .await
            .submit(CartMutation::RemoveCoupon);
        let result = self.inner.transport.remove_coupon().await;
        self.settle(seq, "remove coupon", result).await
    }

    /// Fetch server-computed totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    #[instrument(skip(self))]
    pub async fn refresh_pricing(&self) -> Result<CartState, SessionError> {
        let seq = self.inner.cart.lock().await.begin_fetch();
        let result = self.inner.transport.fetch_pricing().await;
        self.settle(seq, "refresh pricing", result).await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Place an order from the current cart.
    ///
    /// On success the cart is reset. On failure it is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyCart`] if there is nothing to order, or
    /// the backend's error.
    #[instrument(skip(self, request), fields(payment_method = %request.payment_method))]
    pub async fn checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<OrderConfirmation, SessionError> {
        if self.inner.cart.lock().await.view().is_empty() {
            self.notify(Notice::CheckoutFailed {
                message: "Your cart is empty".to_string(),
            })
            .await;
            return Err(SessionError::EmptyCart);
        }

        match self.inner.transport.create_order(request).await {
            Ok(order) => {
                info!(order_id = %order.id, status = %order.status, "Order placed");
                self.inner.cart.lock().await.reset();
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed");
                self.notify(Notice::CheckoutFailed {
                    message: e.user_message(),
                })
                .await;
                Err(e.into())
            }
        }
    }

    /// Forget the cart and any queued notices.
    ///
    /// Responses to requests sent before logout are ignored.
    pub async fn logout(&self) {
        self.inner.cart.lock().await.reset();
        self.inner.notices.lock().await.clear();
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Reconcile the answer to request `seq`.
    async fn settle(
        &self,
        seq: Seq,
        action: &'static str,
        result: Result<CartPayload, ApiError>,
    ) -> Result<CartState, SessionError> {
        match result {
            Ok(payload) => {
                let mut cart = self.inner.cart.lock().await;
                if cart.acknowledge(seq, payload) == Reconciliation::Stale {
                    debug!(%seq, action, "Ignoring stale cart response");
                }
                Ok(cart.view().clone())
            }
            Err(e) => {
                warn!(%seq, action, error = %e, "Cart sync failed, rolling back");
                self.inner.cart.lock().await.reject(seq);
                self.notify(Notice::SyncFailed {
                    action,
                    message: e.user_message(),
                })
                .await;
                Err(e.into())
            }
        }
    }

    async fn invalid_coupon(&self, code: &str) -> SessionError {
        self.notify(Notice::InvalidCoupon {
            code: code.to_string(),
        })
        .await;
        SessionError::InvalidCoupon(code.to_string())
    }

    async fn notify(&self, notice: Notice) {
        self.inner.notices.lock().await.push(notice);
    }
}
