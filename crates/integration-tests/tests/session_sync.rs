//! Integration tests for the cart session against an in-memory backend.
//!
//! Covers optimistic updates, reconciliation, rollback on failure, coupon
//! validation, out-of-order responses and checkout.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use quickbite_client::api::CheckoutRequest;
use quickbite_client::{CartSession, Notice, SessionError};
use quickbite_core::{
    CartState, Coupon, CouponBook, Customization, MenuItemId, Money, OrderStatus, PaymentMethod,
    PricingPolicy, RestaurantId,
};
use quickbite_integration_tests::{BackendCall, Failure, InMemoryBackend, menu_item};

fn coupons() -> CouponBook {
    CouponBook::new(vec![
        Coupon::percentage("SAVE10", Decimal::from(10), Some(Money::from_cents(1500))),
        Coupon::fixed("FLAT5", Money::from_cents(500)),
    ])
    .unwrap()
}

fn session_with(backend: &Arc<InMemoryBackend>, book: CouponBook) -> CartSession {
    CartSession::new(backend.clone(), book, PricingPolicy::default())
}

fn r1() -> RestaurantId {
    RestaurantId::new("r1")
}

fn checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        delivery_address: "12 Curry Lane".to_string(),
        payment_method: PaymentMethod::Card,
        notes: None,
    }
}

// =============================================================================
// Hydrate And Basic Sync
// =============================================================================

#[tokio::test]
async fn test_hydrate_loads_backend_cart() {
    let backend = Arc::new(InMemoryBackend::new());
    let mut seeded = CartState::new();
    seeded.add_item(menu_item("a", "Thali", 10000).with_quantity(2), r1(), "Spice Route");
    backend.seed(seeded).await;

    let session = session_with(&backend, CouponBook::default());
    let cart = session.hydrate().await.unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(cart.restaurant_name(), Some("Spice Route"));
    assert_eq!(cart.total(), Money::from_cents(21899));
    assert_eq!(session.pending_changes().await, 0);
}

#[tokio::test]
async fn test_add_item_reconciles_with_backend() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());

    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();
    let cart = session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(cart, session.snapshot().await);
    assert_eq!(backend.cart().await.items()[0].quantity, 2);
    assert_eq!(session.pending_changes().await, 0);
}

#[tokio::test]
async fn test_empty_customization_is_sent_as_braces() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());

    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();
    session
        .add_item(
            menu_item("b", "Curry", 900)
                .with_customization(Customization::structured([("spice", json!("hot"))])),
            r1(),
            "Spice Route",
        )
        .await
        .unwrap();
    session
        .update_quantity(&MenuItemId::new("a"), &Customization::None, 3)
        .await
        .unwrap();

    let calls = backend.calls().await;
    let BackendCall::AddItem(plain) = &calls[0] else {
        panic!("expected add item, got {:?}", calls[0]);
    };
    assert_eq!(plain.customization, "{}");
    let BackendCall::AddItem(spicy) = &calls[1] else {
        panic!("expected add item, got {:?}", calls[1]);
    };
    assert_eq!(spicy.customization, r#"{"spice":"hot"}"#);
    let BackendCall::UpdateItem(update) = &calls[2] else {
        panic!("expected update item, got {:?}", calls[2]);
    };
    assert_eq!(update.customization, "{}");
    assert_eq!(update.quantity, 3);
}

#[tokio::test]
async fn test_update_to_zero_removes_on_backend() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());
    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();

    let cart = session
        .update_quantity(&MenuItemId::new("a"), &Customization::None, 0)
        .await
        .unwrap();

    assert!(cart.is_empty());
    assert!(matches!(
        backend.calls().await.last(),
        Some(BackendCall::RemoveItem(_))
    ));
}

#[tokio::test]
async fn test_lines_from_backend_match_local_customization() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());
    let hot = Customization::structured([("spice", json!("hot"))]);

    session
        .add_item(menu_item("b", "Curry", 900).with_customization(hot.clone()), r1(), "R")
        .await
        .unwrap();
    // The backend echoes the customization as a raw string
    let cart = session.remove_item(&MenuItemId::new("b"), &hot).await.unwrap();

    assert!(cart.is_empty());
    assert!(backend.cart().await.is_empty());
}

// =============================================================================
// Restaurant Switch
// =============================================================================

#[tokio::test]
async fn test_switching_restaurant_clears_backend_first() {
    let backend = Arc::new(InMemoryBackend::with_coupons(coupons()));
    let session = session_with(&backend, coupons());
    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();
    session.apply_coupon("FLAT5").await.unwrap();

    let cart = session
        .add_item(menu_item("z", "Sushi", 1800), RestaurantId::new("r2"), "Tokyo Bites")
        .await
        .unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.restaurant_id(), Some(&RestaurantId::new("r2")));
    assert!(cart.applied_coupon().is_none());

    let calls = backend.calls().await;
    let n = calls.len();
    assert_eq!(calls[n - 2], BackendCall::ClearCart);
    assert!(matches!(calls[n - 1], BackendCall::AddItem(_)));
}

#[tokio::test]
async fn test_failed_add_after_switch_keeps_cleared_cart() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());
    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();

    // The clear goes through, the add after it fails
    backend.pass_next().await;
    backend
        .fail_next(Failure::Status(503, "Kitchen closed".to_string()))
        .await;
    let result = session
        .add_item(menu_item("z", "Sushi", 1800), RestaurantId::new("r2"), "Tokyo Bites")
        .await;

    assert!(matches!(result, Err(SessionError::Api(_))));
    assert!(backend.cart().await.is_empty());
    let cart = session.snapshot().await;
    assert!(cart.is_empty());
    assert_eq!(cart.total(), Money::ZERO);
    assert_eq!(session.pending_changes().await, 0);

    assert!(matches!(
        session.checkout(&checkout_request()).await,
        Err(SessionError::EmptyCart)
    ));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_failed_add_rolls_back_and_notifies() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());
    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();

    backend
        .fail_next(Failure::Status(503, "Kitchen closed".to_string()))
        .await;
    let result = session
        .add_item(menu_item("b", "Lassi", 5000), r1(), "Spice Route")
        .await;

    assert!(matches!(result, Err(SessionError::Api(_))));
    let cart = session.snapshot().await;
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.subtotal(), Money::from_cents(10000));
    assert_eq!(session.pending_changes().await, 0);

    assert_eq!(
        session.take_notices().await,
        vec![Notice::SyncFailed {
            action: "add item",
            message: "Kitchen closed".to_string(),
        }]
    );
    assert!(session.take_notices().await.is_empty());
}

#[tokio::test]
async fn test_failed_clear_keeps_cart() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());
    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();

    backend.fail_next(Failure::Unauthorized).await;
    assert!(session.clear().await.is_err());

    assert_eq!(session.snapshot().await.items().len(), 1);
    assert!(matches!(
        session.take_notices().await.as_slice(),
        [Notice::SyncFailed { action: "clear cart", .. }]
    ));
}

// =============================================================================
// Coupons
// =============================================================================

#[tokio::test]
async fn test_unknown_coupon_is_refused_locally() {
    let backend = Arc::new(InMemoryBackend::with_coupons(coupons()));
    let session = session_with(&backend, coupons());
    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();
    let before = session.snapshot().await;
    let calls_before = backend.calls().await.len();

    let result = session.apply_coupon("BOGUS").await;

    assert!(matches!(result, Err(SessionError::InvalidCoupon(ref code)) if code == "BOGUS"));
    assert_eq!(session.snapshot().await, before);
    assert_eq!(backend.calls().await.len(), calls_before);
    assert_eq!(
        session.take_notices().await,
        vec![Notice::InvalidCoupon {
            code: "BOGUS".to_string()
        }]
    );
}

#[tokio::test]
async fn test_blank_coupon_is_refused() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());

    assert!(matches!(
        session.apply_coupon("   ").await,
        Err(SessionError::InvalidCoupon(_))
    ));
    assert!(backend.calls().await.is_empty());
}

#[tokio::test]
async fn test_known_coupon_applies_and_survives_reconcile() {
    let backend = Arc::new(InMemoryBackend::with_coupons(coupons()));
    let session = session_with(&backend, coupons());
    session
        .add_item(menu_item("a", "Thali", 10000).with_quantity(2), r1(), "Spice Route")
        .await
        .unwrap();
    session
        .add_item(menu_item("b", "Lassi", 5000), r1(), "Spice Route")
        .await
        .unwrap();

    let cart = session.apply_coupon("save10").await.unwrap();
    assert_eq!(cart.applied_coupon().map(|c| c.code.as_str()), Some("SAVE10"));
    assert_eq!(cart.discount(), Money::from_cents(1500));
    assert_eq!(cart.total(), Money::from_cents(25799));

    // Pricing answers carry no coupon key; the coupon stays
    let cart = session.refresh_pricing().await.unwrap();
    assert_eq!(cart.applied_coupon().map(|c| c.code.as_str()), Some("SAVE10"));
    assert_eq!(cart.total(), Money::from_cents(25799));

    let cart = session.remove_coupon().await.unwrap();
    assert!(cart.applied_coupon().is_none());
    assert_eq!(cart.total(), Money::from_cents(27299));
}

#[tokio::test]
async fn test_backend_decides_without_coupon_book() {
    let backend = Arc::new(InMemoryBackend::with_coupons(coupons()));
    let session = session_with(&backend, CouponBook::default());
    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();

    let cart = session.apply_coupon("FLAT5").await.unwrap();
    assert_eq!(cart.discount(), Money::from_cents(500));

    let result = session.apply_coupon("BOGUS").await;
    assert!(matches!(result, Err(SessionError::InvalidCoupon(_))));
    assert_eq!(
        backend.calls().await.last(),
        Some(&BackendCall::ApplyCoupon("BOGUS".to_string()))
    );
    // The earlier coupon is untouched
    assert_eq!(
        session.snapshot().await.applied_coupon().map(|c| c.code.as_str()),
        Some("FLAT5")
    );
    assert_eq!(
        session.take_notices().await,
        vec![Notice::InvalidCoupon {
            code: "BOGUS".to_string()
        }]
    );
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_stale_response_does_not_overwrite_newer_cart() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());

    // The first add reaches the backend but its answer is delayed
    let release = backend.hold_next().await;
    let slow_session = session.clone();
    let slow = tokio::spawn(async move {
        slow_session
            .add_item(menu_item("a", "Thali", 10000), RestaurantId::new("r1"), "Spice Route")
            .await
    });
    while backend.calls().await.is_empty() {
        tokio::task::yield_now().await;
    }

    // Optimistic view already shows the pending line
    assert_eq!(session.snapshot().await.items().len(), 1);

    let fast = session
        .add_item(menu_item("b", "Lassi", 5000), r1(), "Spice Route")
        .await
        .unwrap();
    assert_eq!(fast.items().len(), 2);

    release.send(()).unwrap();
    let slow = slow.await.unwrap().unwrap();

    // The older answer (one line) was ignored
    assert_eq!(slow.items().len(), 2);
    assert_eq!(session.snapshot().await.items().len(), 2);
    assert_eq!(session.pending_changes().await, 0);
}

// =============================================================================
// Checkout And Logout
// =============================================================================

#[tokio::test]
async fn test_checkout_places_order_and_resets() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());
    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();

    let order = session.checkout(&checkout_request()).await.unwrap();

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.total, Some(Money::from_cents(11099)));
    assert!(session.snapshot().await.is_empty());
    assert!(backend.cart().await.is_empty());
}

#[tokio::test]
async fn test_checkout_refuses_empty_cart() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());

    let result = session.checkout(&checkout_request()).await;

    assert!(matches!(result, Err(SessionError::EmptyCart)));
    assert!(backend.calls().await.is_empty());
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());
    session
        .add_item(menu_item("a", "Thali", 10000), r1(), "Spice Route")
        .await
        .unwrap();

    backend
        .fail_next(Failure::Status(402, "Payment declined".to_string()))
        .await;
    assert!(session.checkout(&checkout_request()).await.is_err());

    assert_eq!(session.snapshot().await.items().len(), 1);
    assert_eq!(
        session.take_notices().await,
        vec![Notice::CheckoutFailed {
            message: "Payment declined".to_string()
        }]
    );
}

#[tokio::test]
async fn test_logout_forgets_cart_and_in_flight_answers() {
    let backend = Arc::new(InMemoryBackend::new());
    let session = session_with(&backend, CouponBook::default());

    let release = backend.hold_next().await;
    let pending_session = session.clone();
    let pending = tokio::spawn(async move {
        pending_session
            .add_item(menu_item("a", "Thali", 10000), RestaurantId::new("r1"), "Spice Route")
            .await
    });
    while backend.calls().await.is_empty() {
        tokio::task::yield_now().await;
    }

    session.logout().await;
    release.send(()).unwrap();
    pending.await.unwrap().unwrap();

    assert!(session.snapshot().await.is_empty());
    assert!(session.take_notices().await.is_empty());
}
