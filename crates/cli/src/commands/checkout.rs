//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! qb-cli checkout --address "12 Curry Lane" --payment card --notes "Ring twice"
//! ```

use quickbite_client::CartSession;
use quickbite_client::api::CheckoutRequest;
use quickbite_core::PaymentMethod;

use super::{CliError, log_cart, log_notices};

/// Place an order from the current cart.
pub async fn run(
    session: &CartSession,
    address: String,
    payment: &str,
    notes: Option<String>,
) -> Result<(), CliError> {
    let payment_method: PaymentMethod = payment
        .parse()
        .map_err(|e: String| CliError::InvalidArgument("payment method", e))?;
    if address.trim().is_empty() {
        return Err(CliError::InvalidArgument(
            "address",
            "must not be empty".to_string(),
        ));
    }

    let cart = session.snapshot().await;
    log_cart(&cart);
    tracing::info!("Placing order ({payment_method})...");

    let request = CheckoutRequest {
        delivery_address: address,
        payment_method,
        notes,
    };
    let result = session.checkout(&request).await;
    log_notices(session).await;
    let order = result?;

    tracing::info!("Order {} placed, status: {}", order.id, order.status);
    if let Some(total) = order.total {
        tracing::info!("  Charged: {total}");
    }
    if let Some(minutes) = order.estimated_delivery_minutes {
        tracing::info!("  Estimated delivery: {minutes} min");
    }
    Ok(())
}
