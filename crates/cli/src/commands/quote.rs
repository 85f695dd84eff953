//! Offline quote command.
//!
//! Reads a cart JSON file (the shape the backend returns, with or without a
//! `cart` envelope), recomputes every total with the configured pricing and
//! logs the result. Nothing is sent to the backend.
//!
//! # Usage
//!
//! ```bash
//! QUICKBITE_TAX_RATE=0.05 qb-cli quote cart.json
//! ```

use std::path::Path;

use quickbite_core::{CartPayload, CartState, PricingPolicy};

use super::{CliError, log_cart};

/// Price the cart stored at `path`.
pub async fn run(path: &Path) -> Result<(), CliError> {
    let pricing = quickbite_client::config::pricing_from_env()?;
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let cart = quote(&json, pricing)?;
    log_cart(&cart);
    Ok(())
}

/// Build a cart from backend-shaped JSON and recompute its totals locally.
fn quote(json: &str, pricing: PricingPolicy) -> Result<CartState, CliError> {
    let payload: CartPayload = serde_json::from_str(json)?;
    let mut cart = CartState::with_policy(pricing);
    cart.reconcile_payload(payload);
    cart.recompute_totals();
    Ok(cart)
}
