//! CLI command implementations.
//!
//! Every backend command builds a [`CartSession`], hydrates it from the
//! backend, performs one operation and logs the resulting cart.

pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod quote;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use quickbite_client::{
    ApiError, CartApiClient, CartSession, ClientConfig, ConfigError, CouponFileError,
    SessionError,
};
use quickbite_core::{CartState, Customization};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Coupons(#[from] CouponFileError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid cart file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {0}: {1}")]
    InvalidArgument(&'static str, String),
}

/// Build a session against the configured backend and load the cart.
pub async fn connect(config: &ClientConfig) -> Result<CartSession, CliError> {
    let coupons = quickbite_client::load_configured(config.coupons_file.as_deref()).await?;
    let client = CartApiClient::new(config)?;

    tracing::info!("Connecting to {}...", client.base_url());
    let session = CartSession::new(Arc::new(client), coupons, config.pricing);
    session.hydrate().await?;

    Ok(session)
}

/// Parse a customization argument; absent means no customization.
pub fn parse_customization(raw: Option<&str>) -> Customization {
    raw.map_or(Customization::None, |raw| match raw.parse() {
        Ok(customization) => customization,
        Err(never) => match never {},
    })
}

/// Log the cart the way a diner would read it.
pub fn log_cart(cart: &CartState) {
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    tracing::info!(
        "Cart from {} ({} items)",
        cart.restaurant_name().unwrap_or("unknown restaurant"),
        cart.item_count()
    );
    for line in cart.items() {
        if line.customization.is_empty() {
            tracing::info!(
                "  {} x {} @ {} = {}",
                line.quantity,
                line.name,
                line.price,
                line.line_total()
            );
        } else {
            tracing::info!(
                "  {} x {} [{}] @ {} = {}",
                line.quantity,
                line.name,
                line.customization,
                line.price,
                line.line_total()
            );
        }
    }

    tracing::info!("  Subtotal:     {}", cart.subtotal());
    tracing::info!("  Delivery fee: {}", cart.delivery_fee());
    tracing::info!("  Tax:          {}", cart.tax());
    if let Some(coupon) = cart.applied_coupon() {
        tracing::info!("  Coupon {}:  -{}", coupon.code, cart.discount());
    }
    tracing::info!("  Total:        {}", cart.total());
}

/// Log and drain the session's notices.
pub async fn log_notices(session: &CartSession) {
    for notice in session.take_notices().await {
        tracing::warn!("{notice}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_customization() {
        assert_eq!(parse_customization(None), Customization::None);
        assert_eq!(parse_customization(Some("{}")), Customization::None);
        assert!(matches!(
            parse_customization(Some(r#"{"size":"large"}"#)),
            Customization::Structured(_)
        ));
        assert_eq!(
            parse_customization(Some("extra hot")),
            Customization::Raw("extra hot".to_string())
        );
    }
}
