//! Coupon commands.
//!
//! # Usage
//!
//! ```bash
//! qb-cli coupon apply SAVE10
//! qb-cli coupon remove
//! ```
//!
//! When `QUICKBITE_COUPONS_FILE` is set, unknown codes are refused locally.
//! Otherwise the backend validates the code.

use quickbite_client::CartSession;

use super::CliError;
use super::cart::finish;

/// Apply a coupon code.
pub async fn apply(session: &CartSession, code: &str) -> Result<(), CliError> {
    tracing::info!("Applying coupon {code}...");
    let result = session.apply_coupon(code).await;
    finish(session, result).await
}

/// Remove the applied coupon.
pub async fn remove(session: &CartSession) -> Result<(), CliError> {
    let result = session.remove_coupon().await;
    finish(session, result).await
}
