//! Diner-facing notices raised by the cart session.

use std::fmt;

/// Something the diner should be told about.
///
/// Notices queue up on the session until taken with
/// [`CartSession::take_notices`](crate::CartSession::take_notices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A cart change did not reach the backend and was rolled back.
    SyncFailed {
        action: &'static str,
        message: String,
    },
    /// A coupon code was not accepted.
    InvalidCoupon { code: String },
    /// Placing the order failed; the cart is unchanged.
    CheckoutFailed { message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyncFailed { action, message } => write!(f, "Could not {action}: {message}"),
            Self::InvalidCoupon { code } if code.is_empty() => f.write_str("Enter a coupon code"),
            Self::InvalidCoupon { code } => write!(f, "Invalid coupon code: {code}"),
            Self::CheckoutFailed { message } => write!(f, "Checkout failed: {message}"),
        }
    }
}
