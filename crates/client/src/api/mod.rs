//! QuickBite cart backend REST API.
//!
//! # Architecture
//!
//! - JSON over HTTP with `reqwest`
//! - The backend is the source of truth: every cart call returns the full cart
//! - No retries and no caching: a failed call is reported, never replayed
//!
//! # Endpoints
//!
//! | Operation      | Request                     |
//! |----------------|-----------------------------|
//! | fetch cart     | `GET /cart`                 |
//! | add item       | `POST /cart/items`          |
//! | update item    | `PUT /cart/items/{id}`      |
//! | remove item    | `DELETE /cart/items/{id}`   |
//! | clear cart     | `DELETE /cart`              |
//! | apply coupon   | `POST /cart/coupon`         |
//! | remove coupon  | `DELETE /cart/coupon`       |
//! | fetch pricing  | `GET /cart/pricing`         |
//! | create order   | `POST /orders`              |
//!
//! # Example
//!
//! ```rust,ignore
//! use quickbite_client::api::CartApiClient;
//! use quickbite_client::CartTransport;
//!
//! let client = CartApiClient::new(&config)?;
//! let cart = client.fetch_cart().await?.into_snapshot();
//! ```

mod client;
pub mod types;

pub use client::CartApiClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the cart backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or rejected credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The backend refused the request (validation error, invalid coupon, ...).
    #[error("Rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },
}

impl ApiError {
    /// Whether the backend understood the request and said no (a 4xx), as
    /// opposed to the request never getting a proper answer.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        match self {
            Self::Rejected { status, .. } => *status >= 400 && *status < 500,
            Self::NotFound(_) => true,
            _ => false,
        }
    }

    /// Short message suitable for showing to a diner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) | Self::InvalidUrl(_) => "Could not reach QuickBite".to_string(),
            Self::Parse(_) => "Unexpected response from QuickBite".to_string(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::Unauthorized => "Please sign in again".to_string(),
            Self::RateLimited(secs) => format!("Too many requests, try again in {secs}s"),
            Self::Rejected { message, .. } => message.clone(),
        }
    }
}
