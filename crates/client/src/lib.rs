//! QuickBite Client - Keeps a diner's cart in sync with the QuickBite backend.
//!
//! # Architecture
//!
//! - [`CartTransport`] is the seam to the backend; [`CartApiClient`] implements
//!   it over HTTP
//! - [`CartSession`] owns the cart, applies changes optimistically and
//!   reconciles backend answers through the core sync layer
//! - [`ClientConfig`] loads settings from the environment
//!
//! # Modules
//!
//! - [`api`] - REST client, request bodies and API errors
//! - [`config`] - Environment configuration
//! - [`coupons`] - Coupon catalogue loading
//! - [`notice`] - Diner-facing notices
//! - [`session`] - The cart session
//! - [`transport`] - The transport trait

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod coupons;
pub mod notice;
pub mod session;
pub mod transport;

pub use api::{ApiError, CartApiClient};
pub use config::{ClientConfig, ConfigError};
pub use coupons::{CouponFileError, load_configured, load_coupon_book};
pub use notice::Notice;
pub use session::{CartSession, SessionError};
pub use transport::CartTransport;
