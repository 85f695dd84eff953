//! Core types for QuickBite.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coupon;
pub mod customization;
pub mod id;
pub mod money;
pub mod status;

pub use coupon::{Coupon, CouponBook, CouponBookError, DiscountType};
pub use customization::Customization;
pub use id::*;
pub use money::Money;
pub use status::*;
