//! QuickBite Core - Cart state engine and shared types.
//!
//! This crate provides the domain model used by every QuickBite component:
//! - `client` - Backend transport, HTTP client and the cart sync session
//! - `cli` - Command-line tools for driving a cart against a backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! HTTP clients, no async runtime. Network effects live in `quickbite-client`,
//! which feeds backend responses back into the engine defined here.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, customizations, coupons and statuses
//! - [`cart`] - The cart state engine, pricing, backend snapshots and the sync layer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{
    CartItem, CartMutation, CartPayload, CartSnapshot, CartState, PricingPolicy, Reconciliation,
    Seq, SyncedCart, Totals,
};
pub use types::*;
