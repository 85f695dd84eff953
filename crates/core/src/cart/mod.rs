//! The cart state engine.
//!
//! # Layers
//!
//! - [`CartState`] - items, restaurant, coupon and derived totals, with the
//!   local mutation operations and backend reconciliation
//! - [`PricingPolicy`] / [`Totals`] - the one place totals are computed
//! - [`CartSnapshot`] / [`CartPayload`] - authoritative cart payloads from a backend
//! - [`SyncedCart`] - optimistic pending mutations over an authoritative
//!   state, with sequence numbers so out-of-order responses are discarded
//!
//! # Example
//!
//! ```rust
//! use quickbite_core::{CartItem, CartState, MenuItemId, Money, RestaurantId};
//!
//! let mut cart = CartState::new();
//! let burger = CartItem::new(MenuItemId::new("burger"), "Burger", Money::from_cents(10000));
//! cart.add_item(burger.with_quantity(2), RestaurantId::new("r1"), "Diner");
//! cart.add_item(
//!     CartItem::new(MenuItemId::new("fries"), "Fries", Money::from_cents(5000)),
//!     RestaurantId::new("r1"),
//!     "Diner",
//! );
//!
//! assert_eq!(cart.subtotal(), Money::from_cents(25000));
//! assert_eq!(cart.total(), Money::from_cents(27299));
//! ```

mod item;
mod mutation;
mod pricing;
mod snapshot;
mod state;
pub mod sync;

pub use item::CartItem;
pub use mutation::CartMutation;
pub use pricing::{PricingPolicy, Totals};
pub use snapshot::{CartPayload, CartSnapshot, PopulatedMenuItem, RemoteCartItem, RemoteItemRef};
pub use state::CartState;
pub use sync::{Reconciliation, Seq, SyncedCart};
