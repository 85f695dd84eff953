//! Optimistic updates over an authoritative cart.
//!
//! [`SyncedCart`] keeps two layers:
//!
//! - the **confirmed** cart, built only from backend snapshots
//! - a queue of **pending** mutations the backend has not answered yet
//!
//! The cart the diner sees is the confirmed cart with the pending mutations
//! replayed on top. Every request gets a [`Seq`]; a response whose sequence
//! number is not newer than the newest one already applied is stale and is
//! dropped, so a slow response can never overwrite a fresher one.
//!
//! ```text
//! submit(add)      seq 0   pending [0]        view = confirmed + add
//! submit(coupon)   seq 1   pending [0, 1]     view = confirmed + add + coupon
//! acknowledge(1)           pending []         view = confirmed = snapshot 1
//! acknowledge(0)   stale   (ignored)
//! ```

use std::collections::VecDeque;
use std::fmt;

use super::mutation::CartMutation;
use super::pricing::PricingPolicy;
use super::snapshot::CartPayload;
use super::state::CartState;

/// Request sequence number. Strictly increasing per [`SyncedCart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seq(u64);

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of [`SyncedCart::acknowledge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The snapshot became the confirmed cart.
    Applied,
    /// A newer response was already applied; the snapshot was dropped.
    Stale,
}

#[derive(Debug, Clone)]
struct Pending {
    seq: Seq,
    mutation: CartMutation,
}

/// A cart with optimistic local mutations and sequence-checked reconciliation.
#[derive(Debug, Clone)]
pub struct SyncedCart {
    confirmed: CartState,
    pending: VecDeque<Pending>,
    view: CartState,
    next_seq: u64,
    /// Responses with a sequence number below this are stale.
    accept_from: u64,
}

impl SyncedCart {
    /// An empty cart with the default pricing policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(PricingPolicy::default())
    }

    /// An empty cart with a custom pricing policy.
    #[must_use]
    pub fn with_policy(policy: PricingPolicy) -> Self {
        let confirmed = CartState::with_policy(policy);
        Self {
            view: confirmed.clone(),
            confirmed,
            pending: VecDeque::new(),
            next_seq: 0,
            accept_from: 0,
        }
    }

    /// The cart as the diner should see it.
    #[must_use]
    pub const fn view(&self) -> &CartState {
        &self.view
    }

    /// The cart as the backend last confirmed it.
    #[must_use]
    pub const fn confirmed(&self) -> &CartState {
        &self.confirmed
    }

    /// Number of mutations awaiting a response.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Apply `mutation` optimistically and tag it for its response.
    pub fn submit(&mut self, mutation: CartMutation) -> Seq {
        let seq = self.allocate();
        mutation.apply(&mut self.view);
        self.pending.push_back(Pending { seq, mutation });
        seq
    }

    /// Tag a read (fetch cart, fetch pricing) that changes nothing locally.
    pub fn begin_fetch(&mut self) -> Seq {
        self.allocate()
    }

    /// Reconcile the backend's answer to request `seq`.
    ///
    /// Stale answers are dropped but still retire their pending mutation: the
    /// backend has processed it, and the newer snapshot already covers it.
    pub fn acknowledge(&mut self, seq: Seq, payload: CartPayload) -> Reconciliation {
        if seq.0 < self.accept_from {
            self.retire(seq);
            return Reconciliation::Stale;
        }

        self.confirmed.reconcile_payload(payload);
        self.accept_from = seq.0 + 1;
        self.pending.retain(|p| p.seq > seq);
        self.rebuild_view();
        Reconciliation::Applied
    }

    /// Reconcile a reply to an earlier step of request `seq`.
    ///
    /// Used when one mutation takes more than one backend call (clearing the
    /// cart before a restaurant switch). The snapshot becomes the confirmed
    /// cart like in [`acknowledge`](Self::acknowledge), but the mutation for
    /// `seq` stays pending until its final answer arrives, so a failure after
    /// this point rolls back to the snapshot rather than to the older cart.
    pub fn advance(&mut self, seq: Seq, payload: CartPayload) -> Reconciliation {
        if seq.0 < self.accept_from {
            return Reconciliation::Stale;
        }

        self.confirmed.reconcile_payload(payload);
        self.accept_from = seq.0;
        self.pending.retain(|p| p.seq >= seq);
        self.rebuild_view();
        Reconciliation::Applied
    }

    /// Drop the pending mutation for a request that failed.
    ///
    /// Returns the mutation if it was still pending.
    pub fn reject(&mut self, seq: Seq) -> Option<CartMutation> {
        let mutation = self.retire(seq);
        self.rebuild_view();
        mutation
    }

    /// Forget everything (logout, completed checkout).
    ///
    /// Every request issued before the reset becomes stale.
    pub fn reset(&mut self) {
        self.confirmed.clear();
        self.pending.clear();
        self.accept_from = self.next_seq;
        self.rebuild_view();
    }

    fn allocate(&mut self) -> Seq {
        let seq = Seq(self.next_seq);
        self.next_seq += 1;
        seq
    }

    fn retire(&mut self, seq: Seq) -> Option<CartMutation> {
        let index = self.pending.iter().position(|p| p.seq == seq)?;
        self.pending.remove(index).map(|p| p.mutation)
    }

    fn rebuild_view(&mut self) {
        let mut view = self.confirmed.clone();
        for pending in &self.pending {
            pending.mutation.apply(&mut view);
        }
        self.view = view;
    }
}

impl Default for SyncedCart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartItem, CartSnapshot};
    use crate::types::{Coupon, Customization, MenuItemId, Money, RestaurantId};

    fn add(id: &str, cents: i64) -> CartMutation {
        CartMutation::AddItem {
            item: CartItem::new(MenuItemId::new(id), id, Money::from_cents(cents)),
            restaurant_id: RestaurantId::new("r1"),
            restaurant_name: "One".to_string(),
        }
    }

    /// What a backend would answer after applying `mutations` to an empty cart.
    fn server_snapshot(mutations: &[CartMutation]) -> CartPayload {
        let mut server = CartState::new();
        for m in mutations {
            m.apply(&mut server);
        }
        CartSnapshot::from(&server).into()
    }

    #[test]
    fn test_submit_applies_optimistically() {
        let mut cart = SyncedCart::new();
        cart.submit(add("a", 1000));

        assert_eq!(cart.view().items().len(), 1);
        assert!(cart.confirmed().is_empty());
        assert_eq!(cart.pending_len(), 1);
    }

    #[test]
    fn test_acknowledge_replaces_confirmed_and_retires_pending() {
        let mut cart = SyncedCart::new();
        let seq = cart.submit(add("a", 1000));

        let outcome = cart.acknowledge(seq, server_snapshot(&[add("a", 1000)]));

        assert_eq!(outcome, Reconciliation::Applied);
        assert_eq!(cart.pending_len(), 0);
        assert_eq!(cart.view(), cart.confirmed());
        assert_eq!(cart.view().subtotal(), Money::from_cents(1000));
    }

    #[test]
    fn test_pending_mutations_replay_over_new_snapshot() {
        let mut cart = SyncedCart::new();
        let first = cart.submit(add("a", 1000));
        cart.submit(add("b", 500));

        cart.acknowledge(first, server_snapshot(&[add("a", 1000)]));

        assert_eq!(cart.pending_len(), 1);
        assert_eq!(cart.confirmed().items().len(), 1);
        assert_eq!(cart.view().items().len(), 2);
        assert_eq!(cart.view().subtotal(), Money::from_cents(1500));
    }

    #[test]
    fn test_out_of_order_response_is_stale() {
        let mut cart = SyncedCart::new();
        let first = cart.submit(add("a", 1000));
        let second = cart.submit(add("b", 500));

        let newer = server_snapshot(&[add("a", 1000), add("b", 500)]);
        let older = server_snapshot(&[add("a", 1000)]);

        assert_eq!(cart.acknowledge(second, newer), Reconciliation::Applied);
        assert_eq!(cart.acknowledge(first, older), Reconciliation::Stale);

        assert_eq!(cart.view().items().len(), 2);
        assert_eq!(cart.pending_len(), 0);
    }

    #[test]
    fn test_reject_rolls_back_only_that_mutation() {
        let mut cart = SyncedCart::new();
        let first = cart.submit(add("a", 1000));
        let coupon = cart.submit(CartMutation::ApplyCoupon(Coupon::fixed(
            "FLAT2",
            Money::from_cents(200),
        )));

        let rejected = cart.reject(coupon);

        assert!(matches!(rejected, Some(CartMutation::ApplyCoupon(_))));
        assert!(cart.view().applied_coupon().is_none());
        assert_eq!(cart.view().items().len(), 1);

        cart.acknowledge(first, server_snapshot(&[add("a", 1000)]));
        assert_eq!(cart.view().items().len(), 1);
    }

    #[test]
    fn test_advance_keeps_mutation_pending() {
        let mut cart = SyncedCart::new();
        let first = cart.submit(add("a", 1000));
        cart.acknowledge(first, server_snapshot(&[add("a", 1000)]));

        let switch = cart.submit(CartMutation::AddItem {
            item: CartItem::new(MenuItemId::new("z"), "z", Money::from_cents(1800)),
            restaurant_id: RestaurantId::new("r2"),
            restaurant_name: "Two".to_string(),
        });

        // The backend cart was cleared before the item was sent
        assert_eq!(
            cart.advance(switch, server_snapshot(&[])),
            Reconciliation::Applied
        );
        assert!(cart.confirmed().is_empty());
        assert_eq!(cart.pending_len(), 1);
        assert_eq!(cart.view().items().len(), 1);
        assert_eq!(cart.view().subtotal(), Money::from_cents(1800));

        // A failure now rolls back to the cleared cart
        cart.reject(switch);
        assert!(cart.view().is_empty());
    }

    #[test]
    fn test_advance_then_final_answer_is_applied() {
        let mut cart = SyncedCart::new();
        let seq = cart.submit(add("a", 1000));

        cart.advance(seq, server_snapshot(&[]));
        assert_eq!(
            cart.acknowledge(seq, server_snapshot(&[add("a", 1000)])),
            Reconciliation::Applied
        );
        assert_eq!(cart.pending_len(), 0);
        assert_eq!(cart.view().items().len(), 1);

        // Only newer requests may advance after the final answer
        assert_eq!(cart.advance(seq, server_snapshot(&[])), Reconciliation::Stale);
        assert_eq!(cart.view().items().len(), 1);
    }

    #[test]
    fn test_reject_unknown_seq_is_harmless() {
        let mut cart = SyncedCart::new();
        let fetch = cart.begin_fetch();
        assert!(cart.reject(fetch).is_none());
        assert!(cart.view().is_empty());
    }

    #[test]
    fn test_reset_makes_in_flight_responses_stale() {
        let mut cart = SyncedCart::new();
        let seq = cart.submit(add("a", 1000));
        cart.reset();

        assert!(cart.view().is_empty());
        assert_eq!(
            cart.acknowledge(seq, server_snapshot(&[add("a", 1000)])),
            Reconciliation::Stale
        );
        assert!(cart.view().is_empty());

        let fresh = cart.begin_fetch();
        assert!(fresh > seq);
        assert_eq!(
            cart.acknowledge(fresh, server_snapshot(&[add("b", 100)])),
            Reconciliation::Applied
        );
    }

    #[test]
    fn test_update_to_zero_pending_hides_line() {
        let mut cart = SyncedCart::new();
        let seq = cart.submit(add("a", 1000));
        cart.acknowledge(seq, server_snapshot(&[add("a", 1000)]));

        cart.submit(CartMutation::UpdateQuantity {
            item_id: MenuItemId::new("a"),
            customization: Customization::Raw("{}".to_string()),
            quantity: 0,
        });

        assert!(cart.view().is_empty());
        assert_eq!(cart.confirmed().items().len(), 1);
    }
}
