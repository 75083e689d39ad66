//! Ownership and lock predicates shared by the wish, offer and wishlist services.
//!
//! Pure functions over already-loaded records. Every mutating operation calls
//! the relevant predicate before it writes.

use crate::entities::{offer, wish, wishlist};

/// A record that may belong to a user.
pub trait Owned {
    /// Identifier of the owning user, if one is recorded.
    fn owner_id(&self) -> Option<i64>;
}

impl Owned for wish::Model {
    fn owner_id(&self) -> Option<i64> {
        Some(self.owner_id)
    }
}

impl Owned for wishlist::Model {
    fn owner_id(&self) -> Option<i64> {
        self.user_id
    }
}

/// True when `caller_id` is the recorded owner of `record`.
#[must_use]
pub fn is_owner<T: Owned>(record: &T, caller_id: i64) -> bool {
    record.owner_id() == Some(caller_id)
}

/// True when the wish already has contributions, which locks its price and
/// forbids deletion.
#[must_use]
pub const fn has_commitments(offers: &[offer::Model]) -> bool {
    !offers.is_empty()
}

/// True when accepting `amount` would push `raised` above `price`.
#[must_use]
pub fn would_overfund(wish: &wish::Model, amount: f64) -> bool {
    wish.raised + amount > wish.price
}
