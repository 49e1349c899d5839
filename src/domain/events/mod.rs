//! Domain events
//!
//! Aggregates raise these on every mutation; the store drains them and
//! re-persists the collection each event belongs to.

use crate::domain::value_objects::Quantity;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainEvent {
    Cart(CartEvent),
    Wishlist(WishlistEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartEvent {
    ItemAdded { item_id: String, product_id: String, quantity: Quantity },
    QuantityChanged { item_id: String, quantity: Quantity },
    ItemRemoved { item_id: String },
    Cleared,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WishlistEvent {
    Liked { product_id: String },
    Unliked { product_id: String },
    Replaced { count: usize },
}

/// Which persisted collection an event touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Cart,
    Likes,
}

impl DomainEvent {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Cart(_) => Collection::Cart,
            Self::Wishlist(_) => Collection::Likes,
        }
    }
}
