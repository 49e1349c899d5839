//! Wishlist Aggregate

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::Product;
use crate::domain::events::{DomainEvent, WishlistEvent};
use crate::domain::value_objects::Price;

#[derive(Clone, Debug, Default)]
pub struct Wishlist {
    items: Vec<LikeItem>,
    updated_at: Option<DateTime<Utc>>,
    events: Vec<DomainEvent>,
}

/// A liked product. Also the body of the remote toggle request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeItem {
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl From<&Product> for LikeItem {
    fn from(p: &Product) -> Self {
        Self { product_id: p.id.clone(), name: p.name.clone(), image: p.image.clone(), price: p.price, kind: p.kind.clone() }
    }
}

impl LikeItem {
    /// Trims the product id. `None` when nothing is left of it.
    pub fn normalized(mut self) -> Option<Self> {
        let trimmed = self.product_id.trim();
        if trimmed.is_empty() { return None; }
        if trimmed.len() != self.product_id.len() { self.product_id = trimmed.to_string(); }
        Some(self)
    }
}

/// Keeps the first entry per product id and drops entries without one.
fn dedupe(items: Vec<LikeItem>) -> Vec<LikeItem> {
    let mut seen = HashSet::new();
    items.into_iter()
        .filter_map(LikeItem::normalized)
        .filter(|i| seen.insert(i.product_id.clone()))
        .collect()
}

impl Wishlist {
    pub fn new() -> Self { Self::default() }
    pub fn restore(items: Vec<LikeItem>) -> Self { Self { items: dedupe(items), ..Self::default() } }

    pub fn items(&self) -> &[LikeItem] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }

    /// Blank ids are never liked.
    pub fn contains(&self, product_id: &str) -> bool {
        let product_id = product_id.trim();
        !product_id.is_empty() && self.items.iter().any(|i| i.product_id == product_id)
    }

    /// Flips membership of `item.product_id`. Returns true when the product is now liked.
    /// Items with a blank id are ignored.
    pub fn toggle(&mut self, item: LikeItem) -> bool {
        let Some(item) = item.normalized() else { return false; };
        let product_id = item.product_id.clone();
        if self.contains(&product_id) {
            self.items.retain(|i| i.product_id != product_id);
            self.raise_event(WishlistEvent::Unliked { product_id });
            false
        } else {
            self.items.push(item);
            self.raise_event(WishlistEvent::Liked { product_id });
            true
        }
    }

    /// Overwrites every entry, e.g. with the server's copy. Duplicate ids collapse to one.
    pub fn replace(&mut self, items: Vec<LikeItem>) {
        let items = dedupe(items);
        let count = items.len();
        self.items = items;
        self.raise_event(WishlistEvent::Replaced { count });
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: WishlistEvent) {
        self.events.push(DomainEvent::Wishlist(e));
        self.updated_at = Some(Utc::now());
    }
}
