//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::Product;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Price, Quantity};

#[derive(Clone, Debug, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    updated_at: Option<DateTime<Utc>>,
    events: Vec<DomainEvent>,
}

/// A cart row. Rows merge on `(product_id, size)`; `id` is the row handle
/// used by remove and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Price,
    pub quantity: Quantity,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: Quantity, size: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price,
            quantity,
            size,
            sku: product.sku.clone(),
            kind: product.kind.clone(),
        }
    }

    pub fn line_total(&self) -> Price { self.price.multiply(self.quantity) }

    fn matches(&self, product_id: &str, size: Option<&str>) -> bool {
        self.product_id == product_id && self.size.as_deref() == size
    }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    /// Rebuilds a cart from persisted rows without raising events.
    pub fn restore(items: Vec<CartItem>) -> Self { Self { items, ..Self::default() } }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }
    pub fn get(&self, item_id: &str) -> Option<&CartItem> { self.items.iter().find(|i| i.id == item_id) }

    /// Adds a product, merging into an existing row with the same product and size.
    /// Returns the id of the row that now holds the product.
    pub fn add_item(&mut self, product: &Product, quantity: Quantity, size: Option<String>) -> String {
        if let Some(existing) = self.items.iter_mut().find(|i| i.matches(&product.id, size.as_deref())) {
            existing.quantity = existing.quantity.add(quantity);
            let (item_id, quantity) = (existing.id.clone(), existing.quantity);
            self.raise_event(CartEvent::QuantityChanged { item_id: item_id.clone(), quantity });
            return item_id;
        }
        let item = CartItem::from_product(product, quantity, size);
        let item_id = item.id.clone();
        self.raise_event(CartEvent::ItemAdded { item_id: item_id.clone(), product_id: item.product_id.clone(), quantity });
        self.items.push(item);
        item_id
    }

    /// Sets a row's quantity. Zero or negative removes the row.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> bool {
        let Some(quantity) = Quantity::positive(quantity) else { return self.remove_item(item_id); };
        let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) else { return false; };
        item.quantity = quantity;
        self.raise_event(CartEvent::QuantityChanged { item_id: item_id.to_string(), quantity });
        true
    }

    /// Returns false when no row had that id.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() == before { return false; }
        self.raise_event(CartEvent::ItemRemoved { item_id: item_id.to_string() });
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.raise_event(CartEvent::Cleared);
    }

    pub fn total(&self) -> Price { self.items.iter().fold(Price::zero(), |acc, i| acc.add(&i.line_total())) }

    pub fn quantity_count(&self) -> u64 { self.items.iter().map(|i| u64::from(i.quantity.value())).sum() }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: CartEvent) {
        self.events.push(DomainEvent::Cart(e));
        self.updated_at = Some(Utc::now());
    }
}
