//! Product normalization
//!
//! Catalog pages hand products over in several shapes (API documents with
//! `_id`, seeded records with `images[]`, Cloudinary payloads with
//! `secure_url`). Everything funnels through [`Product::from_json`] once so
//! the cart and wishlist only ever see the canonical shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::domain::value_objects::Price;

const ID_FIELDS: &[&str] = &["id", "_id", "productId"];
const NAME_FIELDS: &[&str] = &["name", "title"];
const IMAGE_FIELDS: &[&str] = &["image", "images", "mainImage", "img", "imageUrl"];
const TYPE_FIELDS: &[&str] = &["type", "productType", "category"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub price: Price,
    pub sku: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Price) -> Self {
        Self { id: id.into(), name: name.into(), image: None, price, sku: None, kind: None }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self { self.image = Some(image.into()); self }
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self { self.sku = Some(sku.into()); self }
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self { self.kind = Some(kind.into()); self }

    /// Normalizes a loosely shaped product object.
    pub fn from_json(value: &Value) -> Result<Self, ProductError> {
        let obj = value.as_object().ok_or(ProductError::NotAnObject)?;
        let id = ID_FIELDS.iter()
            .filter_map(|f| obj.get(*f))
            .find_map(scalar_string)
            .ok_or(ProductError::MissingId)?;
        let name = NAME_FIELDS.iter().filter_map(|f| obj.get(*f)).find_map(scalar_string).unwrap_or_default();
        let image = IMAGE_FIELDS.iter().filter_map(|f| obj.get(*f)).find_map(image_url);
        let price = obj.get("price").and_then(Price::from_json).unwrap_or_default();
        let sku = obj.get("sku").and_then(scalar_string);
        let kind = TYPE_FIELDS.iter().filter_map(|f| obj.get(*f)).find_map(scalar_string);
        Ok(Self { id, name, image, price, sku, kind })
    }
}

impl TryFrom<&Value> for Product {
    type Error = ProductError;
    fn try_from(value: &Value) -> Result<Self, Self::Error> { Self::from_json(value) }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(o) => ["url", "secure_url", "src"].iter().filter_map(|f| o.get(*f)).find_map(scalar_string),
        Value::Array(items) => items.iter().find_map(image_url),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { NotAnObject, MissingId }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::NotAnObject => write!(f, "Product is not an object"), Self::MissingId => write!(f, "Product has no id") }
    }
}
