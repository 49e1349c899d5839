//! Value Objects for the cart and wishlist

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Unit price. Serialized as a plain JSON number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    pub fn new(amount: Decimal) -> Self { Self(amount) }
    pub fn zero() -> Self { Self(Decimal::ZERO) }
    pub fn amount(&self) -> Decimal { self.0 }

    /// Saturates at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
    pub fn add(&self, other: &Price) -> Price {
        Price(self.0.checked_add(other.0).unwrap_or_else(|| saturated(other.0)))
    }

    /// Saturates like [`add`](Self::add).
    pub fn multiply(&self, qty: Quantity) -> Price {
        Price(self.0.checked_mul(Decimal::from(qty.value())).unwrap_or_else(|| saturated(self.0)))
    }

    /// Reads a price from a JSON number or a numeric string such as `"1,250.50"`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self(Decimal::from(i)))
                } else {
                    n.as_f64().and_then(Decimal::from_f64).map(Self)
                }
            }
            Value::String(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != ' ').collect();
                Decimal::from_str(&cleaned).ok().map(Self)
            }
            _ => None,
        }
    }
}

fn saturated(direction: Decimal) -> Decimal {
    if direction.is_sign_negative() { Decimal::MIN } else { Decimal::MAX }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0.normalize()) }
}

/// Line quantity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn one() -> Self { Self(1) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0)) }
    pub fn is_zero(&self) -> bool { self.0 == 0 }

    /// Converts a signed request quantity; anything at or below zero is `None`.
    pub fn positive(value: i64) -> Option<Self> {
        if value <= 0 { return None; }
        Some(Self(u32::try_from(value).unwrap_or(u32::MAX)))
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self { Self(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_from_json() {
        assert_eq!(Price::from_json(&json!(100)).unwrap().amount(), Decimal::new(100, 0));
        assert_eq!(Price::from_json(&json!(12.5)).unwrap().amount(), Decimal::new(125, 1));
        assert_eq!(Price::from_json(&json!("1,250.50")).unwrap().amount(), Decimal::new(125050, 2));
        assert!(Price::from_json(&json!("call us")).is_none());
        assert!(Price::from_json(&Value::Null).is_none());
    }

    #[test]
    fn test_price_serializes_as_number() {
        let price = Price::new(Decimal::new(1999, 2));
        assert_eq!(serde_json::to_value(price).unwrap(), json!(19.99));
        let back: Price = serde_json::from_value(json!(19.99)).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_multiply() {
        let price = Price::new(Decimal::new(100, 0));
        assert_eq!(price.multiply(Quantity::new(5)).amount(), Decimal::new(500, 0));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Price::from_json(&json!("79228162514264337593543950335")).unwrap();
        assert_eq!(huge.multiply(Quantity::new(2)).amount(), Decimal::MAX);
        assert_eq!(huge.add(&huge).amount(), Decimal::MAX);
        let from_float = Price::from_json(&json!(1e20)).unwrap();
        assert_eq!(from_float.multiply(Quantity::new(u32::MAX)).add(&huge).amount(), Decimal::MAX);
        let negative = Price::new(Decimal::MIN);
        assert_eq!(negative.multiply(Quantity::new(3)).amount(), Decimal::MIN);
        assert_eq!(negative.add(&negative).amount(), Decimal::MIN);
    }

    #[test]
    fn test_quantity_positive() {
        assert_eq!(Quantity::positive(0), None);
        assert_eq!(Quantity::positive(-3), None);
        assert_eq!(Quantity::positive(4), Some(Quantity::new(4)));
        assert_eq!(Quantity::new(u32::MAX).add(Quantity::one()).value(), u32::MAX);
    }
}
