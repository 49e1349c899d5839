//! Durable client storage.
//!
//! A string key/value seam in the shape of browser local storage. The store
//! keeps three keys in it: [`CART_KEY`] and [`LIKES_KEY`] hold JSON arrays,
//! [`TOKEN_KEY`] holds the raw session token.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::Result;

pub const CART_KEY: &str = "cart";
pub const LIKES_KEY: &str = "likes";
pub const TOKEN_KEY: &str = "token";

/// Key/value persistence used by the store.
///
/// Methods take `&self`; implementations use interior mutability.
pub trait ClientStorage: Send + Sync + Debug {
    /// Returns `Ok(None)` if the key does not exist.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Succeeds even if the key did not exist.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Reads a JSON array. Missing keys, unreadable storage and corrupted JSON
/// all come back as an empty collection.
pub fn load_collection<T: DeserializeOwned>(storage: &dyn ClientStorage, key: &str) -> Vec<T> {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "failed to read stored collection");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(key, error = %e, "stored collection is corrupted, starting empty");
            Vec::new()
        }
    }
}

/// Writes the full contents of a collection.
pub fn save_collection<T: Serialize>(storage: &dyn ClientStorage, key: &str, items: &[T]) -> Result<()> {
    let json = serde_json::to_string(items)?;
    storage.set_item(key, &json)
}
