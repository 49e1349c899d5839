//! Stone Cart
//!
//! Cart and wishlist store for the stone products storefront.
//!
//! ## Features
//! - Cart rows merged by product and size, with totals and counts
//! - Wishlist with optimistic toggles
//! - Local persistence of both collections after every change
//! - Best-effort wishlist sync with the account backend
//! - A small wishlist service implementing the backend endpoints

pub mod config;
pub mod domain;
pub mod server;
pub mod storage;
pub mod store;
pub mod sync;

pub use domain::aggregates::{Cart, CartItem, LikeItem, Product, ProductError, Wishlist};
pub use domain::value_objects::{Price, Quantity};
pub use storage::{ClientStorage, FileStorage, MemoryStorage};
pub use store::CartStore;
pub use sync::{HttpWishlistClient, NoRemote, WishlistRemote};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote rejected request ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    #[error("Remote unavailable")]
    RemoteUnavailable,

    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] ProductError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
