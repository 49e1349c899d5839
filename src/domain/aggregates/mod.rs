//! Aggregates module
pub mod product;
pub mod cart;
pub mod wishlist;

pub use product::{Product, ProductError};
pub use cart::{Cart, CartItem};
pub use wishlist::{LikeItem, Wishlist};
