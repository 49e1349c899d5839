//! Remote wishlist sync.
//!
//! The store only talks to the account backend through [`WishlistRemote`].
//! Callers never see these errors directly; the store logs and drops them.

mod http;

pub use http::HttpWishlistClient;

use std::future::Future;

use crate::domain::aggregates::LikeItem;
use crate::{Result, StoreError};

pub trait WishlistRemote: Send + Sync + 'static {
    /// Fetches the account's full wishlist.
    fn fetch_wishlist(&self, token: &str) -> impl Future<Output = Result<Vec<LikeItem>>> + Send;

    /// Flips `item.product_id` on the account's wishlist.
    fn toggle(&self, token: &str, item: &LikeItem) -> impl Future<Output = Result<()>> + Send;
}

/// Remote for stores that never sync.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemote;

impl WishlistRemote for NoRemote {
    async fn fetch_wishlist(&self, _token: &str) -> Result<Vec<LikeItem>> {
        Err(StoreError::RemoteUnavailable)
    }

    async fn toggle(&self, _token: &str, _item: &LikeItem) -> Result<()> {
        Err(StoreError::RemoteUnavailable)
    }
}
