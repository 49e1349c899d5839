//! HTTP client for the account wishlist endpoints.
//!
//! `GET {base}/users/wishlist` and `POST {base}/users/wishlist/toggle`,
//! both authenticated with a bearer token. No timeout is set beyond the
//! transport default and nothing is retried.

use serde::Deserialize;

use super::WishlistRemote;
use crate::domain::aggregates::LikeItem;
use crate::{Result, StoreError};

pub struct HttpWishlistClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpWishlistClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn url(&self, path: &str) -> String { format!("{}{path}", self.base_url) }
}

impl WishlistRemote for HttpWishlistClient {
    async fn fetch_wishlist(&self, token: &str) -> Result<Vec<LikeItem>> {
        let response = self.http.get(self.url("/users/wishlist")).bearer_auth(token).send().await?;
        let body: WishlistResponse = read_body(response).await?;
        if !body.success {
            return Err(StoreError::RemoteRejected { status: 200, message: body.message.unwrap_or_default() });
        }
        Ok(body.wishlist)
    }

    async fn toggle(&self, token: &str, item: &LikeItem) -> Result<()> {
        let response = self.http.post(self.url("/users/wishlist/toggle")).bearer_auth(token).json(item).send().await?;
        let body: StatusResponse = read_body(response).await?;
        if !body.success {
            return Err(StoreError::RemoteRejected { status: 200, message: body.message.unwrap_or_default() });
        }
        Ok(())
    }
}

async fn read_body<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<StatusResponse>(&text).ok().and_then(|b| b.message).unwrap_or(text);
        return Err(StoreError::RemoteRejected { status: status.as_u16(), message });
    }
    Ok(serde_json::from_str(&text)?)
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct WishlistResponse {
    success: bool,
    #[serde(default)]
    wishlist: Vec<LikeItem>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}
