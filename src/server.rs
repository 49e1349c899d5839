//! Wishlist service.
//!
//! Serves the account wishlist endpoints the store syncs with. Wishlists are
//! kept in memory per bearer token.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::aggregates::LikeItem;

#[derive(Clone, Default)]
pub struct AppState {
    wishlists: Arc<RwLock<HashMap<String, Vec<LikeItem>>>>,
}

impl AppState {
    pub fn new() -> Self { Self::default() }
}

#[derive(Debug, Serialize)]
pub struct WishlistResponse { pub success: bool, pub wishlist: Vec<LikeItem> }

#[derive(Debug, Serialize)]
pub struct ToggleResponse { pub success: bool, pub liked: bool, pub wishlist: Vec<LikeItem> }

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "stone-cart"})) }))
        .route("/api/users/wishlist", get(get_wishlist))
        .route("/api/users/wishlist/toggle", post(toggle_wishlist))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    headers.get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or((StatusCode::UNAUTHORIZED, Json(json!({"success": false, "message": "Not authorized, no token"}))))
}

async fn get_wishlist(State(s): State<AppState>, headers: HeaderMap) -> Result<Json<WishlistResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let wishlist = s.wishlists.read().await.get(&token).cloned().unwrap_or_default();
    Ok(Json(WishlistResponse { success: true, wishlist }))
}

async fn toggle_wishlist(State(s): State<AppState>, headers: HeaderMap, Json(item): Json<LikeItem>) -> Result<Json<ToggleResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    if item.product_id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({"success": false, "message": "productId is required"}))));
    }
    let mut wishlists = s.wishlists.write().await;
    let entries = wishlists.entry(token).or_default();
    let liked = if entries.iter().any(|i| i.product_id == item.product_id) {
        entries.retain(|i| i.product_id != item.product_id);
        false
    } else {
        entries.push(item.clone());
        true
    };
    tracing::debug!(product_id = %item.product_id, liked, "wishlist toggled");
    Ok(Json(ToggleResponse { success: true, liked, wishlist: entries.clone() }))
}
