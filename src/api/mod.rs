//! HTTP surface of the storefront catalog.
//!
//! Every response uses the storefront envelope: `{ "success": true, "data": .. }`
//! on success, `{ "success": false, "message": .. }` on failure.

mod catalog;
mod orders;
mod session;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::CatalogService;
use crate::domain::aggregates::{Cart, CartError, Wishlist};
use crate::CatalogError;

/// State shared by all handlers. Cheap to clone.
///
/// Lock order is catalog first, then carts or wishlists.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: RwLock<CatalogService>,
    carts: Mutex<HashMap<String, Cart>>,
    wishlists: Mutex<HashMap<String, Wishlist>>,
    latency: Duration,
}

impl AppState {
    pub fn new(catalog: CatalogService, latency: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: RwLock::new(catalog),
                carts: Mutex::new(HashMap::new()),
                wishlists: Mutex::new(HashMap::new()),
                latency,
            }),
        }
    }

    async fn simulate_latency(&self) {
        if !self.inner.latency.is_zero() {
            tokio::time::sleep(self.inner.latency).await;
        }
    }

    pub(crate) async fn catalog(&self) -> RwLockReadGuard<'_, CatalogService> {
        self.simulate_latency().await;
        self.inner.catalog.read().await
    }

    pub(crate) async fn catalog_mut(&self) -> RwLockWriteGuard<'_, CatalogService> {
        self.inner.catalog.write().await
    }

    pub(crate) async fn carts(&self) -> MutexGuard<'_, HashMap<String, Cart>> {
        self.inner.carts.lock().await
    }

    pub(crate) async fn wishlists(&self) -> MutexGuard<'_, HashMap<String, Wishlist>> {
        self.inner.wishlists.lock().await
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-catalog"})) }))
        .route("/api/v1/products", get(catalog::list_products))
        .route("/api/v1/products/search", get(catalog::search_products))
        .route("/api/v1/products/featured", get(catalog::featured_products))
        .route("/api/v1/products/suggestions", get(catalog::search_suggestions))
        .route("/api/v1/products/:id", get(catalog::get_product))
        .route("/api/v1/products/:id/related", get(catalog::related_products))
        .route("/api/v1/products/:id/stock", patch(catalog::update_stock))
        .route("/api/v1/categories", get(catalog::list_categories))
        .route("/api/v1/categories/:category/products", get(catalog::category_products))
        .route("/api/v1/orders/review-eligibility", post(orders::review_eligibility))
        .route("/api/v1/cart/:session", get(session::get_cart).delete(session::clear_cart))
        .route("/api/v1/cart/:session/items", post(session::add_cart_item))
        .route("/api/v1/cart/:session/items/:product_id", put(session::update_cart_item).delete(session::remove_cart_item))
        .route("/api/v1/wishlist/:session", get(session::get_wishlist))
        .route("/api/v1/wishlist/:session/toggle", post(session::toggle_wishlist))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Envelope & Errors
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    data: T,
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope { success: true, data }))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Catalog(CatalogError::NotFound(_)) | Self::Cart(CartError::ItemNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Catalog(CatalogError::Validation(_)) | Self::Cart(CartError::InvalidQuantity) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Cart(CartError::InsufficientStock { .. }) => StatusCode::CONFLICT,
        };
        tracing::warn!(error = %self, status = status.as_u16(), "Request failed");
        (status, Json(serde_json::json!({"success": false, "message": self.to_string()}))).into_response()
    }
}
