//! Per-session cart and wishlist handlers.
//!
//! Cart lines hold catalog stock: adding takes units off the product, removing
//! or shrinking a line puts them back. Sessions whose cart or wishlist empties
//! are dropped from the maps.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ok, ApiError, ApiResult, AppState, Envelope};
use crate::catalog::CatalogService;
use crate::domain::aggregates::{Cart, CartError, CartItem, Product, Wishlist};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantity {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleWishlist {
    pub product_id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<bool>,
    pub product_ids: Vec<u64>,
    /// Wishlisted products still in the catalog.
    pub products: Vec<Product>,
}

impl WishlistView {
    fn new(wishlist: &Wishlist, catalog: &CatalogService, added: Option<bool>) -> Self {
        let products = wishlist.product_ids().iter().filter_map(|id| catalog.get_product_by_id(*id).ok()).cloned().collect();
        Self { added, product_ids: wishlist.product_ids().to_vec(), products }
    }
}

/// Checks that `quantity` more units can be reserved.
fn ensure_available(catalog: &CatalogService, product_id: u64, quantity: u32) -> Result<(), ApiError> {
    let available = catalog.get_product_by_id(product_id)?.stock_quantity.value();
    if quantity > available {
        return Err(CartError::InsufficientStock { product_id, available }.into());
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn get_cart(State(state): State<AppState>, Path(session): Path<String>) -> ApiResult<Cart> {
    let carts = state.carts().await;
    ok(carts.get(&session).cloned().unwrap_or_else(|| Cart::new(session)))
}

#[instrument(skip(state, request))]
pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(session): Path<String>,
    request: Result<Json<AddToCart>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Cart>>), ApiError> {
    let Json(request) = request?;
    if request.quantity == 0 {
        return Err(CartError::InvalidQuantity.into());
    }
    let mut catalog = state.catalog_mut().await;
    ensure_available(&catalog, request.product_id, request.quantity)?;
    let product = catalog.get_product_by_id(request.product_id)?;
    let item = CartItem {
        product_id: product.id,
        title: product.title.clone(),
        quantity: request.quantity,
        unit_price: product.discounted_price,
    };
    catalog.update_product_stock(request.product_id, request.quantity);

    let mut carts = state.carts().await;
    let cart = carts.entry(session.clone()).or_insert_with(|| Cart::new(session));
    cart.add_item(item);
    Ok((StatusCode::CREATED, Json(Envelope { success: true, data: cart.clone() })))
}

#[instrument(skip(state, request))]
pub async fn update_cart_item(
    State(state): State<AppState>,
    path: Result<Path<(String, u64)>, PathRejection>,
    request: Result<Json<SetQuantity>, JsonRejection>,
) -> ApiResult<Cart> {
    let (Path((session, product_id)), Json(request)) = (path?, request?);
    let mut catalog = state.catalog_mut().await;
    let mut carts = state.carts().await;
    let cart = carts.get_mut(&session).ok_or(CartError::ItemNotFound(product_id))?;
    let current = cart.quantity_of(product_id);
    if current == 0 {
        return Err(CartError::ItemNotFound(product_id).into());
    }
    if request.quantity > current {
        let extra = request.quantity - current;
        ensure_available(&catalog, product_id, extra)?;
        catalog.update_product_stock(product_id, extra);
    } else {
        catalog.restock_product(product_id, current - request.quantity);
    }
    cart.update_quantity(product_id, request.quantity)?;
    let cart = cart.clone();
    if cart.is_empty() {
        carts.remove(&session);
    }
    ok(cart)
}

#[instrument(skip(state))]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    path: Result<Path<(String, u64)>, PathRejection>,
) -> ApiResult<Cart> {
    let Path((session, product_id)) = path?;
    let mut catalog = state.catalog_mut().await;
    let mut carts = state.carts().await;
    let cart = carts.get_mut(&session).ok_or(CartError::ItemNotFound(product_id))?;
    let item = cart.remove_item(product_id)?;
    catalog.restock_product(product_id, item.quantity);
    let cart = cart.clone();
    if cart.is_empty() {
        carts.remove(&session);
    }
    ok(cart)
}

#[instrument(skip(state))]
pub async fn clear_cart(State(state): State<AppState>, Path(session): Path<String>) -> ApiResult<Cart> {
    let mut catalog = state.catalog_mut().await;
    let mut carts = state.carts().await;
    if let Some(mut cart) = carts.remove(&session) {
        for item in cart.clear() {
            catalog.restock_product(item.product_id, item.quantity);
        }
    }
    ok(Cart::new(session))
}

#[instrument(skip(state))]
pub async fn get_wishlist(State(state): State<AppState>, Path(session): Path<String>) -> ApiResult<WishlistView> {
    let catalog = state.catalog().await;
    let wishlists = state.wishlists().await;
    let view = match wishlists.get(&session) {
        Some(wishlist) => WishlistView::new(wishlist, &catalog, None),
        None => WishlistView::new(&Wishlist::new(session), &catalog, None),
    };
    ok(view)
}

#[instrument(skip(state, request))]
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    Path(session): Path<String>,
    request: Result<Json<ToggleWishlist>, JsonRejection>,
) -> ApiResult<WishlistView> {
    let Json(request) = request?;
    let catalog = state.catalog().await;
    catalog.get_product_by_id(request.product_id)?;
    let mut wishlists = state.wishlists().await;
    let wishlist = wishlists.entry(session.clone()).or_insert_with(|| Wishlist::new(session.as_str()));
    let added = wishlist.toggle(request.product_id);
    let view = WishlistView::new(wishlist, &catalog, Some(added));
    if wishlist.is_empty() {
        wishlists.remove(&session);
    }
    ok(view)
}
