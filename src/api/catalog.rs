//! Catalog route handlers.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

use super::{ok, ApiResult, AppState};
use crate::catalog::{CategorySummary, ProductPage, ProductQuery};
use crate::domain::aggregates::Product;

const FEATURED_LIMIT: usize = 8;
const SUGGESTION_LIMIT: usize = 5;
const RELATED_LIMIT: usize = 4;

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct StockUpdate {
    pub quantity: u32,
}

#[instrument(skip_all)]
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<ProductPage> {
    let Query(query) = query?;
    ok(state.catalog().await.get_all_products(&query)?)
}

#[instrument(skip_all)]
pub async fn search_products(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<ProductPage> {
    let Query(query) = query?;
    let term = query.query.clone().unwrap_or_default();
    ok(state.catalog().await.search_products(&term, &query)?)
}

#[instrument(skip_all)]
pub async fn featured_products(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Vec<Product>> {
    let Query(params) = params?;
    ok(state.catalog().await.get_featured_products(params.limit.unwrap_or(FEATURED_LIMIT)))
}

#[instrument(skip_all)]
pub async fn search_suggestions(
    State(state): State<AppState>,
    params: Result<Query<SuggestParams>, QueryRejection>,
) -> ApiResult<Vec<String>> {
    let Query(params) = params?;
    ok(state.catalog().await.get_search_suggestions(&params.q, params.limit.unwrap_or(SUGGESTION_LIMIT)))
}

#[instrument(skip_all)]
pub async fn get_product(State(state): State<AppState>, id: Result<Path<u64>, PathRejection>) -> ApiResult<Product> {
    let Path(id) = id?;
    ok(state.catalog().await.get_product_by_id(id)?.clone())
}

#[instrument(skip_all)]
pub async fn related_products(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Vec<Product>> {
    let (Path(id), Query(params)) = (id?, params?);
    ok(state.catalog().await.get_related_products(id, params.limit.unwrap_or(RELATED_LIMIT)))
}

/// Unknown ids succeed with `data: null`.
#[instrument(skip_all)]
pub async fn update_stock(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<StockUpdate>, JsonRejection>,
) -> ApiResult<Option<Product>> {
    let (Path(id), Json(body)) = (id?, body?);
    ok(state.catalog_mut().await.update_product_stock(id, body.quantity))
}

#[instrument(skip_all)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<CategorySummary>> {
    ok(state.catalog().await.get_categories())
}

#[instrument(skip_all)]
pub async fn category_products(
    State(state): State<AppState>,
    category: Result<Path<String>, PathRejection>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<ProductPage> {
    let (Path(category), Query(query)) = (category?, query?);
    ok(state.catalog().await.products_by_category(&category, &query)?)
}
