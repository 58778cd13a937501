//! # Product Handlers
//!
//! Read-only catalogue. Products are created by the seed binary or an
//! external back office; there is no write route here.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use boutique_core::validation::validate_limit;
use boutique_core::{Product, ProductFilters, ProductPage};

use super::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_PRODUCT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub limit: Option<i64>,
}

/// `GET /products?limit=`
///
/// Available products by name. `limit` defaults to 100 and is capped.
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ListProductsQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<Product>>>> {
    let Query(query) = query?;
    let limit = validate_limit(query.limit, DEFAULT_PRODUCT_LIMIT)?;

    let products = state.db.products().list_available(limit).await?;
    debug!(count = products.len(), limit, "list_products");

    Ok(Json(ApiResponse::success(products)))
}

/// Query string of `GET /products/search`. `brand` is comma-separated.
#[derive(Debug, Deserialize)]
pub struct SearchProductsQuery {
    pub q: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub brand: Option<String>,
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl SearchProductsQuery {
    /// Only available products unless the caller asks otherwise.
    fn into_filters(self) -> ProductFilters {
        ProductFilters {
            search: self.q,
            min_price_cents: self.min_price,
            max_price_cents: self.max_price,
            brands: self
                .brand
                .map(|list| list.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            available: Some(self.available.unwrap_or(true)),
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// `GET /products/search?q=&min_price=&max_price=&brand=&available=&page=&page_size=`
///
/// Prices are in cents. `page` defaults to 1, `page_size` to 20 (max 100).
pub async fn search_products(
    State(state): State<AppState>,
    query: Result<Query<SearchProductsQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<ProductPage>>> {
    let Query(query) = query?;
    let filters = query.into_filters();

    let page = state.db.products().search(&filters).await?;
    debug!(
        returned = page.products.len(),
        total = page.total,
        page = page.page,
        "search_products"
    );

    Ok(Json(ApiResponse::success(page)))
}

/// `GET /products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    Ok(Json(ApiResponse::success(product)))
}
