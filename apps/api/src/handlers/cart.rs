//! # Cart Handlers
//!
//! The cart lives in the database, keyed by the token subject, so it
//! survives across sessions and devices. Prices shown here are the current
//! catalogue prices; they are only frozen when the cart is checked out.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use boutique_core::{CartLine, Money};

use super::ApiResponse;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// Body of `POST /cart`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Cart contents with the running total.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_cents: i64,
    pub item_count: i64,
}

impl From<Vec<CartLine>> for CartView {
    fn from(items: Vec<CartLine>) -> Self {
        let total: Money = items.iter().map(CartLine::line_total).sum();
        let item_count = items.iter().map(|line| line.quantity).sum();

        CartView {
            items,
            total_cents: total.cents(),
            item_count,
        }
    }
}

/// `GET /cart`: an empty cart is an empty list.
pub async fn get_cart(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<ApiResponse<CartView>>> {
    let lines = state.db.carts().list(user.id()).await?;
    Ok(Json(ApiResponse::success(CartView::from(lines))))
}

/// `POST /cart`: adds to the quantity already in the cart.
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<AddToCartRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<CartLine>>> {
    let Json(request) = payload?;

    debug!(user_id = %user.id(), product_id = %request.product_id, quantity = request.quantity, "add_to_cart");

    let line = state
        .db
        .carts()
        .add(user.id(), &request.product_id, request.quantity)
        .await?;

    Ok(Json(ApiResponse::with_message(line, "Produit ajouté au panier")))
}

/// `DELETE /cart/{product_id}`
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.db.carts().remove(user.id(), &product_id).await?;
    Ok(Json(ApiResponse::with_message((), "Produit retiré du panier")))
}

#[derive(Debug, Serialize)]
pub struct ClearedCart {
    pub removed: u64,
}

/// `DELETE /cart`
pub async fn clear_cart(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<ApiResponse<ClearedCart>>> {
    let removed = state.db.carts().clear(user.id()).await?;
    Ok(Json(ApiResponse::with_message(ClearedCart { removed }, "Panier vidé")))
}
