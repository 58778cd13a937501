//! # Order Handlers
//!
//! ## Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /orders  { "items": [{ "product_id": "p-1", "quantity": 3 }] }    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AuthUser (401 without a valid token)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.orders().place_order(user_id, items)   ◄── one transaction          │
//! │       │                                                                 │
//! │       ├── Err ─► ApiError (400 / 404 / 409 / 500), nothing written      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  spawn_confirmation(order, token email)    ◄── detached, best effort    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  201 { status: "success", data: Order }                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `POST /orders/checkout` follows the same path with the caller's cart as
//! the item list.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use boutique_core::{Order, OrderLine};

use super::ApiResponse;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::notify::spawn_confirmation;
use crate::state::AppState;

/// Body of `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLine>,
}

/// `POST /orders`
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let Json(request) = payload?;

    debug!(user_id = %user.id(), lines = request.items.len(), "place_order");

    let order = state.db.orders().place_order(user.id(), &request.items).await?;
    confirm(&state, &user, &order);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(order, "Commande créée")),
    ))
}

/// `POST /orders/checkout`
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<(StatusCode, Json<ApiResponse<Order>>)> {
    debug!(user_id = %user.id(), "checkout");

    let order = state.db.orders().checkout_cart(user.id()).await?;
    confirm(&state, &user, &order);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(order, "Commande créée")),
    ))
}

/// `GET /orders`: the caller's orders, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.db.orders().list_for_user(user.id()).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// `GET /orders/{id}`
///
/// Another user's order is reported as not found.
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Order>>> {
    let order = state
        .db
        .orders()
        .get_for_user(&id, user.id())
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &id))?;

    Ok(Json(ApiResponse::success(order)))
}

fn confirm(state: &AppState, user: &AuthUser, order: &Order) {
    // handle dropped: the response does not wait for delivery
    let _ = spawn_confirmation(
        state.notifier.clone(),
        order,
        &state.config.notify_from_address,
        user.email(),
    );
}
