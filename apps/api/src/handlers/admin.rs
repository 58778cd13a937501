//! # Admin Handlers
//!
//! Require a token with `is_admin: true` (see [`AdminUser`]).
//!
//! ## Status Lifecycle
//! ```text
//! pending ──► confirmed ──► shipped ──► delivered
//!    │            │
//!    └────────────┴──► cancelled
//! ```

use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use boutique_core::{Order, OrderStatus, OrderSummary};

use super::ApiResponse;
use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /admin/orders`: every order, newest first, with buyer details.
pub async fn list_all_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<ApiResponse<Vec<OrderSummary>>>> {
    let orders = state.db.orders().list_all().await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// `PATCH /admin/orders/{id}/status`
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Order>>> {
    let Json(request) = payload?;
    let next = OrderStatus::from_str(&request.status)?;

    let order = state.db.orders().update_status(&id, next).await?;

    info!(
        order_id = %order.id,
        status = %order.status,
        admin = %admin.sub,
        "Order status changed by admin"
    );

    Ok(Json(ApiResponse::with_message(order, "Statut mis à jour")))
}
