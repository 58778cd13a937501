//! # HTTP Handlers
//!
//! ## Organization
//! ```text
//! handlers/
//! ├── mod.rs       ◄─── You are here (response envelope)
//! ├── health.rs    ◄─── Liveness and database check
//! ├── products.rs  ◄─── Read-only catalogue
//! ├── orders.rs    ◄─── Placement, checkout, caller's orders
//! ├── cart.rs      ◄─── Cart (panier) lines
//! ├── users.rs     ◄─── Caller profile
//! └── admin.rs     ◄─── All orders, status changes
//! ```
//!
//! ## Handler Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  async fn handler(                                                      │
//! │      State(state): State<AppState>,   ◄── pool, jwt, notifier, config   │
//! │      user: AuthUser,                  ◄── 401 before the body is read   │
//! │      payload: Result<Json<T>, JsonRejection>,                           │
//! │  ) -> ApiResult<(StatusCode, Json<ApiResponse<U>>)>                     │
//! │                                                                         │
//! │  decode ─► validate ─► repository call ─► envelope                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Body rejections are taken as `Result` so malformed JSON comes back in the
//! `{ code, message }` error shape instead of axum's plain-text default.

pub mod admin;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use serde::Serialize;

/// Success envelope: `{ "status": "success", "data": ..., "message"? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            status: "success",
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            status: "success",
            data,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());

        let json = serde_json::to_value(ApiResponse::with_message((), "Panier vidé")).unwrap();
        assert_eq!(json["message"], "Panier vidé");
    }
}
