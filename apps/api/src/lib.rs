//! # boutique-api: HTTP API for Boutique
//!
//! axum server exposing the catalogue, carts and orders stored by
//! `boutique-db`.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  client ──► TraceLayer ──► CorsLayer ──► Router                         │
//! │                                            │                            │
//! │                     ┌──────────────────────┼────────────────────┐       │
//! │                     ▼                      ▼                    ▼       │
//! │               AuthUser/AdminUser      handlers::*          ApiError     │
//! │               (JWT claims)            (AppState)           {code,msg}   │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                  boutique-db repositories               │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                  OrderNotifier (detached)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The library half exists so integration tests can build the exact router
//! the binary serves.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod routes;
pub mod state;

pub use auth::{AdminUser, AuthUser, Claims, JwtManager};
pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use notify::{LogNotifier, NotifyError, OrderConfirmation, OrderNotifier};
pub use routes::build_router;
pub use state::AppState;
