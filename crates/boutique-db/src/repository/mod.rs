//! # Repository Module
//!
//! Database repositories for Boutique.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │  state.db.orders().place_order(&user_id, &lines)                │
//! │       ▼                                                                 │
//! │  OrderRepository ── holds a SqlitePool clone, owns the SQL              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories are obtained from [`crate::Database`] accessors and are
//! cheap to create per request.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalogue reads, seed inserts
//! - [`order::OrderRepository`] - Order placement, queries, status
//! - [`cart::CartRepository`] - Per-user cart
//! - [`user::UserRepository`] - Users keyed by Google subject

pub mod cart;
pub mod order;
pub mod product;
pub mod user;
