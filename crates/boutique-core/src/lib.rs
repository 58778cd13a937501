//! # boutique-core: Pure Business Logic for Boutique
//!
//! This crate holds the domain of the shop as pure functions with zero I/O
//! dependencies. The database layer and the HTTP app build on top of it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Boutique Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │    POST /orders, GET /orders, /cart, /admin/orders ...          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ boutique-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   order   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ OrderDraft│  │   rules   │  │   │
//! │  │   │  Order    │  │           │  │  pricing  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  boutique-db (Database Layer)                   │   │
//! │  │         SQLite queries, migrations, order transactions          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderItem, CartLine, User)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`order`] - Order line normalization and pricing (`OrderDraft`)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use boutique_core::money::Money;
//! use boutique_core::order::{OrderDraft, StockSnapshot};
//!
//! let product = StockSnapshot {
//!     id: "p-1".to_string(),
//!     name: "Lampe".to_string(),
//!     price_cents: 1000,
//!     stock: 5,
//!     is_available: true,
//! };
//!
//! let mut draft = OrderDraft::new();
//! draft.add_line(&product, 3).unwrap();
//! assert_eq!(draft.total(), Money::from_cents(3000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{OrderDraft, PricedLine, StockSnapshot};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products in a single order or cart.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single product per order line.
///
/// Guards against typos such as 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Prefix of every human-facing order number.
pub const ORDER_NUMBER_PREFIX: &str = "CMD";
