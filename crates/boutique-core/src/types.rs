//! # Domain Types
//!
//! Core domain types used throughout Boutique.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  order_id (FK)  │       │
//! │  │  name           │   │  order_number   │   │  product_id     │       │
//! │  │  price_cents    │   │  user_id        │   │  name snapshot  │       │
//! │  │  stock          │   │  status         │   │  unit price     │       │
//! │  │  is_available   │   │  total_cents    │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderStatus   │   │    CartLine     │   │      User       │       │
//! │  │  pending        │   │  product_id     │   │  google_id      │       │
//! │  │  confirmed      │   │  quantity       │   │  email          │       │
//! │  │  shipped        │   │  current price  │   │  is_admin       │       │
//! │  │  delivered      │   └─────────────────┘   └─────────────────┘       │
//! │  │  cancelled      │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders have:
//! - `id`: UUID v4, used for relations
//! - `order_number`: `CMD-YYYYMMDD-XXXXXXXX`, shown to customers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    pub description: Option<String>,

    pub brand: Option<String>,

    /// Price in cents.
    pub price_cents: i64,

    /// Units on hand. Decremented by orders, never negative.
    pub stock: i64,

    /// Whether the product can currently be ordered.
    pub is_available: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Catalogue search criteria. Every field is optional; absent fields do
/// not constrain the result.
///
/// ```text
/// search      LIKE over name, description and brand
/// min/max     inclusive price bounds, in cents
/// brands      exact brand match, any of
/// available   None means "any"
/// page        1-based, page_size rows per page
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductFilters {
    pub search: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    #[serde(default)]
    pub brands: Vec<String>,
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ProductFilters {
    /// Search term with surrounding whitespace removed, if any is left.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// One page of catalogue results.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Rows matching the filters across all pages.
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl ProductPage {
    pub fn total_pages(&self) -> i64 {
        if self.page_size <= 0 {
            return 0;
        }
        (self.total + self.page_size - 1) / self.page_size
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle state of an order.
///
/// ```text
/// pending ──► confirmed ──► shipped ──► delivered
///    │            │
///    └────────────┴──► cancelled
/// ```
///
/// Orders are created `pending`; every other state is set by an admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All states, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Checks whether an order in this state may move to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipped)
                | (Confirmed, Cancelled)
                | (Shipped, Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|st| st.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Order Line (request)
// =============================================================================

/// One requested (product, quantity) pair, before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
}

impl OrderLine {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        OrderLine {
            product_id: product_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-facing reference, e.g. `CMD-20261019-3F2A9C1B`.
    pub order_number: String,
    /// External identity of the buyer (token subject).
    pub user_id: String,
    /// Σ(unit_price × quantity) over `items`, fixed at placement.
    pub total_cents: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<OrderItem>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of the line totals, recomputed from unit prices.
    pub fn items_total(&self) -> Money {
        self.items
            .iter()
            .map(|item| item.unit_price() * item.quantity)
            .sum()
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Name and unit price are frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of order (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of order (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Order Summary (admin listing)
// =============================================================================

/// An order joined with its buyer, as listed to admins.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderSummary {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    /// Buyer details, absent when the user has no local profile yet.
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub item_count: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Cart ("panier")
// =============================================================================

/// A cart entry joined with live product data.
///
/// Unlike order items, prices here are NOT snapshots: the cart always shows
/// the current catalogue price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
    pub is_available: bool,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Current price × quantity.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents) * self.quantity
    }
}

// =============================================================================
// User
// =============================================================================

/// A shop user, keyed by the external (Google) identity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub google_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_order_status_transitions() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));

        assert!(!Pending.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Cancelled));
        for next in OrderStatus::ALL {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_order_status_parse_and_serialize() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" Confirmed ".parse::<OrderStatus>().unwrap(), OrderStatus::Confirmed);
        assert!("en_attente".parse::<OrderStatus>().is_err());

        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }

    #[test]
    fn test_order_items_total() {
        let now = Utc::now();
        let item = |price: i64, qty: i64| OrderItem {
            id: "i".to_string(),
            order_id: "o".to_string(),
            product_id: "p".to_string(),
            name_snapshot: "x".to_string(),
            unit_price_cents: price,
            quantity: qty,
            line_total_cents: price * qty,
        };
        let order = Order {
            id: "o".to_string(),
            order_number: "CMD-20260101-ABCDEF12".to_string(),
            user_id: "u".to_string(),
            total_cents: 3500,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            items: vec![item(1000, 3), item(250, 2)],
        };

        assert_eq!(order.items_total(), order.total());
    }

    #[test]
    fn test_cart_line_total() {
        let line = CartLine {
            product_id: "p".to_string(),
            name: "Chaise".to_string(),
            brand: None,
            price_cents: 4599,
            quantity: 2,
            is_available: true,
            added_at: Utc::now(),
        };
        assert_eq!(line.line_total().cents(), 9198);
    }
}
