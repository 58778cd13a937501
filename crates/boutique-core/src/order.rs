//! # Order Pricing
//!
//! Pure half of the order placement workflow.
//!
//! ## Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Placement (split by layer)                     │
//! │                                                                         │
//! │  boutique-core (THIS MODULE)            boutique-db                     │
//! │  ──────────────────────────            ────────────                     │
//! │  normalize_lines(request)                                               │
//! │    validate + merge duplicates                                          │
//! │            │                                                            │
//! │            ▼                            BEGIN                           │
//! │                                         locked read ──► StockSnapshot   │
//! │  OrderDraft::add_line(snapshot, qty) ◄──────┘                           │
//! │    available? enough stock?                                             │
//! │    line = unit_price × qty (checked)                                    │
//! │    total += line (checked)                                              │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  draft.total(), draft.lines() ─────────► INSERT order, items            │
//! │                                         UPDATE stock (conditional)      │
//! │                                         COMMIT                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches the database, so every rule is unit-testable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::OrderLine;
use crate::validation::{validate_identifier, validate_order_lines, validate_quantity, ValidationResult};
use crate::ORDER_NUMBER_PREFIX;

// =============================================================================
// Stock Snapshot
// =============================================================================

/// Price and stock of one product as read under the write lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockSnapshot {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
    pub is_available: bool,
}

// =============================================================================
// Priced Line
// =============================================================================

/// A validated order line with its price frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

// =============================================================================
// Order Draft
// =============================================================================

/// Accumulates priced lines and the running total for one order.
///
/// ## Invariant
/// `total == Σ line_total` and each `line_total == unit_price × quantity`.
/// A failed `add_line` leaves the draft unchanged.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    lines: Vec<PricedLine>,
    total: Money,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prices one line against a locked product snapshot.
    ///
    /// ## Errors
    /// - `ProductUnavailable` when the product is flagged off-sale
    /// - `InsufficientStock` when `quantity > snapshot.stock`
    /// - `AmountOverflow` when the line or the running total overflows
    pub fn add_line(&mut self, product: &StockSnapshot, quantity: i64) -> CoreResult<&PricedLine> {
        validate_quantity(quantity)?;

        if !product.is_available {
            return Err(CoreError::ProductUnavailable(product.id.clone()));
        }

        if quantity > product.stock {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }

        let unit_price = Money::from_cents(product.price_cents);
        let line_total = unit_price
            .checked_mul_quantity(quantity)
            .ok_or(CoreError::AmountOverflow)?;
        let total = self
            .total
            .checked_add(line_total)
            .ok_or(CoreError::AmountOverflow)?;

        self.total = total;
        self.lines.push(PricedLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price,
            quantity,
            line_total,
        });

        Ok(&self.lines[self.lines.len() - 1])
    }

    #[inline]
    pub fn total(&self) -> Money {
        self.total
    }

    #[inline]
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Request Normalization
// =============================================================================

/// Validates a raw order request and merges repeated products.
///
/// Quantities of the same product id are summed; the first occurrence keeps
/// its position. Merged quantities are re-checked against the per-line cap.
///
/// ```rust
/// use boutique_core::order::normalize_lines;
/// use boutique_core::types::OrderLine;
///
/// let lines = normalize_lines(&[
///     OrderLine::new("a", 1),
///     OrderLine::new("b", 2),
///     OrderLine::new("a", 3),
/// ]).unwrap();
///
/// assert_eq!(lines, vec![OrderLine::new("a", 4), OrderLine::new("b", 2)]);
/// ```
pub fn normalize_lines(lines: &[OrderLine]) -> ValidationResult<Vec<OrderLine>> {
    validate_order_lines(lines)?;

    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        let product_id = line.product_id.trim();
        match merged.iter_mut().find(|m| m.product_id == product_id) {
            Some(existing) => existing.quantity += line.quantity,
            None => merged.push(OrderLine::new(product_id, line.quantity)),
        }
    }

    for line in &merged {
        validate_identifier("product_id", &line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    Ok(merged)
}

// =============================================================================
// Order Number
// =============================================================================

/// Builds a human-facing order number: `CMD-YYYYMMDD-XXXXXXXX`.
///
/// The suffix is the first 8 hex digits of a fresh UUID v4, uppercased.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        ORDER_NUMBER_PREFIX,
        now.format("%Y%m%d"),
        simple[..8].to_ascii_uppercase()
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
