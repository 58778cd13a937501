//! # Validation Module
//!
//! Input checks that run before any database work.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP body ──► serde (shape) ──► THIS MODULE (rules) ──► transaction    │
//! │                                                                         │
//! │  A request rejected here never opens a transaction, so it cannot touch  │
//! │  stock or the orders table.                                             │
//! │                                                                         │
//! │  SQLite constraints (NOT NULL, CHECK stock >= 0, UNIQUE) back these     │
//! │  rules at the storage level.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use boutique_core::types::OrderLine;
//! use boutique_core::validation::{validate_order_lines, validate_quantity};
//!
//! validate_quantity(5).unwrap();
//! assert!(validate_order_lines(&[]).is_err());
//! assert!(validate_order_lines(&[OrderLine::new("p-1", 2)]).is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::{OrderLine, ProductFilters};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest identifier accepted (UUIDs and Google subjects fit comfortably).
const MAX_IDENTIFIER_LEN: usize = 128;

/// Upper bound for list endpoints.
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Catalogue search page size when none is given.
pub const DEFAULT_SEARCH_PAGE_SIZE: i64 = 20;

/// Largest catalogue search page.
pub const MAX_SEARCH_PAGE_SIZE: i64 = 100;

const MAX_SEARCH_TERM_LEN: usize = 100;
const MAX_BRAND_FILTERS: usize = 20;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an opaque identifier (product id, user id, order id).
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 128 characters
///
/// ```rust
/// use boutique_core::validation::validate_identifier;
///
/// assert!(validate_identifier("product_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_identifier("user_id", "  ").is_err());
/// ```
pub fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(())
}

/// Validates a product name (1 to 200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_ITEM_QUANTITY` (999)
///
/// ## Order Workflow
/// ```text
/// POST /orders { items: [{ product_id: P, quantity: 0 }] }
///      │
///      ▼
/// validate_quantity(0) ← THIS FUNCTION
///      │
///      └── Err(MustBePositive) → 400, no transaction opened
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level for catalogue inserts.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a list page size, returning it clamped to `1..=MAX_PAGE_LIMIT`
/// or `default` when absent.
pub fn validate_limit(limit: Option<i64>, default: i64) -> ValidationResult<i64> {
    match limit {
        None => Ok(default),
        Some(l) if l <= 0 => Err(ValidationError::MustBePositive {
            field: "limit".to_string(),
        }),
        Some(l) => Ok(l.min(MAX_PAGE_LIMIT)),
    }
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the line count of an order request.
///
/// ## Rules
/// - At least one line
/// - At most `MAX_ORDER_LINES` (100)
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    Ok(())
}

/// Validates a complete order request: line count, then every line.
///
/// The first failing line wins; its error names the offending field.
pub fn validate_order_lines(lines: &[OrderLine]) -> ValidationResult<()> {
    validate_line_count(lines.len())?;

    for line in lines {
        validate_identifier("product_id", &line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Catalogue Search
// =============================================================================

/// Validates search criteria and resolves the page window.
///
/// Returns `(page, page_size)`: page defaults to 1, page_size to 20 and is
/// capped at 100. Non-positive values and an inverted price range are
/// rejected rather than silently fixed.
///
/// ```rust
/// use boutique_core::types::ProductFilters;
/// use boutique_core::validation::validate_product_filters;
///
/// assert_eq!(validate_product_filters(&ProductFilters::default()).unwrap(), (1, 20));
/// ```
pub fn validate_product_filters(filters: &ProductFilters) -> ValidationResult<(i64, i64)> {
    if let Some(term) = filters.search_term() {
        if term.chars().count() > MAX_SEARCH_TERM_LEN {
            return Err(ValidationError::TooLong {
                field: "q".to_string(),
                max: MAX_SEARCH_TERM_LEN,
            });
        }
    }

    if let Some(min) = filters.min_price_cents {
        validate_price_bound("min_price", min)?;
    }
    if let Some(max) = filters.max_price_cents {
        validate_price_bound("max_price", max)?;
    }
    if let (Some(min), Some(max)) = (filters.min_price_cents, filters.max_price_cents) {
        if min > max {
            return Err(ValidationError::OutOfRange {
                field: "max_price".to_string(),
                min,
                max: i64::MAX,
            });
        }
    }

    if filters.brands.len() > MAX_BRAND_FILTERS {
        return Err(ValidationError::OutOfRange {
            field: "brand".to_string(),
            min: 0,
            max: MAX_BRAND_FILTERS as i64,
        });
    }

    let page = match filters.page {
        None => 1,
        Some(p) if p <= 0 => {
            return Err(ValidationError::MustBePositive {
                field: "page".to_string(),
            })
        }
        Some(p) => p,
    };

    let page_size = match filters.page_size {
        None => DEFAULT_SEARCH_PAGE_SIZE,
        Some(s) if s <= 0 => {
            return Err(ValidationError::MustBePositive {
                field: "page_size".to_string(),
            })
        }
        Some(s) => s.min(MAX_SEARCH_PAGE_SIZE),
    };

    Ok((page, page_size))
}

fn validate_price_bound(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
