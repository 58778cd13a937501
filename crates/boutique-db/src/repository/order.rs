//! # Order Repository
//!
//! Order placement, order queries and admin status changes.
//!
//! ## Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place_order(user_id, lines)                          │
//! │                                                                         │
//! │  validate user id, normalize lines (merge duplicates)  ← no DB yet      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ▼  for each line                                                  │
//! │  UPDATE products SET stock = stock WHERE id = ? RETURNING ...           │
//! │       │   (locked read: first write takes the database write lock)      │
//! │       ├── no row         → NotFound            ─┐                       │
//! │       ├── not available  → ProductUnavailable   │                       │
//! │       ├── stock < qty    → InsufficientStock    ├─► drop tx = ROLLBACK  │
//! │       └── priced into OrderDraft (checked)      │                       │
//! │       │                                         │                       │
//! │       ▼                                         │                       │
//! │  INSERT orders, INSERT order_items              │                       │
//! │       │                                         │                       │
//! │       ▼  for each line                          │                       │
//! │  UPDATE products SET stock = stock - q          │                       │
//! │   WHERE id = ? AND stock >= q                   │                       │
//! │       └── 0 rows        → StockConflict  ───────┘                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first statement inside the transaction is a write, so SQLite grants
//! the write lock before any stock is read. A concurrent placement blocks on
//! that lock (up to the busy timeout) and then reads the already decremented
//! stock. Two orders can never both act on the same stale stock value.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use boutique_core::order::{generate_order_number, normalize_lines};
use boutique_core::validation::validate_identifier;
use boutique_core::{
    CoreError, Order, OrderDraft, OrderItem, OrderLine, OrderStatus, OrderSummary, StockSnapshot,
};

const ORDER_COLUMNS: &str = "id, order_number, user_id, total_cents, status, created_at, updated_at";

const ITEM_COLUMNS: &str = r#"
    oi.id, oi.order_id, oi.product_id, oi.name_snapshot,
    oi.unit_price_cents, oi.quantity, oi.line_total_cents
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Places an order atomically.
    ///
    /// Returns the committed order with its line items. Every error path
    /// leaves products, orders and order items exactly as they were.
    ///
    /// ## Errors
    /// - `Domain(Validation)` for an empty list, bad quantity or blank id
    /// - `NotFound` for an unknown product
    /// - `Domain(InsufficientStock)` / `Domain(ProductUnavailable)`
    /// - `Domain(AmountOverflow)` when the total does not fit
    /// - `StockConflict` if the conditional decrement matches no row
    /// - persistence variants for begin/commit/query failures
    pub async fn place_order(&self, user_id: &str, lines: &[OrderLine]) -> DbResult<Order> {
        validate_identifier("user_id", user_id)?;
        let lines = normalize_lines(lines)?;

        debug!(user_id = %user_id, lines = lines.len(), "Placing order");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;
        let order = insert_order(&mut tx, user_id, &lines).await?;
        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            user_id = %order.user_id,
            total = %order.total(),
            items = order.items.len(),
            "Order placed"
        );

        Ok(order)
    }

    /// Turns the user's cart into an order and empties the cart, atomically.
    ///
    /// The cart is deleted by the first statement of the transaction, which
    /// also takes the write lock. On any error the rollback restores it.
    /// An empty cart is a validation error.
    pub async fn checkout_cart(&self, user_id: &str) -> DbResult<Order> {
        validate_identifier("user_id", user_id)?;

        debug!(user_id = %user_id, "Checking out cart");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let mut rows: Vec<(String, i64, DateTime<Utc>)> = sqlx::query_as(
            "DELETE FROM cart_items WHERE user_id = ?1 RETURNING product_id, quantity, created_at",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;
        rows.sort_by(|a, b| a.2.cmp(&b.2));

        let requested: Vec<OrderLine> = rows
            .into_iter()
            .map(|(product_id, quantity, _)| OrderLine::new(product_id, quantity))
            .collect();
        let lines = normalize_lines(&requested)?;

        let order = insert_order(&mut tx, user_id, &lines).await?;
        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            user_id = %order.user_id,
            total = %order.total(),
            "Cart checked out"
        );

        Ok(order)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lists a user's orders, newest first, each with its items.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        debug!(user_id = %user_id, "Listing orders for user");

        let mut orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.user_id = ?1
            ORDER BY oi.order_id, oi.position
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id.clone()).or_default().push(item);
        }
        for order in &mut orders {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }

        Ok(orders)
    }

    /// Gets one order with items. Absent when missing or owned by another user.
    pub async fn get_for_user(&self, order_id: &str, user_id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match order {
            Some(order) => Ok(Some(self.with_items(order).await?)),
            None => Ok(None),
        }
    }

    /// Gets one order with items, regardless of owner.
    pub async fn get_by_id(&self, order_id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        match order {
            Some(order) => Ok(Some(self.with_items(order).await?)),
            None => Ok(None),
        }
    }

    /// Gets the items of an order, in the order they were placed.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items oi WHERE oi.order_id = ?1 ORDER BY oi.position"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists every order with its buyer, newest first (admin view).
    pub async fn list_all(&self) -> DbResult<Vec<OrderSummary>> {
        debug!("Listing all orders");

        let summaries = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT
                o.id,
                o.order_number,
                o.user_id,
                u.email,
                u.first_name,
                u.last_name,
                o.total_cents,
                o.status,
                (SELECT COUNT(*) FROM order_items oi WHERE oi.order_id = o.id) AS item_count,
                o.created_at,
                o.updated_at
            FROM orders o
            LEFT JOIN users u ON u.google_id = o.user_id
            ORDER BY o.created_at DESC, o.rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Moves an order to `next` if the lifecycle allows it.
    ///
    /// The update is conditioned on the status that was checked, so a
    /// concurrent change surfaces as `InvalidStatusTransition` instead of
    /// being overwritten.
    pub async fn update_status(&self, order_id: &str, next: OrderStatus) -> DbResult<Order> {
        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

        let current = current.ok_or_else(|| DbError::not_found("Order", order_id))?;

        if !current.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                order_id: order_id.to_string(),
                from: current,
                to: next,
            }
            .into());
        }

        let result = sqlx::query(
            "UPDATE orders SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(order_id)
        .bind(current)
        .bind(next)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InvalidStatusTransition {
                order_id: order_id.to_string(),
                from: current,
                to: next,
            }
            .into());
        }

        info!(order_id = %order_id, from = %current, to = %next, "Order status changed");

        self.get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    /// Counts orders (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn with_items(&self, mut order: Order) -> DbResult<Order> {
        order.items = self.get_items(&order.id).await?;
        Ok(order)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// Steps 2-6 of placement, run on an open transaction.
///
/// `lines` must already be normalized. The caller commits.
async fn insert_order(
    conn: &mut SqliteConnection,
    user_id: &str,
    lines: &[OrderLine],
) -> DbResult<Order> {
    // locked read, stock check, pricing
    let mut draft = OrderDraft::new();
    for line in lines {
        let snapshot = lock_product(&mut *conn, &line.product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", line.product_id.as_str()))?;

        draft.add_line(&snapshot, line.quantity)?;
    }

    let now = Utc::now();
    let order_id = Uuid::new_v4().to_string();
    let mut order = Order {
        id: order_id.clone(),
        order_number: generate_order_number(now),
        user_id: user_id.trim().to_string(),
        total_cents: draft.total().cents(),
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
        items: Vec::with_capacity(draft.lines().len()),
    };

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, order_number, user_id, total_cents, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(&order.user_id)
    .bind(order.total_cents)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    for (position, line) in draft.lines().iter().enumerate() {
        let item = OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.clone(),
            product_id: line.product_id.clone(),
            name_snapshot: line.name.clone(),
            unit_price_cents: line.unit_price.cents(),
            quantity: line.quantity,
            line_total_cents: line.line_total.cents(),
        };

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, name_snapshot,
                unit_price_cents, quantity, line_total_cents, position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.line_total_cents)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;

        order.items.push(item);
    }

    for line in draft.lines() {
        decrement_stock(&mut *conn, &line.product_id, line.quantity).await?;
    }

    Ok(order)
}

/// Reads price and stock of a product while holding the write lock.
async fn lock_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Option<StockSnapshot>> {
    let snapshot = sqlx::query_as::<_, StockSnapshot>(
        r#"
        UPDATE products SET stock = stock
        WHERE id = ?1
        RETURNING id, name, price_cents, stock, is_available
        "#,
    )
    .bind(product_id)
    .fetch_optional(conn)
    .await?;

    Ok(snapshot)
}

/// Decrements stock only if enough remains at write time.
async fn decrement_stock(conn: &mut SqliteConnection, product_id: &str, quantity: i64) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?1, updated_at = ?3
        WHERE id = ?2 AND stock >= ?1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::StockConflict {
            product_id: product_id.to_string(),
            requested: quantity,
        });
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};
    use boutique_core::{Money, ValidationError};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    async fn item_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_place_order_decrements_stock_and_prices_lines() {
        let db = test_db().await;
        let lampe = db
            .products()
            .insert(&NewProduct::new("Lampe", 1000, 5))
            .await
            .unwrap();

        let order = db
            .orders()
            .place_order("user-1", &[OrderLine::new(&lampe.id, 3)])
            .await
            .unwrap();

        assert_eq!(order.total(), Money::from_cents(3000));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_number.starts_with("CMD-"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].unit_price_cents, 1000);
        assert_eq!(order.items[0].name_snapshot, "Lampe");
        assert_eq!(stock_of(&db, &lampe.id).await, 2);

        // second order for 3 no longer fits
        let err = db
            .orders()
            .place_order("user-2", &[OrderLine::new(&lampe.id, 3)])
            .await
            .unwrap_err();
        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock_of(&db, &lampe.id).await, 2);
        assert_eq!(db.orders().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_total_matches_items_for_multi_line_order() {
        let db = test_db().await;
        let a = db.products().insert(&NewProduct::new("A", 1099, 10)).await.unwrap();
        let b = db.products().insert(&NewProduct::new("B", 250, 10)).await.unwrap();

        let order = db
            .orders()
            .place_order(
                "user-1",
                &[
                    OrderLine::new(&a.id, 2),
                    OrderLine::new(&b.id, 4),
                    OrderLine::new(&a.id, 1),
                ],
            )
            .await
            .unwrap();

        // duplicate lines merged into one item
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product_id, a.id);
        assert_eq!(order.items[0].quantity, 3);
        assert_eq!(order.total_cents, 3 * 1099 + 4 * 250);
        assert_eq!(order.items_total(), order.total());

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.items_total(), stored.total());
        assert_eq!(stock_of(&db, &a.id).await, 7);
        assert_eq!(stock_of(&db, &b.id).await, 6);
    }

    #[tokio::test]
    async fn test_unknown_product_leaves_tables_unchanged() {
        let db = test_db().await;
        let a = db.products().insert(&NewProduct::new("A", 500, 4)).await.unwrap();

        let err = db
            .orders()
            .place_order(
                "user-1",
                &[OrderLine::new(&a.id, 2), OrderLine::new("no-such-product", 1)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(stock_of(&db, &a.id).await, 4);
        assert_eq!(db.orders().count().await.unwrap(), 0);
        assert_eq!(item_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_on_later_line_rolls_back_all() {
        let db = test_db().await;
        let a = db.products().insert(&NewProduct::new("A", 500, 10)).await.unwrap();
        let b = db.products().insert(&NewProduct::new("B", 500, 1)).await.unwrap();

        let err = db
            .orders()
            .place_order("user-1", &[OrderLine::new(&a.id, 5), OrderLine::new(&b.id, 2)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(stock_of(&db, &a.id).await, 10);
        assert_eq!(stock_of(&db, &b.id).await, 1);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_product_is_rejected() {
        let db = test_db().await;
        let off = db
            .products()
            .insert(&NewProduct::new("Off", 500, 10).unavailable())
            .await
            .unwrap();

        let err = db
            .orders()
            .place_order("user-1", &[OrderLine::new(&off.id, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::ProductUnavailable(_))));
        assert_eq!(stock_of(&db, &off.id).await, 10);
    }

    #[tokio::test]
    async fn test_invalid_requests_rejected_before_database() {
        let db = test_db().await;
        let a = db.products().insert(&NewProduct::new("A", 500, 10)).await.unwrap();
        let orders = db.orders();

        let empty = orders.place_order("user-1", &[]).await.unwrap_err();
        assert!(matches!(
            empty,
            DbError::Domain(CoreError::Validation(ValidationError::Required { .. }))
        ));

        for qty in [0, -2] {
            let err = orders
                .place_order("user-1", &[OrderLine::new(&a.id, qty)])
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                DbError::Domain(CoreError::Validation(ValidationError::MustBePositive { .. }))
            ));
        }

        let blank_user = orders
            .place_order(" ", &[OrderLine::new(&a.id, 1)])
            .await
            .unwrap_err();
        assert!(matches!(blank_user, DbError::Domain(CoreError::Validation(_))));

        assert_eq!(stock_of(&db, &a.id).await, 10);
        assert_eq!(orders.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_orders_never_oversell() {
        let db = test_db().await;
        let p = db.products().insert(&NewProduct::new("P", 1000, 5)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..6 {
            let repo = db.orders();
            let product_id = p.id.clone();
            handles.push(tokio::spawn(async move {
                repo.place_order(&format!("user-{i}"), &[OrderLine::new(product_id, 2)])
                    .await
            }));
        }

        let mut succeeded = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. }))
                | Err(DbError::StockConflict { .. }) => insufficient += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        // 5 units, 2 per order: exactly two orders fit
        assert_eq!(succeeded, 2);
        assert_eq!(insufficient, 4);
        assert_eq!(stock_of(&db, &p.id).await, 1);
        assert_eq!(db.orders().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_orders_on_file_database() {
        let path = std::env::temp_dir().join(format!("boutique-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let p = db.products().insert(&NewProduct::new("P", 1000, 5)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..4 {
            let repo = db.orders();
            let product_id = p.id.clone();
            handles.push(tokio::spawn(async move {
                repo.place_order(&format!("user-{i}"), &[OrderLine::new(product_id, 3)])
                    .await
            }));
        }

        // every loser must see the committed stock, never a lock error
        let mut succeeded = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. }))
                | Err(DbError::StockConflict { .. }) => insufficient += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(insufficient, 3);
        assert_eq!(stock_of(&db, &p.id).await, 2);
        assert_eq!(db.orders().count().await.unwrap(), 1);

        db.close().await;
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[tokio::test]
    async fn test_list_and_get_for_user() {
        let db = test_db().await;
        let a = db.products().insert(&NewProduct::new("A", 100, 50)).await.unwrap();
        let orders = db.orders();

        let first = orders
            .place_order("alice", &[OrderLine::new(&a.id, 1)])
            .await
            .unwrap();
        let second = orders
            .place_order("alice", &[OrderLine::new(&a.id, 2)])
            .await
            .unwrap();
        orders
            .place_order("bob", &[OrderLine::new(&a.id, 3)])
            .await
            .unwrap();

        let listed = orders.list_for_user("alice").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert!(listed.iter().all(|o| o.items.len() == 1));

        assert!(orders.get_for_user(&first.id, "alice").await.unwrap().is_some());
        assert!(orders.get_for_user(&first.id, "bob").await.unwrap().is_none());
        assert!(orders.list_for_user("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_joins_users() {
        let db = test_db().await;
        let a = db.products().insert(&NewProduct::new("A", 100, 50)).await.unwrap();
        db.users()
            .upsert("alice", "alice@example.com", Some("Alice"), None, false)
            .await
            .unwrap();

        db.orders()
            .place_order("alice", &[OrderLine::new(&a.id, 2)])
            .await
            .unwrap();
        db.orders()
            .place_order("ghost", &[OrderLine::new(&a.id, 1)])
            .await
            .unwrap();

        let all = db.orders().list_all().await.unwrap();
        assert_eq!(all.len(), 2);

        let ghost = all.iter().find(|s| s.user_id == "ghost").unwrap();
        assert!(ghost.email.is_none());

        let alice = all.iter().find(|s| s.user_id == "alice").unwrap();
        assert_eq!(alice.email.as_deref(), Some("alice@example.com"));
        assert_eq!(alice.item_count, 1);
        assert_eq!(alice.total_cents, 200);
    }

    #[tokio::test]
    async fn test_update_status_follows_lifecycle() {
        let db = test_db().await;
        let a = db.products().insert(&NewProduct::new("A", 100, 5)).await.unwrap();
        let order = db
            .orders()
            .place_order("alice", &[OrderLine::new(&a.id, 1)])
            .await
            .unwrap();
        let orders = db.orders();

        let confirmed = orders
            .update_status(&order.id, OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.items.len(), 1);

        let err = orders
            .update_status(&order.id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidStatusTransition { .. })
        ));

        orders.update_status(&order.id, OrderStatus::Shipped).await.unwrap();
        orders.update_status(&order.id, OrderStatus::Delivered).await.unwrap();
        assert!(orders
            .update_status(&order.id, OrderStatus::Cancelled)
            .await
            .is_err());

        assert!(matches!(
            orders.update_status("missing", OrderStatus::Confirmed).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_checkout_cart_places_order_and_empties_cart() {
        let db = test_db().await;
        let a = db.products().insert(&NewProduct::new("A", 700, 3)).await.unwrap();
        let b = db.products().insert(&NewProduct::new("B", 300, 3)).await.unwrap();
        db.carts().add("alice", &a.id, 2).await.unwrap();
        db.carts().add("alice", &b.id, 1).await.unwrap();

        let order = db.orders().checkout_cart("alice").await.unwrap();

        assert_eq!(order.total_cents, 2 * 700 + 300);
        assert_eq!(order.items.len(), 2);
        assert!(db.carts().list("alice").await.unwrap().is_empty());
        assert_eq!(stock_of(&db, &a.id).await, 1);
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_cart() {
        let db = test_db().await;
        let a = db.products().insert(&NewProduct::new("A", 700, 5)).await.unwrap();
        db.carts().add("alice", &a.id, 4).await.unwrap();
        db.orders()
            .place_order("bob", &[OrderLine::new(&a.id, 3)])
            .await
            .unwrap();

        let err = db.orders().checkout_cart("alice").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(db.carts().list("alice").await.unwrap().len(), 1);

        let empty = db.orders().checkout_cart("carol").await.unwrap_err();
        assert!(matches!(empty, DbError::Domain(CoreError::Validation(_))));
    }
}
