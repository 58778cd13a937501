//! # Cart Repository
//!
//! The per-user cart ("panier").
//!
//! ## Cart vs Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart_items                         order_items                         │
//! │  ─────────────                      ─────────────                       │
//! │  live join to products              frozen name + unit price            │
//! │  no stock reserved                  stock decremented at placement      │
//! │  one row per (user, product)        one row per (order, product)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Adding a product that is already in the cart increases its quantity.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use boutique_core::validation::{validate_identifier, validate_quantity};
use boutique_core::{CartLine, ValidationError, MAX_ITEM_QUANTITY, MAX_ORDER_LINES};

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Adds `quantity` units of a product to the user's cart.
    ///
    /// The upsert is the first statement of the transaction, so the write
    /// lock is taken (waiting out `busy_timeout`) before anything is read.
    /// Limit checks run afterwards against the merged row; a failed check
    /// drops the transaction and the upsert rolls back.
    ///
    /// ## Errors
    /// - `NotFound` if the product does not exist
    /// - validation errors for a bad quantity, or when the merged quantity
    ///   or the number of distinct products exceeds the order limits
    pub async fn add(&self, user_id: &str, product_id: &str, quantity: i64) -> DbResult<CartLine> {
        validate_identifier("user_id", user_id)?;
        validate_identifier("product_id", product_id)?;
        validate_quantity(quantity)?;

        debug!(user_id = %user_id, product_id = %product_id, quantity = %quantity, "Adding to cart");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let now = Utc::now();
        let merged: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (user_id, product_id) DO UPDATE SET
                quantity = cart_items.quantity + excluded.quantity,
                updated_at = excluded.updated_at
            RETURNING quantity
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            // cart_items.product_id references products
            DbError::ForeignKeyViolation { .. } => DbError::not_found("Product", product_id),
            other => other,
        })?;

        if merged > MAX_ITEM_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            }
            .into());
        }

        let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        if lines > MAX_ORDER_LINES as i64 {
            return Err(ValidationError::OutOfRange {
                field: "cart items".to_string(),
                min: 0,
                max: MAX_ORDER_LINES as i64,
            }
            .into());
        }

        let line = fetch_line(&mut tx, user_id, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart item", product_id))?;

        tx.commit().await.map_err(DbError::transaction)?;

        Ok(line)
    }

    /// Lists the cart with live product data, oldest addition first.
    pub async fn list(&self, user_id: &str) -> DbResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT
                c.product_id,
                p.name,
                p.brand,
                p.price_cents,
                c.quantity,
                p.is_available,
                c.created_at AS added_at
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?1
            ORDER BY c.created_at, c.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Removes one product from the cart.
    pub async fn remove(&self, user_id: &str, product_id: &str) -> DbResult<()> {
        debug!(user_id = %user_id, product_id = %product_id, "Removing from cart");

        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", product_id));
        }

        Ok(())
    }

    /// Empties the cart and returns how many lines were removed.
    pub async fn clear(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

async fn fetch_line(
    conn: &mut SqliteConnection,
    user_id: &str,
    product_id: &str,
) -> DbResult<Option<CartLine>> {
    let line = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT
            c.product_id, p.name, p.brand, p.price_cents, c.quantity,
            p.is_available, c.created_at AS added_at
        FROM cart_items c
        JOIN products p ON p.id = c.product_id
        WHERE c.user_id = ?1 AND c.product_id = ?2
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;

    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};
    use boutique_core::CoreError;

    #[tokio::test]
    async fn test_add_merges_quantity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().insert(&NewProduct::new("Chaise", 4599, 8)).await.unwrap();
        let carts = db.carts();

        let line = carts.add("alice", &p.id, 1).await.unwrap();
        assert_eq!(line.quantity, 1);
        let line = carts.add("alice", &p.id, 2).await.unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.line_total().cents(), 3 * 4599);

        let listed = carts.list("alice").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Chaise");
        assert!(carts.list("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_product_and_bad_quantity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().insert(&NewProduct::new("Table", 9900, 2)).await.unwrap();
        let carts = db.carts();

        assert!(matches!(
            carts.add("alice", "missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            carts.add("alice", &p.id, 0).await,
            Err(DbError::Domain(CoreError::Validation(_)))
        ));

        carts.add("alice", &p.id, 999).await.unwrap();
        assert!(carts.add("alice", &p.id, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db.products().insert(&NewProduct::new("A", 100, 5)).await.unwrap();
        let b = db.products().insert(&NewProduct::new("B", 200, 5)).await.unwrap();
        let carts = db.carts();

        carts.add("alice", &a.id, 1).await.unwrap();
        carts.add("alice", &b.id, 2).await.unwrap();

        carts.remove("alice", &a.id).await.unwrap();
        assert!(matches!(
            carts.remove("alice", &a.id).await,
            Err(DbError::NotFound { .. })
        ));

        let lines = carts.list("alice").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].product_id.as_str(), lines[0].quantity), (b.id.as_str(), 2));

        assert_eq!(carts.clear("alice").await.unwrap(), 1);
        assert_eq!(carts.clear("alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejected_add_leaves_cart_unchanged() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().insert(&NewProduct::new("Lampe", 1000, 5)).await.unwrap();
        let carts = db.carts();

        carts.add("alice", &p.id, 990).await.unwrap();
        assert!(matches!(
            carts.add("alice", &p.id, 10).await,
            Err(DbError::Domain(CoreError::Validation(_)))
        ));
        // the merged upsert was rolled back
        assert_eq!(carts.list("alice").await.unwrap()[0].quantity, 990);

        assert!(matches!(
            carts.add("bob", "missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(carts.list("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_line_count_limit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let carts = db.carts();

        let mut ids = Vec::new();
        for i in 0..=MAX_ORDER_LINES {
            let p = db
                .products()
                .insert(&NewProduct::new(format!("Article {i}"), 100, 5))
                .await
                .unwrap();
            ids.push(p.id);
        }

        for id in &ids[..MAX_ORDER_LINES] {
            carts.add("alice", id, 1).await.unwrap();
        }
        assert!(carts.add("alice", &ids[MAX_ORDER_LINES], 1).await.is_err());
        // adding to an existing line is still allowed
        carts.add("alice", &ids[0], 1).await.unwrap();
        assert_eq!(carts.list("alice").await.unwrap().len(), MAX_ORDER_LINES);
    }

    #[tokio::test]
    async fn test_concurrent_adds_on_file_database() {
        let path = std::env::temp_dir().join(format!("boutique-cart-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(8))
            .await
            .unwrap();

        let mut product_ids = Vec::new();
        for i in 0..8 {
            let p = db
                .products()
                .insert(&NewProduct::new(format!("Article {i}"), 500, 10))
                .await
                .unwrap();
            product_ids.push(p.id);
        }

        let mut handles = Vec::new();
        for i in 0..40 {
            let carts = db.carts();
            let user_id = format!("user-{}", i % 5);
            let product_id = product_ids[i % product_ids.len()].clone();
            handles.push(tokio::spawn(async move {
                carts.add(&user_id, &product_id, 1).await
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await.unwrap() {
                panic!("concurrent add failed: {e:?}");
            }
        }

        let mut units = 0;
        for u in 0..5 {
            units += db
                .carts()
                .list(&format!("user-{u}"))
                .await
                .unwrap()
                .iter()
                .map(|line| line.quantity)
                .sum::<i64>();
        }
        assert_eq!(units, 40);

        db.close().await;
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }
}
