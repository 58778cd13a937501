//! # Product Repository
//!
//! Read side of the catalogue, plus the insert used by the seed binary and
//! tests. Stock is only ever decremented by order placement
//! (see [`super::order`]); `restock` is the one way to add units back.
//!
//! ## Key Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /products        → list_available(limit)   is_available = 1       │
//! │  GET /products/search → search(filters)         paged, filtered        │
//! │  GET /products/{id}   → get_by_id(id)           any product            │
//! │  seed / tests         → insert(NewProduct)                             │
//! │  seed / tests         → restock(id, units)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use boutique_core::validation::{
    validate_price_cents, validate_product_filters, validate_product_name, validate_stock,
};
use boutique_core::{Product, ProductFilters, ProductPage};

const PRODUCT_COLUMNS: &str = r#"
    id, name, description, brand, price_cents, stock, is_available, created_at, updated_at
"#;

// =============================================================================
// Insert Input
// =============================================================================

/// Fields needed to create a product. Id and timestamps are generated.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub is_available: bool,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price_cents: i64, stock: i64) -> Self {
        NewProduct {
            name: name.into(),
            description: None,
            brand: None,
            price_cents,
            stock,
            is_available: true,
        }
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products that can be ordered, by name.
    pub async fn list_available(&self, limit: i64) -> DbResult<Vec<Product>> {
        debug!(limit = %limit, "Listing available products");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_available = 1 ORDER BY name, id LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Filtered, paged catalogue search.
    ///
    /// The search term matches name, description or brand (LIKE, so ASCII
    /// case-insensitive). Name matches rank first. `total` counts every
    /// matching row, not just this page.
    pub async fn search(&self, filters: &ProductFilters) -> DbResult<ProductPage> {
        let (page, page_size) = validate_product_filters(filters)?;
        let pattern = filters.search_term().map(like_pattern);
        let brands: Vec<String> = filters
            .brands
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect();

        debug!(
            search = ?filters.search_term(),
            brands = brands.len(),
            page = %page,
            page_size = %page_size,
            "Searching products"
        );

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count, filters, pattern.as_deref(), &brands);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let offset = (page - 1).saturating_mul(page_size);
        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        push_filters(&mut select, filters, pattern.as_deref(), &brands);
        match pattern {
            Some(pattern) => {
                select
                    .push(" ORDER BY CASE WHEN name LIKE ")
                    .push_bind(pattern)
                    .push(r" ESCAPE '\' THEN 0 ELSE 1 END, name, id");
            }
            None => {
                select.push(" ORDER BY name, id");
            }
        }
        select
            .push(" LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind(offset);

        let products = select.build_query_as::<Product>().fetch_all(&self.pool).await?;

        Ok(ProductPage {
            products,
            total,
            page,
            page_size,
        })
    }

    /// Gets a product by ID, available or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it.
    pub async fn insert(&self, input: &NewProduct) -> DbResult<Product> {
        validate_product_name(&input.name)?;
        validate_price_cents(input.price_cents)?;
        validate_stock(input.stock)?;

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            brand: input.brand.clone(),
            price_cents: input.price_cents,
            stock: input.stock,
            is_available: input.is_available,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, brand,
                price_cents, stock, is_available,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Adds units back to a product's stock.
    pub async fn restock(&self, id: &str, units: i64) -> DbResult<()> {
        validate_stock(units)?;
        debug!(id = %id, units = %units, "Restocking product");

        let result = sqlx::query(
            "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(units)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Appends the WHERE clause shared by the count and the page query.
fn push_filters(
    query: &mut QueryBuilder<'_, Sqlite>,
    filters: &ProductFilters,
    pattern: Option<&str>,
    brands: &[String],
) {
    query.push(" WHERE 1 = 1");

    if let Some(available) = filters.available {
        query.push(" AND is_available = ").push_bind(available);
    }
    if let Some(min) = filters.min_price_cents {
        query.push(" AND price_cents >= ").push_bind(min);
    }
    if let Some(max) = filters.max_price_cents {
        query.push(" AND price_cents <= ").push_bind(max);
    }

    if !brands.is_empty() {
        query.push(" AND brand IN (");
        let mut list = query.separated(", ");
        for brand in brands {
            list.push_bind(brand.clone());
        }
        list.push_unseparated(")");
    }

    if let Some(pattern) = pattern {
        query
            .push(" AND (name LIKE ")
            .push_bind(pattern.to_string())
            .push(r" ESCAPE '\' OR description LIKE ")
            .push_bind(pattern.to_string())
            .push(r" ESCAPE '\' OR brand LIKE ")
            .push_bind(pattern.to_string())
            .push(r" ESCAPE '\')");
    }
}

/// Wraps a search term for LIKE, escaping its own wildcards.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use boutique_core::CoreError;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo
            .insert(&NewProduct::new("Lampe de chevet", 2499, 12).brand("Lumina"))
            .await
            .unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Lampe de chevet");
        assert_eq!(fetched.brand.as_deref(), Some("Lumina"));
        assert_eq!(fetched.price_cents, 2499);
        assert_eq!(fetched.stock, 12);
        assert!(fetched.is_available);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_available_skips_unavailable() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&NewProduct::new("Bougie", 900, 3)).await.unwrap();
        repo.insert(&NewProduct::new("Armoire", 19900, 1).unavailable())
            .await
            .unwrap();
        repo.insert(&NewProduct::new("Coussin", 1500, 0)).await.unwrap();

        let listed = repo.list_available(50).await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bougie", "Coussin"]);

        assert_eq!(repo.list_available(1).await.unwrap().len(), 1);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_input() {
        let db = test_db().await;
        let repo = db.products();

        assert!(repo.insert(&NewProduct::new("", 100, 1)).await.is_err());
        assert!(repo.insert(&NewProduct::new("Vase", -1, 1)).await.is_err());
        assert!(repo.insert(&NewProduct::new("Vase", 100, -1)).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_restock() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.insert(&NewProduct::new("Tapis", 5000, 2)).await.unwrap();

        repo.restock(&product.id, 3).await.unwrap();
        assert_eq!(repo.get_by_id(&product.id).await.unwrap().unwrap().stock, 5);

        assert!(matches!(
            repo.restock("missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
    }

    async fn seed_catalogue(repo: &ProductRepository) {
        for product in [
            NewProduct::new("Lampe de chevet", 2499, 12).brand("Lumina"),
            NewProduct::new("Lampadaire arc", 15900, 2).brand("Lumina"),
            NewProduct::new("Bougie parfumée", 900, 30)
                .brand("Cirea")
                .description("Cire de soja, parfum lampe à huile"),
            NewProduct::new("Vase 100% lin", 3200, 4).brand("Textura"),
            NewProduct::new("Lampe tempête", 4500, 0).brand("Lumina").unavailable(),
        ] {
            repo.insert(&product).await.unwrap();
        }
    }

    fn names(page: &ProductPage) -> Vec<&str> {
        page.products.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_search_matches_name_description_and_brand() {
        let db = test_db().await;
        let repo = db.products();
        seed_catalogue(&repo).await;

        let filters = ProductFilters {
            search: Some("LAMP".to_string()),
            available: Some(true),
            ..Default::default()
        };
        let page = repo.search(&filters).await.unwrap();

        // Name matches first, then the description-only match
        assert_eq!(names(&page), vec!["Lampadaire arc", "Lampe de chevet", "Bougie parfumée"]);
        assert_eq!(page.total, 3);
        assert_eq!((page.page, page.page_size), (1, 20));

        let by_brand = ProductFilters {
            search: Some("textura".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&repo.search(&by_brand).await.unwrap()), vec!["Vase 100% lin"]);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = test_db().await;
        let repo = db.products();
        seed_catalogue(&repo).await;

        let percent = ProductFilters {
            search: Some("100%".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&repo.search(&percent).await.unwrap()), vec!["Vase 100% lin"]);

        let underscore = ProductFilters {
            search: Some("_".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.search(&underscore).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_search_price_brand_and_availability_filters() {
        let db = test_db().await;
        let repo = db.products();
        seed_catalogue(&repo).await;

        let price = ProductFilters {
            min_price_cents: Some(2499),
            max_price_cents: Some(4500),
            ..Default::default()
        };
        assert_eq!(
            names(&repo.search(&price).await.unwrap()),
            vec!["Lampe de chevet", "Lampe tempête", "Vase 100% lin"]
        );

        let brands = ProductFilters {
            brands: vec!["Cirea".to_string(), " Textura ".to_string(), String::new()],
            ..Default::default()
        };
        assert_eq!(
            names(&repo.search(&brands).await.unwrap()),
            vec!["Bougie parfumée", "Vase 100% lin"]
        );

        let unavailable = ProductFilters {
            available: Some(false),
            ..Default::default()
        };
        assert_eq!(names(&repo.search(&unavailable).await.unwrap()), vec!["Lampe tempête"]);

        let combined = ProductFilters {
            brands: vec!["Lumina".to_string()],
            available: Some(true),
            max_price_cents: Some(10000),
            ..Default::default()
        };
        assert_eq!(names(&repo.search(&combined).await.unwrap()), vec!["Lampe de chevet"]);
    }

    #[tokio::test]
    async fn test_search_pagination() {
        let db = test_db().await;
        let repo = db.products();
        for i in 0..5 {
            repo.insert(&NewProduct::new(format!("Tabouret {i}"), 1000 + i, 1))
                .await
                .unwrap();
        }

        let mut filters = ProductFilters {
            page_size: Some(2),
            ..Default::default()
        };
        let first = repo.search(&filters).await.unwrap();
        assert_eq!(names(&first), vec!["Tabouret 0", "Tabouret 1"]);
        assert_eq!(first.total, 5);
        assert_eq!(first.total_pages(), 3);

        filters.page = Some(3);
        let last = repo.search(&filters).await.unwrap();
        assert_eq!(names(&last), vec!["Tabouret 4"]);
        assert_eq!(last.total, 5);

        filters.page = Some(4);
        let past_end = repo.search(&filters).await.unwrap();
        assert!(past_end.products.is_empty());
        assert_eq!(past_end.total, 5);
    }

    #[tokio::test]
    async fn test_search_rejects_invalid_filters() {
        let db = test_db().await;
        let repo = db.products();

        let inverted = ProductFilters {
            min_price_cents: Some(500),
            max_price_cents: Some(100),
            ..Default::default()
        };
        assert!(matches!(
            repo.search(&inverted).await,
            Err(DbError::Domain(CoreError::Validation(_)))
        ));

        let zero_page = ProductFilters {
            page: Some(0),
            ..Default::default()
        };
        assert!(repo.search(&zero_page).await.is_err());
    }
}
