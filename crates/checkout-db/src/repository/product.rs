//! # Product Repository
//!
//! Database operations on the catalog surface the checkout core consumes:
//! read price/stock/active, decrement stock. Full catalog CRUD lives in a
//! collaborator and is not part of this core.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use checkout_core::Product;

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, base_price_cents, stock_quantity, is_active,
           created_at, updated_at
    FROM products
    WHERE id = ?1
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(SELECT_PRODUCT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by ID, failing with NotFound when absent.
    pub async fn get_required(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, base_price_cents, stock_quantity, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.base_price_cents)
        .bind(product.stock_quantity)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adjusts product stock by a delta (positive for restocking).
    ///
    /// The checkout path does NOT use this: its decrement runs inside the
    /// checkout transaction with a stock-level guard (see the order
    /// repository).
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn product(id: &str, price: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            base_price_cents: price,
            stock_quantity: stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.products();

        repo.insert(&product("p1", 5000, 5)).await.unwrap();

        let loaded = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(loaded.base_price_cents, 5000);
        assert_eq!(loaded.stock_quantity, 5);
        assert!(loaded.is_active);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_required_not_found() {
        let db = db().await;
        let err = db.products().get_required("nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&product("p1", 5000, 5)).await.unwrap();

        repo.adjust_stock("p1", 10).await.unwrap();
        assert_eq!(
            repo.get_required("p1").await.unwrap().stock_quantity,
            15
        );
    }
}
