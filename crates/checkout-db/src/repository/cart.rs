//! # Cart Repository
//!
//! Ephemeral pre-order state: one cart per user, items identified by the
//! unique (cart_id, product_id) pair. The cart is destroyed atomically by
//! the checkout transaction (see the order repository); this repository
//! covers everything up to that point.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use checkout_core::validation::validate_quantity;
use checkout_core::{Cart, CartItem};

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Gets a cart by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id, created_at FROM carts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Gets the cart for a user, if one exists.
    pub async fn get_for_user(&self, user_id: &str) -> DbResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id, created_at FROM carts WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Gets the user's cart, creating it on first use.
    ///
    /// The UNIQUE constraint on user_id backs the one-cart-per-user rule;
    /// a duplicate insert surfaces as a unique violation (Conflict).
    pub async fn get_or_create(&self, user_id: &str) -> DbResult<Cart> {
        if let Some(cart) = self.get_for_user(user_id).await? {
            return Ok(cart);
        }

        let cart = Cart {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };

        debug!(cart_id = %cart.id, user_id = %user_id, "Creating cart");

        sqlx::query("INSERT INTO carts (id, user_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(&cart.id)
            .bind(&cart.user_id)
            .bind(cart.created_at)
            .execute(&self.pool)
            .await?;

        Ok(cart)
    }

    /// Adds a product to a cart, merging quantities on repeat adds.
    ///
    /// The (cart_id, product_id) pair is unique; adding the same product
    /// again increases the existing line's quantity.
    pub async fn add_item(&self, cart_id: &str, product_id: &str, quantity: i64) -> DbResult<()> {
        validate_quantity(quantity).map_err(checkout_core::CoreError::from)?;

        debug!(cart_id = %cart_id, product_id = %product_id, quantity = %quantity, "Adding cart item");

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = quantity + excluded.quantity
            "#,
        )
        .bind(&id)
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets all items in a cart.
    pub async fn items(&self, cart_id: &str) -> DbResult<Vec<CartItem>> {
        let items = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, cart_id, product_id, quantity, created_at
            FROM cart_items
            WHERE cart_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Removes a product line from a cart.
    pub async fn remove_item(&self, cart_id: &str, product_id: &str) -> DbResult<()> {
        let result =
            sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1 AND product_id = ?2")
                .bind(cart_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartItem", product_id));
        }

        Ok(())
    }

    /// Deletes a cart and its items (outside checkout; the checkout path
    /// destroys the cart inside its own transaction).
    pub async fn delete(&self, cart_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM carts WHERE id = ?1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", cart_id));
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
    use checkout_core::Product;

    async fn db_with_product() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: "p1".to_string(),
                name: "Widget".to_string(),
                base_price_cents: 5000,
                stock_quantity: 10,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_one_cart_per_user() {
        let db = db_with_product().await;
        let repo = db.carts();

        let first = repo.get_or_create("user-1").await.unwrap();
        let second = repo.get_or_create("user-1").await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_add_item_merges_quantities() {
        let db = db_with_product().await;
        let repo = db.carts();
        let cart = repo.get_or_create("user-1").await.unwrap();

        repo.add_item(&cart.id, "p1", 2).await.unwrap();
        repo.add_item(&cart.id, "p1", 3).await.unwrap();

        let items = repo.items(&cart.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_add_item_rejects_invalid_quantity() {
        let db = db_with_product().await;
        let repo = db.carts();
        let cart = repo.get_or_create("user-1").await.unwrap();

        assert!(repo.add_item(&cart.id, "p1", 0).await.is_err());
        assert!(repo.add_item(&cart.id, "p1", -2).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_cart_cascades_items() {
        let db = db_with_product().await;
        let repo = db.carts();
        let cart = repo.get_or_create("user-1").await.unwrap();
        repo.add_item(&cart.id, "p1", 2).await.unwrap();

        repo.delete(&cart.id).await.unwrap();

        assert!(repo.get_by_id(&cart.id).await.unwrap().is_none());
        assert!(repo.items(&cart.id).await.unwrap().is_empty());
    }
}
