//! # Order Repository
//!
//! Home of the checkout transaction: a single database transaction that
//! re-validates every cart line against live product state, decrements
//! stock under a guard, freezes price/name snapshots into order items and
//! destroys the cart. Any failure rolls the whole unit back.
//!
//! ## Checkout Transaction
//! ```text
//! BEGIN
//!   for each line:
//!     SELECT product            ← precise error (missing/inactive/stock)
//!     UPDATE stock WHERE        ← authoritative race guard
//!       stock_quantity >= qty
//!   INSERT order + order_items  ← snapshots frozen here
//!   DELETE cart                 ← cart dies with the same commit
//! COMMIT
//! ```
//!
//! SQLite serializes writers, so two checkouts racing for the last unit
//! cannot both pass the guarded UPDATE; the loser rolls back.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use checkout_core::{CoreError, Order, OrderItem, OrderStatus, PaymentMethod, Product};

const SELECT_ORDER: &str = r#"
    SELECT id, user_id, address_id, tracking_number, status, sum_cents,
           payment_method, created_at, updated_at
    FROM orders
"#;

/// One priced line going into checkout. The unit price is the rule-engine
/// resolution for the checkout instant; the transaction freezes it into the
/// order item snapshot.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Converts a cart into an order in one transaction.
    ///
    /// ## Behavior
    /// - Every line is re-validated against live product state inside the
    ///   transaction; missing, inactive or under-stocked products abort
    ///   the whole unit with a typed error naming the product.
    /// - Stock is decremented through a guarded UPDATE; a concurrent
    ///   checkout that got there first makes the guard fail and this
    ///   checkout roll back.
    /// - The cart row is deleted in the same transaction, so the cart and
    ///   the order never coexist.
    pub async fn create_checkout(
        &self,
        user_id: &str,
        address_id: &str,
        cart_id: &str,
        payment_method: PaymentMethod,
        lines: &[CheckoutLine],
    ) -> DbResult<(Order, Vec<OrderItem>)> {
        if lines.is_empty() {
            return Err(CoreError::EmptyCart(user_id.to_string()).into());
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        debug!(
            order_id = %order_id,
            user_id = %user_id,
            lines = lines.len(),
            "Starting checkout transaction"
        );

        let mut tx = self.pool.begin().await?;

        let mut sum_cents: i64 = 0;
        let mut items = Vec::with_capacity(lines.len());

        for line in lines {
            // Read inside the transaction for precise error naming and an
            // authoritative name snapshot.
            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, name, base_price_cents, stock_quantity, is_active,
                       created_at, updated_at
                FROM products
                WHERE id = ?1
                "#,
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if !product.is_active {
                return Err(CoreError::InactiveProduct {
                    name: product.name,
                }
                .into());
            }

            if product.stock_quantity < line.quantity {
                return Err(CoreError::InsufficientStock {
                    name: product.name,
                    available: product.stock_quantity,
                    requested: line.quantity,
                }
                .into());
            }

            // The guard re-states the checks above so a writer that slipped
            // in between read and update still cannot over-sell.
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - ?2, updated_at = ?3
                WHERE id = ?1 AND is_active = 1 AND stock_quantity >= ?2
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(CoreError::InsufficientStock {
                    name: product.name,
                    available: product.stock_quantity,
                    requested: line.quantity,
                }
                .into());
            }

            sum_cents += line.unit_price_cents * line.quantity;

            items.push(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                price_cents: line.unit_price_cents,
                name_snapshot: product.name,
                quantity: line.quantity,
                created_at: now,
            });
        }

        let order = Order {
            id: order_id.clone(),
            user_id: user_id.to_string(),
            address_id: address_id.to_string(),
            tracking_number: None,
            status: OrderStatus::Pending,
            sum_cents,
            payment_method,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, address_id, tracking_number, status, sum_cents,
                payment_method, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.address_id)
        .bind(&order.tracking_number)
        .bind(order.status)
        .bind(order.sum_cents)
        .bind(order.payment_method)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, price_cents, name_snapshot,
                    quantity, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.price_cents)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        // Cart and order never coexist: the cart dies with this commit.
        sqlx::query("DELETE FROM carts WHERE id = ?1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            user_id = %user_id,
            sum_cents = order.sum_cents,
            "Checkout committed"
        );

        Ok((order, items))
    }

    /// Gets an order by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{SELECT_ORDER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets an order by ID, failing with NotFound when absent.
    pub async fn get_required(&self, id: &str) -> DbResult<Order> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Gets the items of an order.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, price_cents, name_snapshot,
                   quantity, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets all orders for a user, newest first.
    pub async fn orders_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "{SELECT_ORDER} WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Partially updates the only mutable order fields: status and tracking
    /// number. Omitted fields are left untouched.
    pub async fn update_status(
        &self,
        id: &str,
        status: Option<OrderStatus>,
        tracking_number: Option<&str>,
    ) -> DbResult<Order> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = COALESCE(?2, status),
                tracking_number = COALESCE(?3, tracking_number),
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(tracking_number)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        self.get_required(id).await
    }

    /// Hard-deletes an order. Items and the payment row cascade with it;
    /// stock and loyalty are deliberately not compensated.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(order_id = %id, "Order deleted");

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

    fn product(id: &str, name: &str, price: i64, stock: i64, active: bool) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: name.to_string(),
            base_price_cents: price,
            stock_quantity: stock,
            is_active: active,
            created_at: now,
            updated_at: now,
        }
    }

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&product("p1", "Widget", 5000, 5, true))
            .await
            .unwrap();
        db.products()
            .insert(&product("p2", "Gadget", 2000, 1, true))
            .await
            .unwrap();
        db.products()
            .insert(&product("p3", "Relic", 1000, 5, false))
            .await
            .unwrap();
        db.addresses()
            .insert(&checkout_core::Address {
                id: "a1".to_string(),
                user_id: "user-1".to_string(),
                line1: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                country: "US".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let cart = db.carts().get_or_create("user-1").await.unwrap();
        (db, cart.id)
    }

    fn line(product_id: &str, quantity: i64, price: i64) -> CheckoutLine {
        CheckoutLine {
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents: price,
        }
    }

    #[tokio::test]
    async fn test_checkout_decrements_stock_and_destroys_cart() {
        let (db, cart_id) = setup().await;
        db.carts().add_item(&cart_id, "p1", 3).await.unwrap();

        let (order, items) = db
            .orders()
            .create_checkout(
                "user-1",
                "a1",
                &cart_id,
                PaymentMethod::Online,
                &[line("p1", 3, 5000)],
            )
            .await
            .unwrap();

        assert_eq!(order.sum_cents, 15_000);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name_snapshot, "Widget");
        assert_eq!(items[0].price_cents, 5000);

        let p = db.products().get_required("p1").await.unwrap();
        assert_eq!(p.stock_quantity, 2);

        assert!(db.carts().get_by_id(&cart_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checkout_insufficient_stock_rolls_back() {
        let (db, cart_id) = setup().await;

        let err = db
            .orders()
            .create_checkout(
                "user-1",
                "a1",
                &cart_id,
                PaymentMethod::Online,
                &[line("p1", 2, 5000), line("p2", 2, 2000)],
            )
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                name,
                available,
                requested,
            }) => {
                assert_eq!(name, "Gadget");
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        // First line's decrement rolled back; cart survived.
        let p1 = db.products().get_required("p1").await.unwrap();
        assert_eq!(p1.stock_quantity, 5);
        assert!(db.carts().get_by_id(&cart_id).await.unwrap().is_some());
        assert!(db
            .orders()
            .orders_for_user("user-1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_checkout_rejects_inactive_product() {
        let (db, cart_id) = setup().await;

        let err = db
            .orders()
            .create_checkout(
                "user-1",
                "a1",
                &cart_id,
                PaymentMethod::Online,
                &[line("p3", 1, 1000)],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InactiveProduct { .. })
        ));
    }

    #[tokio::test]
    async fn test_checkout_rejects_missing_product_and_empty_cart() {
        let (db, cart_id) = setup().await;

        let err = db
            .orders()
            .create_checkout(
                "user-1",
                "a1",
                &cart_id,
                PaymentMethod::Online,
                &[line("missing", 1, 100)],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(_))
        ));

        let err = db
            .orders()
            .create_checkout("user-1", "a1", &cart_id, PaymentMethod::Online, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart(_))));
    }

    #[tokio::test]
    async fn test_update_status_partial() {
        let (db, cart_id) = setup().await;
        let (order, _) = db
            .orders()
            .create_checkout(
                "user-1",
                "a1",
                &cart_id,
                PaymentMethod::CashOnDelivery,
                &[line("p1", 1, 5000)],
            )
            .await
            .unwrap();

        let updated = db
            .orders()
            .update_status(&order.id, Some(OrderStatus::Shipped), Some("TRK-1"))
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.tracking_number.as_deref(), Some("TRK-1"));

        // Omitted fields stay put.
        let updated = db
            .orders()
            .update_status(&order.id, Some(OrderStatus::Delivered), None)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);
        assert_eq!(updated.tracking_number.as_deref(), Some("TRK-1"));
    }

    #[tokio::test]
    async fn test_delete_order_keeps_stock() {
        let (db, cart_id) = setup().await;
        let (order, _) = db
            .orders()
            .create_checkout(
                "user-1",
                "a1",
                &cart_id,
                PaymentMethod::Online,
                &[line("p1", 2, 5000)],
            )
            .await
            .unwrap();

        db.orders().delete(&order.id).await.unwrap();

        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());
        assert!(db.orders().items(&order.id).await.unwrap().is_empty());

        // No automatic restock on delete.
        let p = db.products().get_required("p1").await.unwrap();
        assert_eq!(p.stock_quantity, 3);

        let err = db.orders().delete(&order.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
