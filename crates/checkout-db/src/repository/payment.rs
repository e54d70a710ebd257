//! # Payment Repository
//!
//! Exactly one payment per order, enforced twice: a pre-check for a clean
//! typed error and the UNIQUE(order_id) constraint as the race backstop.
//! Completed/Failed are terminal; the transition UPDATEs are guarded with
//! `WHERE status = 'pending'` so a late or replayed transition is a no-op.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use checkout_core::{Payment, PaymentMethod, PaymentStatus};

const SELECT_PAYMENT: &str = r#"
    SELECT id, order_id, method, status, amount_cents, transaction_id,
           details, created_at, updated_at
    FROM payments
"#;

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Creates the payment for an order.
    ///
    /// The id is caller-supplied (see [`generate_payment_id`]) because the
    /// online flow quotes it to the provider as the merchant reference
    /// before the row exists.
    ///
    /// ## Errors
    /// Returns UniqueViolation when the order already has a payment.
    pub async fn create(
        &self,
        id: &str,
        order_id: &str,
        method: PaymentMethod,
        amount_cents: i64,
        transaction_id: Option<&str>,
        details: Option<&str>,
    ) -> DbResult<Payment> {
        if self.get_by_order(order_id).await?.is_some() {
            return Err(DbError::duplicate("payments.order_id", order_id));
        }

        let now = Utc::now();
        let payment = Payment {
            id: id.to_string(),
            order_id: order_id.to_string(),
            method,
            status: PaymentStatus::Pending,
            amount_cents,
            transaction_id: transaction_id.map(str::to_string),
            details: details.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        debug!(
            payment_id = %payment.id,
            order_id = %order_id,
            amount_cents = amount_cents,
            "Creating payment"
        );

        // UNIQUE(order_id) backs the pre-check under races.
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, method, status, amount_cents, transaction_id,
                details, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.method)
        .bind(payment.status)
        .bind(payment.amount_cents)
        .bind(&payment.transaction_id)
        .bind(&payment.details)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Gets a payment by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(&format!("{SELECT_PAYMENT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Gets the payment for an order, if any.
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Option<Payment>> {
        let payment =
            sqlx::query_as::<_, Payment>(&format!("{SELECT_PAYMENT} WHERE order_id = ?1"))
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(payment)
    }

    /// Gets the payment for an order, failing with NotFound when absent.
    pub async fn get_required_by_order(&self, order_id: &str) -> DbResult<Payment> {
        self.get_by_order(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", order_id))
    }

    /// Attempts the pending → terminal transition.
    ///
    /// ## Returns
    /// `true` when the transition was applied, `false` when the payment was
    /// already terminal (the guard matched no row). The caller decides
    /// whether a skipped transition matters; for callback replays it does
    /// not.
    pub async fn transition(
        &self,
        payment_id: &str,
        to: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> DbResult<bool> {
        debug_assert!(to.is_terminal());

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = ?2,
                transaction_id = COALESCE(?3, transaction_id),
                updated_at = ?4
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(payment_id)
        .bind(to)
        .bind(transaction_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let applied = result.rows_affected() > 0;

        if applied {
            info!(payment_id = %payment_id, status = ?to, "Payment transitioned");
        } else {
            warn!(
                payment_id = %payment_id,
                attempted = ?to,
                "Skipping transition on non-pending payment"
            );
        }

        Ok(applied)
    }
}

/// Helper to generate a new payment ID.
pub fn generate_payment_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
