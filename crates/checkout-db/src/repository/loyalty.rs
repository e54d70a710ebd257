//! # Loyalty Ledger
//!
//! Append-only points ledger plus a maintained balance. Every mutation is
//! one transaction appending a ledger row AND updating the balance, so
//! `balance(user) == SUM(points_delta)` holds at every observable point.
//! Ledger rows are never mutated or deleted.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use checkout_core::validation::validate_point_amount;
use checkout_core::{CoreError, LoyaltyTransaction};

/// Append-only loyalty points ledger with a maintained running balance.
#[derive(Debug, Clone)]
pub struct LoyaltyLedger {
    pool: SqlitePool,
}

impl LoyaltyLedger {
    /// Creates a new LoyaltyLedger.
    pub fn new(pool: SqlitePool) -> Self {
        LoyaltyLedger { pool }
    }

    /// Awards points to a user: appends a positive ledger row and bumps the
    /// balance in the same transaction.
    pub async fn earn(
        &self,
        user_id: &str,
        points: i64,
        reason: &str,
    ) -> DbResult<LoyaltyTransaction> {
        validate_point_amount(points).map_err(CoreError::from)?;

        let txn = LoyaltyTransaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            points_delta: points,
            reason: reason.to_string(),
            created_at: Utc::now(),
        };

        debug!(user_id = %user_id, points = points, reason = %reason, "Earning points");

        let mut tx = self.pool.begin().await?;

        Self::append(&mut tx, &txn).await?;

        sqlx::query(
            r#"
            INSERT INTO loyalty_balances (user_id, balance, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id)
            DO UPDATE SET balance = balance + excluded.balance,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(points)
        .bind(txn.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(user_id = %user_id, points = points, "Points earned");

        Ok(txn)
    }

    /// Redeems points: appends a negative ledger row and decrements the
    /// balance, guarded so the balance can never go negative.
    ///
    /// ## Errors
    /// Returns InsufficientPoints when the guard fails; nothing is written.
    pub async fn redeem(
        &self,
        user_id: &str,
        points: i64,
        reason: &str,
    ) -> DbResult<LoyaltyTransaction> {
        validate_point_amount(points).map_err(CoreError::from)?;

        let txn = LoyaltyTransaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            points_delta: -points,
            reason: reason.to_string(),
            created_at: Utc::now(),
        };

        debug!(user_id = %user_id, points = points, reason = %reason, "Redeeming points");

        let mut tx = self.pool.begin().await?;

        // Guarded decrement: no row is touched when the balance is short,
        // including when the user has no balance row at all.
        let result = sqlx::query(
            r#"
            UPDATE loyalty_balances
            SET balance = balance - ?2, updated_at = ?3
            WHERE user_id = ?1 AND balance >= ?2
            "#,
        )
        .bind(user_id)
        .bind(points)
        .bind(txn.created_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let balance = Self::balance_in(&mut tx, user_id).await?;
            return Err(CoreError::InsufficientPoints {
                user_id: user_id.to_string(),
                balance,
                requested: points,
            }
            .into());
        }

        Self::append(&mut tx, &txn).await?;

        tx.commit().await?;

        info!(user_id = %user_id, points = points, "Points redeemed");

        Ok(txn)
    }

    /// Gets a user's current balance. Users with no ledger history have a
    /// balance of zero.
    pub async fn balance(&self, user_id: &str) -> DbResult<i64> {
        let balance: Option<(i64,)> =
            sqlx::query_as("SELECT balance FROM loyalty_balances WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(balance.map_or(0, |(b,)| b))
    }

    /// Gets a user's ledger history, newest first.
    pub async fn history(&self, user_id: &str) -> DbResult<Vec<LoyaltyTransaction>> {
        let txns = sqlx::query_as::<_, LoyaltyTransaction>(
            r#"
            SELECT id, user_id, points_delta, reason, created_at
            FROM loyalty_transactions
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(txns)
    }

    async fn append(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        txn: &LoyaltyTransaction,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO loyalty_transactions (id, user_id, points_delta, reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&txn.id)
        .bind(&txn.user_id)
        .bind(txn.points_delta)
        .bind(&txn.reason)
        .bind(txn.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn balance_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        user_id: &str,
    ) -> DbResult<i64> {
        let balance: Option<(i64,)> =
            sqlx::query_as("SELECT balance FROM loyalty_balances WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(balance.map_or(0, |(b,)| b))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn ledger() -> (Database, LoyaltyLedger) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = db.loyalty();
        (db, ledger)
    }

    #[tokio::test]
    async fn test_balance_tracks_ledger_sum() {
        let (_db, ledger) = ledger().await;

        assert_eq!(ledger.balance("user-1").await.unwrap(), 0);

        ledger.earn("user-1", 100, "order: o1").await.unwrap();
        ledger.earn("user-1", 50, "order: o2").await.unwrap();
        ledger.redeem("user-1", 30, "discount").await.unwrap();

        assert_eq!(ledger.balance("user-1").await.unwrap(), 120);

        let history = ledger.history("user-1").await.unwrap();
        assert_eq!(history.len(), 3);
        let sum: i64 = history.iter().map(|t| t.points_delta).sum();
        assert_eq!(sum, 120);
    }

    #[tokio::test]
    async fn test_redeem_rejects_overdraft() {
        let (_db, ledger) = ledger().await;
        ledger.earn("user-1", 10, "order: o1").await.unwrap();

        let err = ledger.redeem("user-1", 11, "discount").await.unwrap_err();
        match err {
            crate::error::DbError::Domain(CoreError::InsufficientPoints {
                balance,
                requested,
                ..
            }) => {
                assert_eq!(balance, 10);
                assert_eq!(requested, 11);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Nothing was written.
        assert_eq!(ledger.balance("user-1").await.unwrap(), 10);
        assert_eq!(ledger.history("user-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_redeem_with_no_history() {
        let (_db, ledger) = ledger().await;

        let err = ledger.redeem("nobody", 1, "discount").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::DbError::Domain(CoreError::InsufficientPoints { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amounts() {
        let (_db, ledger) = ledger().await;

        assert!(ledger.earn("user-1", 0, "r").await.is_err());
        assert!(ledger.earn("user-1", -5, "r").await.is_err());
        assert!(ledger.redeem("user-1", 0, "r").await.is_err());
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let (_db, ledger) = ledger().await;
        ledger.earn("user-1", 1, "first").await.unwrap();
        ledger.earn("user-1", 2, "second").await.unwrap();
        ledger.earn("user-1", 3, "third").await.unwrap();

        let history = ledger.history("user-1").await.unwrap();
        let reasons: Vec<&str> = history.iter().map(|t| t.reason.as_str()).collect();
        assert_eq!(reasons, vec!["third", "second", "first"]);
    }
}
