//! # Pricing Rule Repository
//!
//! Persistence for the rule engine. The repository only loads candidate
//! rows; applicability and winner selection are pure functions in
//! `checkout_core::pricing` so they can be tested without a database.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use checkout_core::validation::validate_rule;
use checkout_core::{CoreError, PricingRule};

const SELECT_RULE: &str = r#"
    SELECT id, applies_to_all, special_day, start_time, end_time,
           start_date, end_date, condition_filter, multiplier_bps,
           fixed_price_cents, priority, created_at
    FROM pricing_rules
"#;

/// Repository for pricing rule storage and candidate lookup.
#[derive(Debug, Clone)]
pub struct PricingRuleRepository {
    pool: SqlitePool,
}

impl PricingRuleRepository {
    /// Creates a new PricingRuleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PricingRuleRepository { pool }
    }

    /// Gets a rule by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PricingRule>> {
        let rule = sqlx::query_as::<_, PricingRule>(&format!("{SELECT_RULE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rule)
    }

    /// Inserts a new rule after validating its shape.
    pub async fn insert(&self, rule: &PricingRule) -> DbResult<()> {
        validate_rule(rule).map_err(CoreError::from)?;

        debug!(rule_id = %rule.id, priority = %rule.priority, "Inserting pricing rule");

        sqlx::query(
            r#"
            INSERT INTO pricing_rules (
                id, applies_to_all, special_day, start_time, end_time,
                start_date, end_date, condition_filter, multiplier_bps,
                fixed_price_cents, priority, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&rule.id)
        .bind(rule.applies_to_all)
        .bind(&rule.special_day)
        .bind(rule.start_time)
        .bind(rule.end_time)
        .bind(rule.start_date)
        .bind(rule.end_date)
        .bind(&rule.condition_filter)
        .bind(rule.multiplier_bps)
        .bind(rule.fixed_price_cents)
        .bind(rule.priority)
        .bind(rule.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Associates a non-global rule with a product.
    pub async fn associate(&self, rule_id: &str, product_id: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO pricing_rule_products (rule_id, product_id)
            VALUES (?1, ?2)
            "#,
        )
        .bind(rule_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads the candidate rules for a product: global rules plus the rules
    /// associated with it. Applicability is decided later, in core.
    pub async fn candidates_for_product(&self, product_id: &str) -> DbResult<Vec<PricingRule>> {
        let rules = sqlx::query_as::<_, PricingRule>(&format!(
            r#"
            {SELECT_RULE}
            WHERE applies_to_all = 1
               OR id IN (
                   SELECT rule_id FROM pricing_rule_products
                   WHERE product_id = ?1
               )
            "#
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    /// Deletes a rule (associations cascade).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM pricing_rules WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::DbError::not_found("PricingRule", id));
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
    use chrono::Utc;

    fn rule(id: &str, applies_to_all: bool, priority: i64) -> PricingRule {
        PricingRule {
            id: id.to_string(),
            applies_to_all,
            special_day: None,
            start_time: None,
            end_time: None,
            start_date: None,
            end_date: None,
            condition_filter: None,
            multiplier_bps: 9000,
            fixed_price_cents: None,
            priority,
            created_at: Utc::now(),
        }
    }

    async fn db_with_product() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: "p1".to_string(),
                name: "Widget".to_string(),
                base_price_cents: 100,
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
    async fn test_candidates_include_global_and_associated() {
        let db = db_with_product().await;
        let repo = db.pricing_rules();

        repo.insert(&rule("global", true, 1)).await.unwrap();
        repo.insert(&rule("scoped", false, 2)).await.unwrap();
        repo.insert(&rule("other", false, 3)).await.unwrap();
        repo.associate("scoped", "p1").await.unwrap();

        let mut ids: Vec<String> = repo
            .candidates_for_product("p1")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        ids.sort();

        assert_eq!(ids, vec!["global".to_string(), "scoped".to_string()]);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_rule() {
        let db = db_with_product().await;
        let repo = db.pricing_rules();

        let mut bad = rule("bad", true, 1);
        bad.fixed_price_cents = Some(0);
        assert!(repo.insert(&bad).await.is_err());

        let mut bad = rule("bad2", true, 1);
        bad.multiplier_bps = -1;
        assert!(repo.insert(&bad).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_cascades_associations() {
        let db = db_with_product().await;
        let repo = db.pricing_rules();

        repo.insert(&rule("r1", false, 1)).await.unwrap();
        repo.associate("r1", "p1").await.unwrap();
        repo.delete("r1").await.unwrap();

        assert!(repo.candidates_for_product("p1").await.unwrap().is_empty());
    }
}
