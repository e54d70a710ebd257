//! # Address Repository
//!
//! Minimal address surface: checkout loads the shipping address and checks
//! ownership. Address CRUD beyond that lives in a collaborator.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use checkout_core::Address;

/// Repository for address lookups.
#[derive(Debug, Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
}

impl AddressRepository {
    /// Creates a new AddressRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AddressRepository { pool }
    }

    /// Gets an address by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, line1, city, country, created_at
            FROM addresses
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    /// Gets an address owned by `user_id`, failing with NotFound when the
    /// address is absent or belongs to another user.
    ///
    /// Ownership failures look identical to absence on purpose: the caller
    /// learns nothing about other users' addresses.
    pub async fn get_owned(&self, id: &str, user_id: &str) -> DbResult<Address> {
        match self.get_by_id(id).await? {
            Some(address) if address.user_id == user_id => Ok(address),
            _ => Err(DbError::not_found("Address", id)),
        }
    }

    /// Inserts a new address.
    pub async fn insert(&self, address: &Address) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO addresses (id, user_id, line1, city, country, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&address.id)
        .bind(&address.user_id)
        .bind(&address.line1)
        .bind(&address.city)
        .bind(&address.country)
        .bind(address.created_at)
        .execute(&self.pool)
        .await?;

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
    use chrono::Utc;

    fn address(id: &str, user_id: &str) -> Address {
        Address {
            id: id.to_string(),
            user_id: user_id.to_string(),
            line1: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            country: "US".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_get_owned_enforces_ownership() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.addresses();
        repo.insert(&address("a1", "user-1")).await.unwrap();

        assert!(repo.get_owned("a1", "user-1").await.is_ok());

        let err = repo.get_owned("a1", "user-2").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = repo.get_owned("missing", "user-1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
