use agent_hunt_shared::types::Identity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{IdentitiesRepository, RepositoryError};

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: i64,
    address: String,
    created_at: DateTime<Utc>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Identity {
            id: row.id,
            address: row.address,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL implementation of the identities repository.
pub struct PostgresIdentitiesRepository {
    pool: sqlx::PgPool,
}

impl PostgresIdentitiesRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentitiesRepository for PostgresIdentitiesRepository {
    /// Upserts by address.
    ///
    /// The conflict branch rewrites `address` with the identical value so that
    /// `RETURNING` yields the existing row; no stored field changes.
    async fn upsert_identity(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            INSERT INTO identities (address, created_at)
            VALUES ($1, $2)
            ON CONFLICT (address)
            DO UPDATE SET address = EXCLUDED.address
            RETURNING id, address, created_at
            "#,
        )
        .bind(address)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_identity(&self, address: &str) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, address, created_at FROM identities WHERE address = $1",
        )
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Identity::from))
    }
}
