//! PostgreSQL implementation of the agent hunt repositories.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - Embedded migrations through [`MIGRATOR`]
//! - Ledger uniqueness enforced by the `agent_actions` primary key, with
//!   `ON CONFLICT DO NOTHING` inserts
//! - Batch lookups over a page of agents using `= ANY($1)`
//!
//! ## Database Tables
//!
//! - `identities`: Wallet addresses, created on first sight
//! - `agents`: Immutable agent listings
//! - `agent_actions`: The action ledger (upvotes, duplicate flags, spam flags)
mod actions_repository;
mod agents_repository;
mod identities_repository;

pub use actions_repository::PostgresActionsRepository;
pub use agents_repository::PostgresAgentsRepository;
pub use identities_repository::PostgresIdentitiesRepository;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::errors::RepositoryError;

/// Migrations for the tables above, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("src/postgres/migrations");

/// Opens a connection pool against `url`.
pub async fn connect(url: &str, max_connections: u32) -> Result<sqlx::PgPool, RepositoryError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    Ok(pool)
}

/// Applies any pending migrations.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), RepositoryError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
