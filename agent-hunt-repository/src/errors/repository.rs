//! Error types for the repositories.
//! Defines specific errors that can occur during storage operations on
//! identities, agents and ledger actions.
use thiserror::Error;

/// Represents errors that can occur within the repositories.
///
/// This enum consolidates storage failures and rows that cannot be decoded
/// back into domain types.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid action kind: {0}")]
    InvalidActionKind(i16),

    #[error("Invalid skill: {0}")]
    InvalidSkill(String),

    #[error("Missing reference: {0}")]
    MissingReference(String),
}
