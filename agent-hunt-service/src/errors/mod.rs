//! Error types for the agent hunt service.
//!
//! `ServiceError` is the single taxonomy surfaced by every component; the
//! HTTP layer maps each variant to a status code.
use agent_hunt_repository::RepositoryError;
use blob_store::BlobStoreError;
use thiserror::Error;

use crate::rate_limiter::QuotaKind;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed id, page, action, or submission field.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A reason required by the action kind is missing or malformed.
    #[error("Invalid reason: {0}")]
    InvalidReason(String),

    /// No wallet address was supplied.
    #[error("Wallet address is required")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{kind} quota exceeded: {current} of {limit} in the current window")]
    QuotaExceeded { kind: QuotaKind, current: i64, limit: u32 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Blob store error: {0}")]
    BlobStore(#[from] BlobStoreError),
}

impl ServiceError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_reason(msg: impl Into<String>) -> Self {
        Self::InvalidReason(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether the error comes from a failing collaborator rather than the caller.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Repository(_) | Self::BlobStore(_) | Self::Configuration(_)
        )
    }
}
