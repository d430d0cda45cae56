use agent_hunt_shared::types::Identity;
use chrono::{DateTime, Utc};

use crate::errors::RepositoryError;

/// Storage for wallet identities.
#[async_trait::async_trait]
pub trait IdentitiesRepository: Send + Sync {
    /// Returns the identity for `address`, creating it if absent.
    ///
    /// Never fails on an existing address and never modifies a stored row;
    /// `now` is only used as the creation time of a new identity.
    async fn upsert_identity(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, RepositoryError>;

    /// Looks up an identity without creating one.
    async fn find_identity(&self, address: &str) -> Result<Option<Identity>, RepositoryError>;
}
