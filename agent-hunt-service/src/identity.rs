use std::sync::Arc;

use agent_hunt_repository::IdentitiesRepository;
use agent_hunt_shared::types::Identity;
use chrono::Utc;

use crate::errors::ServiceError;

/// Maps wallet addresses to identities.
///
/// Possession of an address string is the only proof of identity; no
/// signature is checked.
#[derive(Clone)]
pub struct IdentityResolver {
    identities: Arc<dyn IdentitiesRepository>,
}

impl IdentityResolver {
    pub fn new(identities: Arc<dyn IdentitiesRepository>) -> Self {
        Self { identities }
    }

    /// Returns the identity for `address`, creating it on first sight.
    ///
    /// # Errors
    ///
    /// * `ServiceError::Unauthenticated` - if the address is absent or blank
    pub async fn resolve(&self, address: Option<&str>) -> Result<Identity, ServiceError> {
        let address = normalize(address).ok_or(ServiceError::Unauthenticated)?;
        Ok(self.identities.upsert_identity(address, Utc::now()).await?)
    }

    /// Looks up an identity without creating one. Blank addresses resolve to `None`.
    pub async fn lookup(&self, address: Option<&str>) -> Result<Option<Identity>, ServiceError> {
        match normalize(address) {
            Some(address) => Ok(self.identities.find_identity(address).await?),
            None => Ok(None),
        }
    }
}

fn normalize(address: Option<&str>) -> Option<&str> {
    address.map(str::trim).filter(|address| !address.is_empty())
}
