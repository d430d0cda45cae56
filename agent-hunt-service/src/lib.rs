//! # Agent Hunt Service
//!
//! The components behind the agent hunt API: identity resolution, the action
//! ledger, per-identity rate limiting, listing queries and agent submission.
//! Each component is handed its repositories explicitly; [`Services`] wires
//! one of each over a shared set of repositories.
pub mod config;
pub mod errors;
pub mod identity;
pub mod ledger;
pub mod listing;
pub mod rate_limiter;
pub mod reason;
pub mod registry;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use agent_hunt_repository::Repositories;
use blob_store::BlobStore;

pub use config::{LimitsConfig, ListingConfig, ServiceConfig};
pub use errors::ServiceError;
pub use identity::IdentityResolver;
pub use ledger::ActionLedger;
pub use listing::ListingQueryEngine;
pub use rate_limiter::{QuotaKind, QuotaStatus, RateLimiter};
pub use reason::ReasonPolicy;
pub use registry::{AgentRegistry, AgentSubmission, AvatarUpload, MAX_AVATAR_BYTES};

/// One instance of every service component.
#[derive(Clone)]
pub struct Services {
    pub identities: IdentityResolver,
    pub limiter: Arc<RateLimiter>,
    pub ledger: Arc<ActionLedger>,
    pub listing: Arc<ListingQueryEngine>,
    pub registry: Arc<AgentRegistry>,
}

impl Services {
    /// Builds the components over `repositories` and `blobs`.
    ///
    /// # Errors
    ///
    /// * `ServiceError::Configuration` - if the site URL has no host
    pub fn new(
        repositories: Repositories,
        blobs: Arc<dyn BlobStore>,
        config: ServiceConfig,
    ) -> Result<Self, ServiceError> {
        let Repositories {
            identities,
            agents,
            actions,
        } = repositories;

        let identities = IdentityResolver::new(identities);
        let reasons = ReasonPolicy::new(&config.site_url, config.max_reason_len)?;
        let limiter = Arc::new(RateLimiter::new(
            identities.clone(),
            agents.clone(),
            actions.clone(),
            config.limits,
        ));
        let ledger = Arc::new(ActionLedger::new(
            identities.clone(),
            agents.clone(),
            actions.clone(),
            limiter.clone(),
            reasons,
        ));
        let listing = Arc::new(ListingQueryEngine::new(
            identities.clone(),
            agents.clone(),
            actions,
            config.listing,
        ));
        let registry = Arc::new(AgentRegistry::new(
            identities.clone(),
            agents,
            limiter.clone(),
            blobs,
        ));

        Ok(Self {
            identities,
            limiter,
            ledger,
            listing,
            registry,
        })
    }
}
