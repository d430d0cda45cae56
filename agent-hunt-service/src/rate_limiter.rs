use std::fmt;
use std::sync::Arc;

use agent_hunt_repository::{ActionsRepository, AgentsRepository};
use agent_hunt_shared::types::{ActivitySummary, Identity};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::config::LimitsConfig;
use crate::errors::ServiceError;
use crate::identity::IdentityResolver;

/// What a quota check is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaKind {
    /// Creating an agent listing.
    Create,
    /// Adding an upvote or a flag. Removals are never counted or checked.
    Act,
}

impl fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaKind::Create => write!(f, "creation"),
            QuotaKind::Act => write!(f, "action"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub allowed: bool,
    pub current_count: i64,
    pub limit: Option<u32>,
}

/// Per-identity quotas over a trailing window.
///
/// Counts are read from the ledger and agent rows at check time. The check
/// runs before the write it guards, so two concurrent requests at `limit - 1`
/// can both pass.
pub struct RateLimiter {
    identities: IdentityResolver,
    agents: Arc<dyn AgentsRepository>,
    actions: Arc<dyn ActionsRepository>,
    config: LimitsConfig,
}

impl RateLimiter {
    pub fn new(
        identities: IdentityResolver,
        agents: Arc<dyn AgentsRepository>,
        actions: Arc<dyn ActionsRepository>,
        config: LimitsConfig,
    ) -> Self {
        Self {
            identities,
            agents,
            actions,
            config,
        }
    }

    fn window_start(&self) -> DateTime<Utc> {
        Utc::now() - self.config.window
    }

    fn limit_for(&self, kind: QuotaKind) -> Option<u32> {
        match kind {
            QuotaKind::Create => self.config.creation_quota,
            QuotaKind::Act => self.config.action_quota,
        }
    }

    async fn count_in_window(&self, identity: &Identity, kind: QuotaKind) -> Result<i64, ServiceError> {
        let since = self.window_start();
        let count = match kind {
            QuotaKind::Create => {
                self.agents
                    .count_agents_by_author_since(identity.id, since)
                    .await?
            }
            QuotaKind::Act => {
                self.actions
                    .count_user_actions_since(identity.id, since)
                    .await?
                    .total()
            }
        };
        Ok(count)
    }

    /// Reports whether `identity` may perform one more operation of `kind`.
    ///
    /// `allowed` is `current_count < limit`; a disabled quota always allows.
    pub async fn check_quota(
        &self,
        identity: &Identity,
        kind: QuotaKind,
    ) -> Result<QuotaStatus, ServiceError> {
        let limit = self.limit_for(kind);
        let Some(max) = limit else {
            return Ok(QuotaStatus {
                allowed: true,
                current_count: 0,
                limit,
            });
        };

        let current_count = self.count_in_window(identity, kind).await?;
        Ok(QuotaStatus {
            allowed: current_count < i64::from(max),
            current_count,
            limit,
        })
    }

    /// Like [`check_quota`](Self::check_quota) but fails with
    /// `ServiceError::QuotaExceeded` when the operation is not allowed.
    pub async fn ensure_quota(
        &self,
        identity: &Identity,
        kind: QuotaKind,
    ) -> Result<QuotaStatus, ServiceError> {
        let status = self.check_quota(identity, kind).await?;
        match status.limit {
            Some(limit) if !status.allowed => {
                warn!(
                    address = %identity.address,
                    %kind,
                    current = status.current_count,
                    limit,
                    "Quota exceeded"
                );
                Err(ServiceError::QuotaExceeded {
                    kind,
                    current: status.current_count,
                    limit,
                })
            }
            _ => Ok(status),
        }
    }

    /// Returns the window counts for `address` without creating an identity.
    ///
    /// An unknown address has zero activity.
    pub async fn activity(&self, address: Option<&str>) -> Result<ActivitySummary, ServiceError> {
        let mut summary = ActivitySummary {
            creation_limit: self.config.creation_quota,
            action_limit: self.config.action_quota,
            ..ActivitySummary::default()
        };

        let Some(identity) = self.identities.lookup(address).await? else {
            return Ok(summary);
        };

        let since = self.window_start();
        let (creation_count, tally) = tokio::try_join!(
            self.agents.count_agents_by_author_since(identity.id, since),
            self.actions.count_user_actions_since(identity.id, since),
        )?;
        summary.creation_count = creation_count;
        summary.total_action_count = tally.total();
        Ok(summary)
    }
}
