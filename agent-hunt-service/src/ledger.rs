//! The action ledger: upvotes, duplicate flags and spam flags as toggles.
//!
//! Each (identity, agent, kind) triple is either active (one row) or
//! inactive (no row). Applying an action flips the state. Counts shown
//! anywhere are derived from the rows, never stored.

use std::sync::Arc;

use agent_hunt_repository::{ActionsRepository, AgentsRepository};
use agent_hunt_shared::types::{
    ActionKind, ActionRecord, ActionTally, AgentId, ToggleOutcome, ViewerActions,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::identity::IdentityResolver;
use crate::rate_limiter::{QuotaKind, RateLimiter};
use crate::reason::ReasonPolicy;

pub struct ActionLedger {
    identities: IdentityResolver,
    agents: Arc<dyn AgentsRepository>,
    actions: Arc<dyn ActionsRepository>,
    limiter: Arc<RateLimiter>,
    reasons: ReasonPolicy,
}

impl ActionLedger {
    pub fn new(
        identities: IdentityResolver,
        agents: Arc<dyn AgentsRepository>,
        actions: Arc<dyn ActionsRepository>,
        limiter: Arc<RateLimiter>,
        reasons: ReasonPolicy,
    ) -> Self {
        Self {
            identities,
            agents,
            actions,
            limiter,
            reasons,
        }
    }

    async fn require_agent(&self, agent_id: AgentId) -> Result<(), ServiceError> {
        if self.agents.agent_exists(agent_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(format!("agent {agent_id}")))
        }
    }

    /// Toggles the action of `kind` by `address` on `agent_id`.
    ///
    /// An active action is removed without consulting the rate limiter or
    /// validating `reason`. An inactive one is added after reason validation
    /// and an action-quota check.
    ///
    /// # Errors
    ///
    /// * `Unauthenticated` - no address
    /// * `NotFound` - the agent does not exist
    /// * `InvalidReason` - see [`ReasonPolicy::validate`]; also a duplicate flag pointing at
    ///   itself or at an unknown agent
    /// * `QuotaExceeded` - adding would exceed the action quota
    pub async fn apply_action(
        &self,
        address: Option<&str>,
        agent_id: AgentId,
        kind: ActionKind,
        reason: Option<&str>,
    ) -> Result<ToggleOutcome, ServiceError> {
        let identity = self.identities.resolve(address).await?;
        self.require_agent(agent_id).await?;

        if self
            .actions
            .find_action(kind, identity.id, agent_id)
            .await?
            .is_some()
        {
            // a concurrent removal may already have deleted the row; the
            // state is inactive either way
            let deleted = self.actions.delete_action(kind, identity.id, agent_id).await?;
            info!(
                address = %identity.address,
                agent_id,
                %kind,
                deleted,
                "Action removed"
            );
            return Ok(ToggleOutcome::Removed);
        }

        let reason = self.reasons.validate(kind, reason)?;
        if let Some(original) = reason.original {
            if original == agent_id {
                return Err(ServiceError::invalid_reason(
                    "an agent cannot be a duplicate of itself",
                ));
            }
            if !self.agents.agent_exists(original).await? {
                return Err(ServiceError::invalid_reason(format!(
                    "duplicate link points at unknown agent {original}"
                )));
            }
        }

        self.limiter.ensure_quota(&identity, QuotaKind::Act).await?;

        let candidate = ActionRecord {
            user_id: identity.id,
            agent_id,
            kind,
            reason: reason.text,
            created_at: Utc::now(),
        };
        let action = match self.actions.insert_action(&candidate).await? {
            Some(inserted) => inserted,
            None => {
                // lost a race with a concurrent add; report the row that won
                debug!(address = %identity.address, agent_id, %kind, "Action already active");
                self.actions
                    .find_action(kind, identity.id, agent_id)
                    .await?
                    .unwrap_or(candidate)
            }
        };

        info!(address = %identity.address, agent_id, %kind, "Action added");
        Ok(ToggleOutcome::Added { action })
    }

    /// Which actions `address` currently holds on `agent_id`.
    ///
    /// An absent or unknown address holds none; no identity is created.
    pub async fn viewer_actions(
        &self,
        agent_id: AgentId,
        address: Option<&str>,
    ) -> Result<ViewerActions, ServiceError> {
        self.require_agent(agent_id).await?;

        let mut viewer = ViewerActions::default();
        let Some(identity) = self.identities.lookup(address).await? else {
            return Ok(viewer);
        };

        let (upvote, duplicate, spam) = tokio::try_join!(
            self.actions.find_action(ActionKind::Upvote, identity.id, agent_id),
            self.actions.find_action(ActionKind::DuplicateFlag, identity.id, agent_id),
            self.actions.find_action(ActionKind::SpamFlag, identity.id, agent_id),
        )?;
        viewer.set(ActionKind::Upvote, upvote.is_some());
        viewer.set(ActionKind::DuplicateFlag, duplicate.is_some());
        viewer.set(ActionKind::SpamFlag, spam.is_some());
        Ok(viewer)
    }

    /// Current per-kind totals on `agent_id`.
    pub async fn counts(&self, agent_id: AgentId) -> Result<ActionTally, ServiceError> {
        self.require_agent(agent_id).await?;
        Ok(self.actions.count_agent_actions(agent_id).await?)
    }
}
