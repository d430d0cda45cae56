//! This module defines the `ActionsRepository` trait, which provides an interface
//! for the action ledger: one row per (user, agent, kind), inserted or deleted,
//! never updated.
use agent_hunt_shared::types::{ActionKind, ActionRecord, ActionTally, AgentId, IdentityId, VoterAction};
use chrono::{DateTime, Utc};

use crate::errors::RepositoryError;

/// A trait that defines the interface for interacting with the action ledger.
///
/// Uniqueness of (user, agent, kind) is enforced by the store itself; callers
/// never need to lock.
#[async_trait::async_trait]
pub trait ActionsRepository: Send + Sync {
    /// Fetches the active action of `kind` for the pair, if any.
    async fn find_action(
        &self,
        kind: ActionKind,
        user_id: IdentityId,
        agent_id: AgentId,
    ) -> Result<Option<ActionRecord>, RepositoryError>;

    /// Inserts a ledger row.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(row))` - The row was inserted
    /// * `Ok(None)` - A row for the same (user, agent, kind) already exists;
    ///   nothing was written
    /// * `Err(RepositoryError)` - Storage failure
    async fn insert_action(
        &self,
        action: &ActionRecord,
    ) -> Result<Option<ActionRecord>, RepositoryError>;

    /// Deletes the row for (user, agent, kind). Returns whether a row was removed.
    async fn delete_action(
        &self,
        kind: ActionKind,
        user_id: IdentityId,
        agent_id: AgentId,
    ) -> Result<bool, RepositoryError>;

    /// Fetches every action on the given agents, joined with the acting
    /// user's address, most recent first.
    async fn list_actions_for_agents(
        &self,
        agent_ids: &[AgentId],
    ) -> Result<Vec<VoterAction>, RepositoryError>;

    /// Returns which of `agent_ids` the user holds an action of `kind` on.
    async fn find_user_action_agent_ids(
        &self,
        kind: ActionKind,
        user_id: IdentityId,
        agent_ids: &[AgentId],
    ) -> Result<Vec<AgentId>, RepositoryError>;

    /// Counts the user's rows created at or after `since`, per kind.
    async fn count_user_actions_since(
        &self,
        user_id: IdentityId,
        since: DateTime<Utc>,
    ) -> Result<ActionTally, RepositoryError>;

    /// Counts all rows on an agent, per kind.
    async fn count_agent_actions(&self, agent_id: AgentId) -> Result<ActionTally, RepositoryError>;
}
