use agent_hunt_shared::types::{Agent, AgentId, AgentWithAuthor, IdentityId, NewAgent, SortBy};
use chrono::{DateTime, Utc};

use crate::errors::RepositoryError;

/// Storage for agent listings.
///
/// Agents are append-only: the trait exposes no update or delete.
#[async_trait::async_trait]
pub trait AgentsRepository: Send + Sync {
    /// Inserts a new agent and returns the stored row with its assigned id.
    async fn insert_agent(&self, agent: &NewAgent) -> Result<Agent, RepositoryError>;

    /// Fetches one agent joined with its author's address.
    async fn get_agent(&self, id: AgentId) -> Result<Option<AgentWithAuthor>, RepositoryError>;

    /// Returns whether an agent with `id` exists.
    async fn agent_exists(&self, id: AgentId) -> Result<bool, RepositoryError>;

    /// Lists agents in the given order.
    ///
    /// # Arguments
    ///
    /// * `sort_by` - `New` orders by `(created_at, id)` descending; `Top` orders
    ///   by upvote count, then `(created_at, id)`, all descending
    /// * `limit` - Maximum number of rows to return
    /// * `offset` - Number of rows to skip
    async fn list_agents(
        &self,
        sort_by: SortBy,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AgentWithAuthor>, RepositoryError>;

    /// Counts agents authored by `author_id` created at or after `since`.
    async fn count_agents_by_author_since(
        &self,
        author_id: IdentityId,
        since: DateTime<Utc>,
    ) -> Result<i64, RepositoryError>;
}
