//! In-memory implementation of the repositories.
//!
//! `InMemoryStore` implements all three repository traits over one shared
//! state, so tests and local development can run without a database. It
//! keeps the same contract as the PostgreSQL backend: ledger rows are keyed
//! by (user, agent, kind) and a duplicate insert is rejected atomically
//! under the store's write lock.

use std::collections::{BTreeMap, HashMap};

use agent_hunt_shared::types::{
    ActionKind, ActionRecord, ActionTally, Agent, AgentId, AgentWithAuthor, Identity, IdentityId,
    NewAgent, SortBy, VoterAction,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{ActionsRepository, AgentsRepository, IdentitiesRepository, RepositoryError};

type ActionKey = (IdentityId, AgentId, ActionKind);

#[derive(Default)]
struct State {
    identities: BTreeMap<IdentityId, Identity>,
    identity_by_address: HashMap<String, IdentityId>,
    agents: BTreeMap<AgentId, Agent>,
    actions: BTreeMap<ActionKey, ActionRecord>,
    next_identity_id: IdentityId,
    next_agent_id: AgentId,
}

impl State {
    fn address_of(&self, id: IdentityId) -> String {
        self.identities
            .get(&id)
            .map(|identity| identity.address.clone())
            .unwrap_or_default()
    }

    fn upvote_count(&self, agent_id: AgentId) -> i64 {
        self.actions
            .keys()
            .filter(|(_, a, kind)| *a == agent_id && *kind == ActionKind::Upvote)
            .count() as i64
    }

    fn with_author(&self, agent: &Agent) -> AgentWithAuthor {
        AgentWithAuthor {
            agent: agent.clone(),
            author_address: self.address_of(agent.author_id),
            upvote_count: self.upvote_count(agent.id),
        }
    }
}

/// Shared in-memory store for identities, agents and the action ledger.
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_identity_id: 1,
                next_agent_id: 1,
                ..State::default()
            }),
        }
    }

    /// Number of ledger rows for (user, agent, kind); always 0 or 1.
    pub async fn action_row_count(&self, kind: ActionKind, user_id: IdentityId, agent_id: AgentId) -> usize {
        let state = self.state.read().await;
        usize::from(state.actions.contains_key(&(user_id, agent_id, kind)))
    }

    /// Total number of ledger rows on an agent for `kind`.
    pub async fn agent_action_rows(&self, kind: ActionKind, agent_id: AgentId) -> usize {
        let state = self.state.read().await;
        state
            .actions
            .keys()
            .filter(|(_, a, k)| *a == agent_id && *k == kind)
            .count()
    }

    /// Number of stored agents.
    pub async fn agent_count(&self) -> usize {
        self.state.read().await.agents.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentitiesRepository for InMemoryStore {
    async fn upsert_identity(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, RepositoryError> {
        let mut state = self.state.write().await;
        if let Some(id) = state.identity_by_address.get(address).copied() {
            if let Some(identity) = state.identities.get(&id) {
                return Ok(identity.clone());
            }
        }

        let id = state.next_identity_id;
        state.next_identity_id += 1;
        let identity = Identity {
            id,
            address: address.to_string(),
            created_at: now,
        };
        state.identity_by_address.insert(address.to_string(), id);
        state.identities.insert(id, identity.clone());
        Ok(identity)
    }

    async fn find_identity(&self, address: &str) -> Result<Option<Identity>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .identity_by_address
            .get(address)
            .and_then(|id| state.identities.get(id))
            .cloned())
    }
}

#[async_trait]
impl AgentsRepository for InMemoryStore {
    async fn insert_agent(&self, agent: &NewAgent) -> Result<Agent, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.identities.contains_key(&agent.author_id) {
            return Err(RepositoryError::MissingReference(format!("identity {}", agent.author_id)));
        }

        let id = state.next_agent_id;
        state.next_agent_id += 1;
        let stored = Agent {
            id,
            name: agent.name.clone(),
            avatar_url: agent.avatar_url.clone(),
            url: agent.url.clone(),
            description: agent.description.clone(),
            why_hunt: agent.why_hunt.clone(),
            skill: agent.skill,
            other_skill_detail: agent.other_skill_detail.clone(),
            author_id: agent.author_id,
            created_at: agent.created_at,
        };
        state.agents.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_agent(&self, id: AgentId) -> Result<Option<AgentWithAuthor>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.agents.get(&id).map(|agent| state.with_author(agent)))
    }

    async fn agent_exists(&self, id: AgentId) -> Result<bool, RepositoryError> {
        Ok(self.state.read().await.agents.contains_key(&id))
    }

    async fn list_agents(
        &self,
        sort_by: SortBy,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AgentWithAuthor>, RepositoryError> {
        let state = self.state.read().await;
        let mut listed: Vec<AgentWithAuthor> = state.agents.values().map(|agent| state.with_author(agent)).collect();

        let recency = |a: &AgentWithAuthor, b: &AgentWithAuthor| {
            b.agent
                .created_at
                .cmp(&a.agent.created_at)
                .then_with(|| b.agent.id.cmp(&a.agent.id))
        };
        match sort_by {
            SortBy::New => listed.sort_by(recency),
            SortBy::Top => listed.sort_by(|a, b| b.upvote_count.cmp(&a.upvote_count).then_with(|| recency(a, b))),
        }

        Ok(listed
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_agents_by_author_since(
        &self,
        author_id: IdentityId,
        since: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .agents
            .values()
            .filter(|agent| agent.author_id == author_id && agent.created_at >= since)
            .count() as i64)
    }
}

#[async_trait]
impl ActionsRepository for InMemoryStore {
    async fn find_action(
        &self,
        kind: ActionKind,
        user_id: IdentityId,
        agent_id: AgentId,
    ) -> Result<Option<ActionRecord>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.actions.get(&(user_id, agent_id, kind)).cloned())
    }

    async fn insert_action(
        &self,
        action: &ActionRecord,
    ) -> Result<Option<ActionRecord>, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.identities.contains_key(&action.user_id) {
            return Err(RepositoryError::MissingReference(format!("identity {}", action.user_id)));
        }
        if !state.agents.contains_key(&action.agent_id) {
            return Err(RepositoryError::MissingReference(format!("agent {}", action.agent_id)));
        }

        let key = (action.user_id, action.agent_id, action.kind);
        if state.actions.contains_key(&key) {
            return Ok(None);
        }
        state.actions.insert(key, action.clone());
        Ok(Some(action.clone()))
    }

    async fn delete_action(
        &self,
        kind: ActionKind,
        user_id: IdentityId,
        agent_id: AgentId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.actions.remove(&(user_id, agent_id, kind)).is_some())
    }

    async fn list_actions_for_agents(
        &self,
        agent_ids: &[AgentId],
    ) -> Result<Vec<VoterAction>, RepositoryError> {
        let state = self.state.read().await;
        let mut actions: Vec<VoterAction> = state
            .actions
            .values()
            .filter(|record| agent_ids.contains(&record.agent_id))
            .map(|record| VoterAction {
                record: record.clone(),
                voter_address: state.address_of(record.user_id),
            })
            .collect();
        actions.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then_with(|| b.record.user_id.cmp(&a.record.user_id))
        });
        Ok(actions)
    }

    async fn find_user_action_agent_ids(
        &self,
        kind: ActionKind,
        user_id: IdentityId,
        agent_ids: &[AgentId],
    ) -> Result<Vec<AgentId>, RepositoryError> {
        let state = self.state.read().await;
        Ok(agent_ids
            .iter()
            .copied()
            .filter(|agent_id| state.actions.contains_key(&(user_id, *agent_id, kind)))
            .collect())
    }

    async fn count_user_actions_since(
        &self,
        user_id: IdentityId,
        since: DateTime<Utc>,
    ) -> Result<ActionTally, RepositoryError> {
        let state = self.state.read().await;
        let mut tally = ActionTally::default();
        for record in state.actions.values() {
            if record.user_id == user_id && record.created_at >= since {
                tally.add(record.kind, 1);
            }
        }
        Ok(tally)
    }

    async fn count_agent_actions(&self, agent_id: AgentId) -> Result<ActionTally, RepositoryError> {
        let state = self.state.read().await;
        let mut tally = ActionTally::default();
        for record in state.actions.values().filter(|record| record.agent_id == agent_id) {
            tally.add(record.kind, 1);
        }
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_hunt_shared::types::Skill;
    use chrono::Duration;
    use std::sync::Arc;

    fn new_agent(author_id: IdentityId, name: &str, created_at: DateTime<Utc>) -> NewAgent {
        NewAgent {
            name: name.to_string(),
            avatar_url: "https://cdn.example.com/a.png".to_string(),
            url: "https://example.com".to_string(),
            description: "desc".to_string(),
            why_hunt: "why".to_string(),
            skill: Skill::Trading,
            other_skill_detail: None,
            author_id,
            created_at,
        }
    }

    fn record(kind: ActionKind, user_id: IdentityId, agent_id: AgentId, created_at: DateTime<Utc>) -> ActionRecord {
        ActionRecord {
            user_id,
            agent_id,
            kind,
            reason: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_upsert_identity_is_stable() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let first = store.upsert_identity("0xAbC", now).await.unwrap();
        let second = store.upsert_identity("0xAbC", now + Duration::hours(1)).await.unwrap();
        let other_case = store.upsert_identity("0xabc", now).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.created_at, now);
        assert_ne!(first.id, other_case.id);
        assert!(store.find_identity("0xnobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let user = store.upsert_identity("0x1", now).await.unwrap();
        let agent = store.insert_agent(&new_agent(user.id, "a", now)).await.unwrap();

        let row = record(ActionKind::Upvote, user.id, agent.id, now);
        assert!(store.insert_action(&row).await.unwrap().is_some());
        assert!(store.insert_action(&row).await.unwrap().is_none());
        assert_eq!(store.action_row_count(ActionKind::Upvote, user.id, agent.id).await, 1);

        // Other kinds on the same pair are independent.
        let spam = record(ActionKind::SpamFlag, user.id, agent.id, now);
        assert!(store.insert_action(&spam).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_keep_one_row() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let user = store.upsert_identity("0x1", now).await.unwrap();
        let agent = store.insert_agent(&new_agent(user.id, "a", now)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let row = record(ActionKind::Upvote, user.id, agent.id, now);
            handles.push(tokio::spawn(async move { store.insert_action(&row).await.unwrap().is_some() }));
        }
        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.action_row_count(ActionKind::Upvote, user.id, agent.id).await, 1);
    }

    #[tokio::test]
    async fn test_insert_action_requires_existing_agent() {
        let store = InMemoryStore::new();
        let user = store.upsert_identity("0x1", Utc::now()).await.unwrap();
        let result = store.insert_action(&record(ActionKind::Upvote, user.id, 99, Utc::now())).await;
        assert!(matches!(result, Err(RepositoryError::MissingReference(_))));
    }

    #[tokio::test]
    async fn test_list_orders_by_upvotes_then_recency() {
        let store = InMemoryStore::new();
        let base = Utc::now() - Duration::hours(3);
        let author = store.upsert_identity("0xauthor", base).await.unwrap();
        let voter = store.upsert_identity("0xvoter", base).await.unwrap();

        let oldest = store.insert_agent(&new_agent(author.id, "oldest", base)).await.unwrap();
        let middle = store.insert_agent(&new_agent(author.id, "middle", base + Duration::hours(1))).await.unwrap();
        let newest = store.insert_agent(&new_agent(author.id, "newest", base + Duration::hours(2))).await.unwrap();

        store.insert_action(&record(ActionKind::Upvote, voter.id, oldest.id, base)).await.unwrap();

        let by_new: Vec<AgentId> = store
            .list_agents(SortBy::New, 10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.agent.id)
            .collect();
        assert_eq!(by_new, vec![newest.id, middle.id, oldest.id]);

        let by_top = store.list_agents(SortBy::Top, 10, 0).await.unwrap();
        let ids: Vec<AgentId> = by_top.iter().map(|a| a.agent.id).collect();
        assert_eq!(ids, vec![oldest.id, newest.id, middle.id]);
        assert_eq!(by_top[0].upvote_count, 1);
        assert_eq!(by_top[0].author_address, "0xauthor");

        let window = store.list_agents(SortBy::New, 1, 1).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].agent.id, middle.id);
    }

    #[tokio::test]
    async fn test_count_user_actions_respects_window() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let user = store.upsert_identity("0x1", now).await.unwrap();
        let a = store.insert_agent(&new_agent(user.id, "a", now)).await.unwrap();
        let b = store.insert_agent(&new_agent(user.id, "b", now)).await.unwrap();

        store.insert_action(&record(ActionKind::Upvote, user.id, a.id, now - Duration::hours(30))).await.unwrap();
        store.insert_action(&record(ActionKind::Upvote, user.id, b.id, now)).await.unwrap();
        store.insert_action(&record(ActionKind::SpamFlag, user.id, b.id, now)).await.unwrap();

        let tally = store.count_user_actions_since(user.id, now - Duration::hours(24)).await.unwrap();
        assert_eq!(tally.upvotes, 1);
        assert_eq!(tally.spam_flags, 1);
        assert_eq!(tally.total(), 2);
    }
}
