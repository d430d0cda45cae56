use std::sync::Arc;

use agent_hunt_repository::{
    ActionsRepository, AgentsRepository, IdentitiesRepository, InMemoryStore, Repositories,
};
use agent_hunt_shared::types::{ActionKind, ActionRecord, Agent, AgentId, Identity, NewAgent, Skill};
use blob_store::MockBlobStore;
use chrono::{DateTime, Utc};

use crate::{LimitsConfig, ServiceConfig, Services};

/// Services over an in-memory store, with handles for seeding and inspection.
pub(crate) struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub blobs: Arc<MockBlobStore>,
    pub services: Services,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_limits(limits: LimitsConfig) -> Self {
        Self::with_config(ServiceConfig {
            limits,
            ..ServiceConfig::default()
        })
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let blobs = Arc::new(MockBlobStore::default());
        let services = Services::new(Repositories::from_store(store.clone()), blobs.clone(), config)
            .expect("default site url is valid");
        Self {
            store,
            blobs,
            services,
        }
    }

    pub async fn identity(&self, address: &str) -> Identity {
        self.store.upsert_identity(address, Utc::now()).await.unwrap()
    }

    pub async fn seed_agent(&self, author: &str) -> Agent {
        self.seed_agent_at(author, Utc::now()).await
    }

    pub async fn seed_agent_at(&self, author: &str, created_at: DateTime<Utc>) -> Agent {
        let author = self.identity(author).await;
        self.store
            .insert_agent(&NewAgent {
                name: format!("agent by {}", author.address),
                avatar_url: "http://localhost/blobs/avatars/seed.png".to_string(),
                url: "https://agent.example.com".to_string(),
                description: "Seeded agent".to_string(),
                why_hunt: "Testing".to_string(),
                skill: Skill::Automation,
                other_skill_detail: None,
                author_id: author.id,
                created_at,
            })
            .await
            .unwrap()
    }

    /// Writes a ledger row directly, bypassing validation and quotas.
    pub async fn seed_action(
        &self,
        user: &Identity,
        agent_id: AgentId,
        kind: ActionKind,
        created_at: DateTime<Utc>,
    ) -> ActionRecord {
        self.store
            .insert_action(&ActionRecord {
                user_id: user.id,
                agent_id,
                kind,
                reason: None,
                created_at,
            })
            .await
            .unwrap()
            .expect("action was not already active")
    }
}
