//! Integration tests for the PostgreSQL repositories.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `cargo test --test postgres_integration`

use agent_hunt_repository::{
    ActionsRepository, AgentsRepository, IdentitiesRepository, PostgresActionsRepository,
    PostgresAgentsRepository, PostgresIdentitiesRepository,
};
use agent_hunt_shared::types::{ActionKind, ActionRecord, Agent, Identity, NewAgent, Skill, SortBy};
use chrono::{DateTime, Duration, Utc};
use sqlx::Row;

struct Fixture {
    identities: PostgresIdentitiesRepository,
    agents: PostgresAgentsRepository,
    actions: PostgresActionsRepository,
}

impl Fixture {
    fn new(pool: &sqlx::PgPool) -> Self {
        Self {
            identities: PostgresIdentitiesRepository::new(pool.clone()),
            agents: PostgresAgentsRepository::new(pool.clone()),
            actions: PostgresActionsRepository::new(pool.clone()),
        }
    }

    async fn identity(&self, address: &str) -> Identity {
        self.identities.upsert_identity(address, Utc::now()).await.unwrap()
    }

    async fn agent(&self, author: &Identity, name: &str, created_at: DateTime<Utc>) -> Agent {
        self.agents
            .insert_agent(&NewAgent {
                name: name.to_string(),
                avatar_url: format!("https://cdn.example.com/avatars/{name}.png"),
                url: "https://example.com".to_string(),
                description: "An agent".to_string(),
                why_hunt: "It works".to_string(),
                skill: Skill::Other,
                other_skill_detail: Some("Poetry".to_string()),
                author_id: author.id,
                created_at,
            })
            .await
            .unwrap()
    }
}

fn make_action(kind: ActionKind, user: &Identity, agent: &Agent, reason: Option<&str>) -> ActionRecord {
    ActionRecord {
        user_id: user.id,
        agent_id: agent.id,
        kind,
        reason: reason.map(str::to_string),
        created_at: Utc::now(),
    }
}

// ============================================================================
// Identities Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_upsert_identity_never_overwrites(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let created_at = Utc::now() - Duration::days(3);

    let first = fixture.identities.upsert_identity("0xAbC", created_at).await.unwrap();
    let again = fixture.identities.upsert_identity("0xAbC", Utc::now()).await.unwrap();

    assert_eq!(first.id, again.id);
    assert_eq!(again.created_at.timestamp(), created_at.timestamp());

    let rows = sqlx::query("SELECT COUNT(*) AS count FROM identities")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows.get::<i64, _>("count"), 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_addresses_are_case_sensitive(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let upper = fixture.identity("0xABC").await;
    let lower = fixture.identity("0xabc").await;

    assert_ne!(upper.id, lower.id);
    assert!(fixture.identities.find_identity("0xAbc").await.unwrap().is_none());
}

// ============================================================================
// Agents Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_insert_and_get_agent(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let author = fixture.identity("0xauthor").await;
    let agent = fixture.agent(&author, "scout", Utc::now()).await;

    let fetched = fixture.agents.get_agent(agent.id).await.unwrap().unwrap();
    assert_eq!(fetched.agent.name, "scout");
    assert_eq!(fetched.agent.skill, Skill::Other);
    assert_eq!(fetched.agent.other_skill_detail.as_deref(), Some("Poetry"));
    assert_eq!(fetched.author_address, "0xauthor");
    assert_eq!(fetched.upvote_count, 0);

    assert!(fixture.agents.agent_exists(agent.id).await.unwrap());
    assert!(!fixture.agents.agent_exists(agent.id + 1000).await.unwrap());
    assert!(fixture.agents.get_agent(agent.id + 1000).await.unwrap().is_none());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_list_agents_orderings(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let author = fixture.identity("0xauthor").await;
    let voter = fixture.identity("0xvoter").await;
    let base = Utc::now() - Duration::hours(5);

    let first = fixture.agent(&author, "first", base).await;
    let second = fixture.agent(&author, "second", base + Duration::hours(1)).await;
    let third = fixture.agent(&author, "third", base + Duration::hours(2)).await;

    fixture
        .actions
        .insert_action(&make_action(ActionKind::Upvote, &voter, &first, Some("great bot")))
        .await
        .unwrap();

    let by_new: Vec<i64> = fixture
        .agents
        .list_agents(SortBy::New, 10, 0)
        .await
        .unwrap()
        .iter()
        .map(|a| a.agent.id)
        .collect();
    assert_eq!(by_new, vec![third.id, second.id, first.id]);

    let by_top = fixture.agents.list_agents(SortBy::Top, 10, 0).await.unwrap();
    let ids: Vec<i64> = by_top.iter().map(|a| a.agent.id).collect();
    assert_eq!(ids, vec![first.id, third.id, second.id]);
    assert_eq!(by_top[0].upvote_count, 1);

    let window = fixture.agents.list_agents(SortBy::New, 2, 2).await.unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].agent.id, first.id);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_count_agents_by_author_since(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let author = fixture.identity("0xauthor").await;
    let now = Utc::now();

    fixture.agent(&author, "old", now - Duration::hours(30)).await;
    fixture.agent(&author, "recent", now - Duration::hours(1)).await;

    let count = fixture
        .agents
        .count_agents_by_author_since(author.id, now - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(count, 1);
}

// ============================================================================
// Ledger Tests
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_insert_find_delete_action(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let user = fixture.identity("0xuser").await;
    let agent = fixture.agent(&user, "scout", Utc::now()).await;

    let action = make_action(ActionKind::Upvote, &user, &agent, Some("great bot"));
    let inserted = fixture.actions.insert_action(&action).await.unwrap().unwrap();
    assert_eq!(inserted.reason.as_deref(), Some("great bot"));

    let found = fixture
        .actions
        .find_action(ActionKind::Upvote, user.id, agent.id)
        .await
        .unwrap();
    assert!(found.is_some());

    assert!(fixture.actions.delete_action(ActionKind::Upvote, user.id, agent.id).await.unwrap());
    assert!(!fixture.actions.delete_action(ActionKind::Upvote, user.id, agent.id).await.unwrap());
    assert!(
        fixture
            .actions
            .find_action(ActionKind::Upvote, user.id, agent.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_duplicate_insert_returns_none(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let user = fixture.identity("0xuser").await;
    let agent = fixture.agent(&user, "scout", Utc::now()).await;

    let action = make_action(ActionKind::SpamFlag, &user, &agent, None);
    assert!(fixture.actions.insert_action(&action).await.unwrap().is_some());
    assert!(fixture.actions.insert_action(&action).await.unwrap().is_none());

    let rows = sqlx::query("SELECT COUNT(*) AS count FROM agent_actions WHERE user_id = $1 AND agent_id = $2")
        .bind(user.id)
        .bind(agent.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows.get::<i64, _>("count"), 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_primary_key_rejects_raw_duplicate(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let user = fixture.identity("0xuser").await;
    let agent = fixture.agent(&user, "scout", Utc::now()).await;

    let insert = "INSERT INTO agent_actions (user_id, agent_id, kind) VALUES ($1, $2, 0)";
    sqlx::query(insert).bind(user.id).bind(agent.id).execute(&pool).await.unwrap();
    let second = sqlx::query(insert).bind(user.id).bind(agent.id).execute(&pool).await;

    assert!(second.is_err());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_list_actions_for_agents_joins_addresses(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let author = fixture.identity("0xauthor").await;
    let alice = fixture.identity("0xalice").await;
    let bob = fixture.identity("0xbob").await;
    let agent = fixture.agent(&author, "scout", Utc::now()).await;
    let other = fixture.agent(&author, "other", Utc::now()).await;

    let mut early = make_action(ActionKind::Upvote, &alice, &agent, Some("first"));
    early.created_at = Utc::now() - Duration::minutes(10);
    fixture.actions.insert_action(&early).await.unwrap();
    fixture
        .actions
        .insert_action(&make_action(ActionKind::Upvote, &bob, &agent, Some("second")))
        .await
        .unwrap();
    fixture
        .actions
        .insert_action(&make_action(ActionKind::SpamFlag, &bob, &other, None))
        .await
        .unwrap();

    let actions = fixture.actions.list_actions_for_agents(&[agent.id]).await.unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].voter_address, "0xbob");
    assert_eq!(actions[1].voter_address, "0xalice");

    assert!(fixture.actions.list_actions_for_agents(&[]).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_find_user_action_agent_ids(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let viewer = fixture.identity("0xviewer").await;
    let someone = fixture.identity("0xsomeone").await;
    let a = fixture.agent(&someone, "a", Utc::now()).await;
    let b = fixture.agent(&someone, "b", Utc::now()).await;

    fixture
        .actions
        .insert_action(&make_action(ActionKind::Upvote, &viewer, &a, Some("yes")))
        .await
        .unwrap();
    fixture
        .actions
        .insert_action(&make_action(ActionKind::Upvote, &someone, &b, Some("yes")))
        .await
        .unwrap();

    let ids = fixture
        .actions
        .find_user_action_agent_ids(ActionKind::Upvote, viewer.id, &[a.id, b.id])
        .await
        .unwrap();
    assert_eq!(ids, vec![a.id]);

    let spam_ids = fixture
        .actions
        .find_user_action_agent_ids(ActionKind::SpamFlag, viewer.id, &[a.id, b.id])
        .await
        .unwrap();
    assert!(spam_ids.is_empty());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_action_tallies(pool: sqlx::PgPool) {
    let fixture = Fixture::new(&pool);
    let user = fixture.identity("0xuser").await;
    let agent = fixture.agent(&user, "a", Utc::now()).await;
    let other = fixture.agent(&user, "b", Utc::now()).await;

    let mut stale = make_action(ActionKind::Upvote, &user, &other, Some("old"));
    stale.created_at = Utc::now() - Duration::hours(25);
    fixture.actions.insert_action(&stale).await.unwrap();
    fixture
        .actions
        .insert_action(&make_action(ActionKind::Upvote, &user, &agent, Some("new")))
        .await
        .unwrap();
    fixture
        .actions
        .insert_action(&make_action(ActionKind::DuplicateFlag, &user, &agent, Some("dup")))
        .await
        .unwrap();

    let recent = fixture
        .actions
        .count_user_actions_since(user.id, Utc::now() - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(recent.upvotes, 1);
    assert_eq!(recent.duplicate_flags, 1);
    assert_eq!(recent.total(), 2);

    let on_agent = fixture.actions.count_agent_actions(agent.id).await.unwrap();
    assert_eq!(on_agent.upvotes, 1);
    assert_eq!(on_agent.duplicate_flags, 1);
    assert_eq!(on_agent.spam_flags, 0);
}
