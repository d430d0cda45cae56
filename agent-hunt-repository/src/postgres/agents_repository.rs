use agent_hunt_shared::types::{Agent, AgentId, AgentWithAuthor, IdentityId, NewAgent, Skill, SortBy};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{AgentsRepository, RepositoryError};

const AGENT_COLUMNS: &str = "id, name, avatar_url, url, description, why_hunt, skill, other_skill_detail, author_id, created_at";

/// Agent columns joined with the author address and the derived upvote count.
///
/// The count is computed from the ledger on every read; nothing is stored.
const LISTED_AGENT_SELECT: &str = r#"
    SELECT a.id, a.name, a.avatar_url, a.url, a.description, a.why_hunt, a.skill,
           a.other_skill_detail, a.author_id, a.created_at,
           i.address AS author_address,
           (SELECT COUNT(*) FROM agent_actions x WHERE x.agent_id = a.id AND x.kind = 0) AS upvote_count
    FROM agents a
    JOIN identities i ON i.id = a.author_id
"#;

#[derive(sqlx::FromRow)]
struct AgentRow {
    id: i64,
    name: String,
    avatar_url: String,
    url: String,
    description: String,
    why_hunt: String,
    skill: String,
    other_skill_detail: Option<String>,
    author_id: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<AgentRow> for Agent {
    type Error = RepositoryError;

    fn try_from(row: AgentRow) -> Result<Self, Self::Error> {
        let skill = row
            .skill
            .parse::<Skill>()
            .map_err(|_| RepositoryError::InvalidSkill(row.skill.clone()))?;
        Ok(Agent {
            id: row.id,
            name: row.name,
            avatar_url: row.avatar_url,
            url: row.url,
            description: row.description,
            why_hunt: row.why_hunt,
            skill,
            other_skill_detail: row.other_skill_detail,
            author_id: row.author_id,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ListedAgentRow {
    #[sqlx(flatten)]
    agent: AgentRow,
    author_address: String,
    upvote_count: i64,
}

impl TryFrom<ListedAgentRow> for AgentWithAuthor {
    type Error = RepositoryError;

    fn try_from(row: ListedAgentRow) -> Result<Self, Self::Error> {
        Ok(AgentWithAuthor {
            agent: row.agent.try_into()?,
            author_address: row.author_address,
            upvote_count: row.upvote_count,
        })
    }
}

/// PostgreSQL implementation of the agents repository.
pub struct PostgresAgentsRepository {
    pool: sqlx::PgPool,
}

impl PostgresAgentsRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentsRepository for PostgresAgentsRepository {
    async fn insert_agent(&self, agent: &NewAgent) -> Result<Agent, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO agents (name, avatar_url, url, description, why_hunt, skill, other_skill_detail, author_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {AGENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AgentRow>(&query)
            .bind(&agent.name)
            .bind(&agent.avatar_url)
            .bind(&agent.url)
            .bind(&agent.description)
            .bind(&agent.why_hunt)
            .bind(agent.skill.as_str())
            .bind(&agent.other_skill_detail)
            .bind(agent.author_id)
            .bind(agent.created_at)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn get_agent(&self, id: AgentId) -> Result<Option<AgentWithAuthor>, RepositoryError> {
        let mut query_builder = sqlx::QueryBuilder::new(LISTED_AGENT_SELECT);
        query_builder.push(" WHERE a.id = ").push_bind(id);

        let row = query_builder
            .build_query_as::<ListedAgentRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(AgentWithAuthor::try_from).transpose()
    }

    async fn agent_exists(&self, id: AgentId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM agents WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Lists one window of agents.
    ///
    /// Both orderings end in `a.id DESC` so the sequence is total and offset
    /// pages never overlap or skip rows.
    async fn list_agents(
        &self,
        sort_by: SortBy,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AgentWithAuthor>, RepositoryError> {
        let mut query_builder = sqlx::QueryBuilder::new(LISTED_AGENT_SELECT);
        query_builder.push(match sort_by {
            SortBy::New => " ORDER BY a.created_at DESC, a.id DESC",
            SortBy::Top => " ORDER BY upvote_count DESC, a.created_at DESC, a.id DESC",
        });
        query_builder.push(" LIMIT ").push_bind(limit);
        query_builder.push(" OFFSET ").push_bind(offset);

        let rows = query_builder
            .build_query_as::<ListedAgentRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AgentWithAuthor::try_from).collect()
    }

    async fn count_agents_by_author_since(
        &self,
        author_id: IdentityId,
        since: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM agents WHERE author_id = $1 AND created_at >= $2",
        )
        .bind(author_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
