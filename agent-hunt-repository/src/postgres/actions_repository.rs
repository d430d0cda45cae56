use agent_hunt_shared::types::{ActionKind, ActionRecord, ActionTally, AgentId, IdentityId, VoterAction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{ActionsRepository, RepositoryError};

#[derive(sqlx::FromRow)]
struct ActionRow {
    user_id: i64,
    agent_id: i64,
    kind: i16,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ActionRow> for ActionRecord {
    type Error = RepositoryError;

    fn try_from(row: ActionRow) -> Result<Self, Self::Error> {
        Ok(ActionRecord {
            user_id: row.user_id,
            agent_id: row.agent_id,
            kind: ActionKind::try_from(row.kind).map_err(|_| RepositoryError::InvalidActionKind(row.kind))?,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VoterActionRow {
    #[sqlx(flatten)]
    action: ActionRow,
    voter_address: String,
}

#[derive(sqlx::FromRow)]
struct KindCountRow {
    kind: i16,
    count: i64,
}

fn fold_tally(rows: Vec<KindCountRow>) -> Result<ActionTally, RepositoryError> {
    let mut tally = ActionTally::default();
    for row in rows {
        let kind = ActionKind::try_from(row.kind).map_err(|_| RepositoryError::InvalidActionKind(row.kind))?;
        tally.add(kind, row.count);
    }
    Ok(tally)
}

/// PostgreSQL implementation of the action ledger.
///
/// All three action kinds live in the single `agent_actions` table keyed by
/// `(user_id, agent_id, kind)`. Toggles are plain inserts and deletes; there
/// is no stored counter to keep in step.
pub struct PostgresActionsRepository {
    pool: sqlx::PgPool,
}

impl PostgresActionsRepository {
    /// Creates a new PostgreSQL ledger over a pool with the required schema.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionsRepository for PostgresActionsRepository {
    async fn find_action(
        &self,
        kind: ActionKind,
        user_id: IdentityId,
        agent_id: AgentId,
    ) -> Result<Option<ActionRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT user_id, agent_id, kind, reason, created_at
            FROM agent_actions
            WHERE user_id = $1 AND agent_id = $2 AND kind = $3
            "#,
        )
        .bind(user_id)
        .bind(agent_id)
        .bind(kind.as_i16())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ActionRecord::try_from).transpose()
    }

    /// Inserts a ledger row, relying on the primary key for uniqueness.
    ///
    /// A concurrent insert of the same triple resolves to `ON CONFLICT DO
    /// NOTHING`, which returns no row.
    async fn insert_action(
        &self,
        action: &ActionRecord,
    ) -> Result<Option<ActionRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, ActionRow>(
            r#"
            INSERT INTO agent_actions (user_id, agent_id, kind, reason, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, agent_id, kind) DO NOTHING
            RETURNING user_id, agent_id, kind, reason, created_at
            "#,
        )
        .bind(action.user_id)
        .bind(action.agent_id)
        .bind(action.kind.as_i16())
        .bind(&action.reason)
        .bind(action.created_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ActionRecord::try_from).transpose()
    }

    async fn delete_action(
        &self,
        kind: ActionKind,
        user_id: IdentityId,
        agent_id: AgentId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM agent_actions WHERE user_id = $1 AND agent_id = $2 AND kind = $3",
        )
        .bind(user_id)
        .bind(agent_id)
        .bind(kind.as_i16())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_actions_for_agents(
        &self,
        agent_ids: &[AgentId],
    ) -> Result<Vec<VoterAction>, RepositoryError> {
        if agent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, VoterActionRow>(
            r#"
            SELECT x.user_id, x.agent_id, x.kind, x.reason, x.created_at, i.address AS voter_address
            FROM agent_actions x
            JOIN identities i ON i.id = x.user_id
            WHERE x.agent_id = ANY($1)
            ORDER BY x.created_at DESC, x.user_id DESC
            "#,
        )
        .bind(agent_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(VoterAction {
                    record: row.action.try_into()?,
                    voter_address: row.voter_address,
                })
            })
            .collect()
    }

    async fn find_user_action_agent_ids(
        &self,
        kind: ActionKind,
        user_id: IdentityId,
        agent_ids: &[AgentId],
    ) -> Result<Vec<AgentId>, RepositoryError> {
        if agent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT agent_id
            FROM agent_actions
            WHERE user_id = $1 AND kind = $2 AND agent_id = ANY($3)
            "#,
        )
        .bind(user_id)
        .bind(kind.as_i16())
        .bind(agent_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn count_user_actions_since(
        &self,
        user_id: IdentityId,
        since: DateTime<Utc>,
    ) -> Result<ActionTally, RepositoryError> {
        let rows = sqlx::query_as::<_, KindCountRow>(
            r#"
            SELECT kind, COUNT(*) AS count
            FROM agent_actions
            WHERE user_id = $1 AND created_at >= $2
            GROUP BY kind
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        fold_tally(rows)
    }

    async fn count_agent_actions(&self, agent_id: AgentId) -> Result<ActionTally, RepositoryError> {
        let rows = sqlx::query_as::<_, KindCountRow>(
            "SELECT kind, COUNT(*) AS count FROM agent_actions WHERE agent_id = $1 GROUP BY kind",
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        fold_tally(rows)
    }
}
