use std::collections::HashMap;
use std::sync::Arc;

use agent_hunt_repository::{ActionsRepository, AgentsRepository};
use agent_hunt_shared::types::{
    ActionKind, AgentId, AgentPage, AgentWithAuthor, EnrichedAgent, SortBy,
};
use tracing::debug;

use crate::config::ListingConfig;
use crate::errors::ServiceError;
use crate::identity::IdentityResolver;

/// Paginated, enriched reads over the agent listings.
pub struct ListingQueryEngine {
    identities: IdentityResolver,
    agents: Arc<dyn AgentsRepository>,
    actions: Arc<dyn ActionsRepository>,
    config: ListingConfig,
}

impl ListingQueryEngine {
    pub fn new(
        identities: IdentityResolver,
        agents: Arc<dyn AgentsRepository>,
        actions: Arc<dyn ActionsRepository>,
        config: ListingConfig,
    ) -> Self {
        Self {
            identities,
            agents,
            actions,
            config,
        }
    }

    /// Returns one page of agents.
    ///
    /// Fetches one row beyond the page to decide `has_more`. Viewer flags are
    /// only set when `viewer` names a known identity.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - if `page` is less than 1
    pub async fn list_agents(
        &self,
        sort_by: SortBy,
        page: i64,
        viewer: Option<&str>,
    ) -> Result<AgentPage, ServiceError> {
        if page < 1 {
            return Err(ServiceError::invalid_argument(format!(
                "page must be at least 1, got {page}"
            )));
        }

        let page_size = self.config.page_size as i64;
        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| ServiceError::invalid_argument(format!("page out of range: {page}")))?;

        let mut rows = self
            .agents
            .list_agents(sort_by, page_size + 1, offset)
            .await?;
        let has_more = rows.len() > self.config.page_size;
        rows.truncate(self.config.page_size);

        debug!(sort_by = sort_by.as_str(), page, rows = rows.len(), has_more, "Listed agents");

        let agents = self.enrich(rows, viewer).await?;
        Ok(AgentPage { agents, has_more })
    }

    /// Returns a single agent with the same enrichment as a listing row.
    pub async fn get_agent(
        &self,
        id: AgentId,
        viewer: Option<&str>,
    ) -> Result<EnrichedAgent, ServiceError> {
        let row = self
            .agents
            .get_agent(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("agent {id}")))?;

        let mut enriched = self.enrich(vec![row], viewer).await?;
        enriched
            .pop()
            .ok_or_else(|| ServiceError::not_found(format!("agent {id}")))
    }

    async fn enrich(
        &self,
        rows: Vec<AgentWithAuthor>,
        viewer: Option<&str>,
    ) -> Result<Vec<EnrichedAgent>, ServiceError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<AgentId> = rows.iter().map(|row| row.agent.id).collect();
        let positions: HashMap<AgentId, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut enriched: Vec<EnrichedAgent> = rows
            .into_iter()
            .map(|row| EnrichedAgent::new(row.agent, row.author_address))
            .collect();

        // rows arrive newest first and keep that order within each list
        for action in self.actions.list_actions_for_agents(&ids).await? {
            if let Some(&i) = positions.get(&action.record.agent_id) {
                enriched[i].push_action(action);
            }
        }

        let Some(identity) = self.identities.lookup(viewer).await? else {
            return Ok(enriched);
        };

        let (upvoted, duplicate_flagged, spam_flagged) = tokio::try_join!(
            self.actions
                .find_user_action_agent_ids(ActionKind::Upvote, identity.id, &ids),
            self.actions
                .find_user_action_agent_ids(ActionKind::DuplicateFlag, identity.id, &ids),
            self.actions
                .find_user_action_agent_ids(ActionKind::SpamFlag, identity.id, &ids),
        )?;

        for (kind, agent_ids) in [
            (ActionKind::Upvote, upvoted),
            (ActionKind::DuplicateFlag, duplicate_flagged),
            (ActionKind::SpamFlag, spam_flagged),
        ] {
            for agent_id in agent_ids {
                if let Some(&i) = positions.get(&agent_id) {
                    enriched[i].set_viewer_flag(kind, true);
                }
            }
        }

        Ok(enriched)
    }
}
