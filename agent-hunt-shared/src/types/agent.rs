use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{IdentityId, Skill};

pub type AgentId = i64;

/// An agent profile submitted to the directory.
///
/// Agents are immutable once created; there is no edit or delete path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub avatar_url: String,
    pub url: String,
    pub description: String,
    pub why_hunt: String,
    pub skill: Skill,
    pub other_skill_detail: Option<String>,
    pub author_id: IdentityId,
    pub created_at: DateTime<Utc>,
}

/// The validated fields of an agent about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgent {
    pub name: String,
    pub avatar_url: String,
    pub url: String,
    pub description: String,
    pub why_hunt: String,
    pub skill: Skill,
    pub other_skill_detail: Option<String>,
    pub author_id: IdentityId,
    pub created_at: DateTime<Utc>,
}

/// An agent joined with its author's address, as returned by listing reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentWithAuthor {
    pub agent: Agent,
    pub author_address: String,
    pub upvote_count: i64,
}
