use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{ActionKind, Agent, IdentityId, VoterAction};

/// Ordering of the agent listing.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Most recently created first, ties broken by id descending.
    #[default]
    New,
    /// Most upvoted first, ties broken by creation time then id, both descending.
    Top,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortBy(pub String);

impl fmt::Display for UnknownSortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort order: {}", self.0)
    }
}

impl std::error::Error for UnknownSortBy {}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::New => "new",
            SortBy::Top => "top",
        }
    }
}

impl FromStr for SortBy {
    type Err = UnknownSortBy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(SortBy::New),
            "top" => Ok(SortBy::Top),
            other => Err(UnknownSortBy(other.to_string())),
        }
    }
}

/// One action as shown on an enriched agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionEntry {
    pub user_id: IdentityId,
    pub address: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<VoterAction> for ActionEntry {
    fn from(action: VoterAction) -> Self {
        ActionEntry {
            user_id: action.record.user_id,
            address: action.voter_address,
            reason: action.record.reason,
            created_at: action.record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorRef {
    pub address: String,
}

/// An agent with its ledger aggregates and the requesting viewer's flags.
///
/// Counts are always the lengths of the corresponding action lists, so they
/// cannot drift from the ledger. Action lists are ordered most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAgent {
    #[serde(flatten)]
    pub agent: Agent,
    pub author: AuthorRef,
    pub upvotes: Vec<ActionEntry>,
    pub upvote_count: usize,
    pub duplicate_flags: Vec<ActionEntry>,
    pub duplicate_flag_count: usize,
    pub spam_flags: Vec<ActionEntry>,
    pub spam_flag_count: usize,
    pub is_upvoted: bool,
    pub is_duplicate_flagged: bool,
    pub is_spam_flagged: bool,
}

impl EnrichedAgent {
    /// Builds an enriched agent with empty action lists and no viewer flags.
    pub fn new(agent: Agent, author_address: String) -> Self {
        EnrichedAgent {
            agent,
            author: AuthorRef { address: author_address },
            upvotes: Vec::new(),
            upvote_count: 0,
            duplicate_flags: Vec::new(),
            duplicate_flag_count: 0,
            spam_flags: Vec::new(),
            spam_flag_count: 0,
            is_upvoted: false,
            is_duplicate_flagged: false,
            is_spam_flagged: false,
        }
    }

    /// Appends an action to the list for its kind and refreshes the count.
    pub fn push_action(&mut self, action: VoterAction) {
        let kind = action.record.kind;
        let entry = ActionEntry::from(action);
        match kind {
            ActionKind::Upvote => {
                self.upvotes.push(entry);
                self.upvote_count = self.upvotes.len();
            }
            ActionKind::DuplicateFlag => {
                self.duplicate_flags.push(entry);
                self.duplicate_flag_count = self.duplicate_flags.len();
            }
            ActionKind::SpamFlag => {
                self.spam_flags.push(entry);
                self.spam_flag_count = self.spam_flags.len();
            }
        }
    }

    pub fn set_viewer_flag(&mut self, kind: ActionKind, active: bool) {
        match kind {
            ActionKind::Upvote => self.is_upvoted = active,
            ActionKind::DuplicateFlag => self.is_duplicate_flagged = active,
            ActionKind::SpamFlag => self.is_spam_flagged = active,
        }
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::Upvote => self.upvote_count,
            ActionKind::DuplicateFlag => self.duplicate_flag_count,
            ActionKind::SpamFlag => self.spam_flag_count,
        }
    }
}

/// One page of the agent listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentPage {
    #[serde(rename = "entities")]
    pub agents: Vec<EnrichedAgent>,
    pub has_more: bool,
}
