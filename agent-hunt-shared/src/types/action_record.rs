use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ActionKind, AgentId, IdentityId};

/// A single row of the action ledger.
///
/// Presence of the row means the action is active for (user, agent, kind).
/// Rows are only ever inserted or deleted, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub user_id: IdentityId,
    pub agent_id: AgentId,
    pub kind: ActionKind,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A ledger row joined with the acting user's address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterAction {
    pub record: ActionRecord,
    pub voter_address: String,
}

/// Per-kind counts of ledger rows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionTally {
    pub upvotes: i64,
    pub duplicate_flags: i64,
    pub spam_flags: i64,
}

impl ActionTally {
    pub fn get(&self, kind: ActionKind) -> i64 {
        match kind {
            ActionKind::Upvote => self.upvotes,
            ActionKind::DuplicateFlag => self.duplicate_flags,
            ActionKind::SpamFlag => self.spam_flags,
        }
    }

    pub fn add(&mut self, kind: ActionKind, n: i64) {
        match kind {
            ActionKind::Upvote => self.upvotes += n,
            ActionKind::DuplicateFlag => self.duplicate_flags += n,
            ActionKind::SpamFlag => self.spam_flags += n,
        }
    }

    pub fn total(&self) -> i64 {
        self.upvotes + self.duplicate_flags + self.spam_flags
    }
}

/// Which actions a single viewer currently holds on one agent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViewerActions {
    pub upvoted: bool,
    pub duplicate_flagged: bool,
    pub spam_flagged: bool,
}

impl ViewerActions {
    pub fn set(&mut self, kind: ActionKind, active: bool) {
        match kind {
            ActionKind::Upvote => self.upvoted = active,
            ActionKind::DuplicateFlag => self.duplicate_flagged = active,
            ActionKind::SpamFlag => self.spam_flagged = active,
        }
    }
}

/// Result of toggling a ledger action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ToggleOutcome {
    /// The action is now active; carries the ledger row.
    Added { action: ActionRecord },
    /// The caller's row was deleted.
    Removed,
}

impl ToggleOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, ToggleOutcome::Added { .. })
    }
}
