use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of ledger action a user can take on an agent.
///
/// Every kind is an independent toggle: a user holds at most one active
/// action of each kind per agent.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// A positive endorsement of the agent.
    Upvote,
    /// A flag marking the agent as a duplicate of another listing.
    #[serde(rename = "duplicate")]
    DuplicateFlag,
    /// A flag marking the agent as spam.
    #[serde(rename = "spam")]
    SpamFlag,
}

/// Returned when a string or stored discriminant does not name an action kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActionKind(pub String);

impl fmt::Display for UnknownActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action kind: {}", self.0)
    }
}

impl std::error::Error for UnknownActionKind {}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Upvote, ActionKind::DuplicateFlag, ActionKind::SpamFlag];

    /// Returns the action name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Upvote => "upvote",
            ActionKind::DuplicateFlag => "duplicate",
            ActionKind::SpamFlag => "spam",
        }
    }

    /// Returns the discriminant stored in the ledger table.
    pub fn as_i16(&self) -> i16 {
        match self {
            ActionKind::Upvote => 0,
            ActionKind::DuplicateFlag => 1,
            ActionKind::SpamFlag => 2,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = UnknownActionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(ActionKind::Upvote),
            "duplicate" => Ok(ActionKind::DuplicateFlag),
            "spam" => Ok(ActionKind::SpamFlag),
            other => Err(UnknownActionKind(other.to_string())),
        }
    }
}

impl TryFrom<i16> for ActionKind {
    type Error = UnknownActionKind;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ActionKind::Upvote),
            1 => Ok(ActionKind::DuplicateFlag),
            2 => Ok(ActionKind::SpamFlag),
            other => Err(UnknownActionKind(other.to_string())),
        }
    }
}
