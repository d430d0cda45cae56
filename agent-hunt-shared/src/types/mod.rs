mod action_kind;
mod action_record;
mod activity;
mod agent;
mod identity;
mod listing;
mod skill;

pub use action_kind::{ActionKind, UnknownActionKind};
pub use action_record::{ActionRecord, ActionTally, ToggleOutcome, ViewerActions, VoterAction};
pub use activity::ActivitySummary;
pub use agent::{Agent, AgentId, AgentWithAuthor, NewAgent};
pub use identity::{Identity, IdentityId};
pub use listing::{ActionEntry, AgentPage, AuthorRef, EnrichedAgent, SortBy, UnknownSortBy};
pub use skill::{Skill, UnknownSkill};
