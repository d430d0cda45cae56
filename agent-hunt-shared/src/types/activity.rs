use serde::{Deserialize, Serialize};

/// An identity's activity in the trailing quota window.
///
/// Limits are `None` when the corresponding quota is disabled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub creation_count: i64,
    pub total_action_count: i64,
    pub creation_limit: Option<u32>,
    pub action_limit: Option<u32>,
}
