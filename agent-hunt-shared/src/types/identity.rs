use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type IdentityId = i64;

/// A wallet identity known to the directory.
///
/// Identities are created lazily on first submission or action and are
/// never updated afterwards. The address is compared case-sensitively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: IdentityId,
    pub address: String,
    pub created_at: DateTime<Utc>,
}
