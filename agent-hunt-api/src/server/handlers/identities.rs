use agent_hunt_shared::types::ActivitySummary;
use axum::extract::{Path, State};
use axum::Json;

use crate::errors::ApiError;
use crate::server::state::AppState;

/// `GET /identities/{address}/activity-check` - counts in the current quota window.
pub async fn activity_check(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ActivitySummary>, ApiError> {
    let summary = state.services.limiter.activity(Some(&address)).await?;
    Ok(Json(summary))
}
