use agent_hunt_service::ServiceError;
use agent_hunt_shared::types::{ActionKind, ActionTally, ToggleOutcome, ViewerActions};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::parse_agent_id;
use crate::errors::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: Option<String>,
    pub address: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressParams {
    pub address: Option<String>,
}

/// `POST /entities/{id}/actions` - toggles an upvote or flag.
///
/// Responds 201 when the action became active and 200 when it was removed.
pub async fn apply_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ToggleOutcome>), ApiError> {
    let id = parse_agent_id(&id)?;
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let address = request
        .address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .ok_or(ServiceError::Unauthenticated)?;

    let kind = request
        .action
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Invalid action: missing"))?
        .parse::<ActionKind>()
        .map_err(|e| ApiError::bad_request(format!("Invalid action: {e}")))?;

    let outcome = state
        .services
        .ledger
        .apply_action(Some(address), id, kind, request.reason.as_deref())
        .await?;

    let status = if outcome.is_added() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// `GET /entities/{id}/actions?address=` - the caller's active actions.
pub async fn viewer_actions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<AddressParams>,
) -> Result<Json<ViewerActions>, ApiError> {
    let id = parse_agent_id(&id)?;
    let viewer = state
        .services
        .ledger
        .viewer_actions(id, params.address.as_deref())
        .await?;
    Ok(Json(viewer))
}

/// `GET /entities/{id}/counts`
pub async fn action_counts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionTally>, ApiError> {
    let id = parse_agent_id(&id)?;
    Ok(Json(state.services.ledger.counts(id).await?))
}
