// HTTP request handlers
pub mod actions;
pub mod agents;
pub mod blobs;
pub mod identities;

use agent_hunt_shared::types::AgentId;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::errors::ApiError;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Agent ids arrive as path or query strings; anything but an integer is a 400.
pub(crate) fn parse_agent_id(raw: &str) -> Result<AgentId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid agent id: {raw}")))
}
