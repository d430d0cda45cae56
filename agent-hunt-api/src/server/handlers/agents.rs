use agent_hunt_service::{AgentSubmission, AvatarUpload};
use agent_hunt_shared::types::{Agent, SortBy};
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::parse_agent_id;
use crate::errors::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub id: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub address: Option<String>,
}

/// `GET /entities` - one page of agents, or a single agent with `?id=`.
pub async fn list_agents(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let viewer = params.address.as_deref();

    if let Some(id) = params.id.as_deref() {
        let id = parse_agent_id(id)?;
        let agent = state.services.listing.get_agent(id, viewer).await?;
        return Ok(Json(agent).into_response());
    }

    let sort_by = match params.sort_by.as_deref() {
        Some(raw) => raw
            .parse::<SortBy>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => SortBy::default(),
    };
    let page = match params.page.as_deref() {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request(format!("Invalid page: {raw}")))?,
        None => 1,
    };

    let page = state.services.listing.list_agents(sort_by, page, viewer).await?;
    Ok(Json(page).into_response())
}

fn malformed(err: MultipartError) -> ApiError {
    ApiError::bad_request(format!("Malformed form data: {}", err.body_text()))
}

async fn text(field: Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(malformed)
}

/// `POST /entities` - multipart agent submission.
pub async fn create_agent(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Agent>), ApiError> {
    let mut submission = AgentSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "avatar" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed)?;
                submission.avatar = Some(AvatarUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "name" => submission.name = Some(text(field).await?),
            "url" => submission.url = Some(text(field).await?),
            "description" => submission.description = Some(text(field).await?),
            "whyHunt" => submission.why_hunt = Some(text(field).await?),
            "skill" => submission.skill = Some(text(field).await?),
            "otherSkillDetail" => submission.other_skill_detail = Some(text(field).await?),
            "fallbackAvatarRef" => submission.fallback_avatar_ref = Some(text(field).await?),
            "authorAddress" => submission.author_address = Some(text(field).await?),
            _ => {}
        }
    }

    let agent = state.services.registry.create_agent(submission).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}
