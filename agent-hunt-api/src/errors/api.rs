use agent_hunt_service::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

const INTERNAL_MESSAGE: &str = "Internal server error.";

/// A request failure, rendered as `{ "error": message }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    TooManyRequests(String),
    /// The cause is logged when the error is created and never sent to the client.
    #[error("Internal server error.")]
    Internal,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        if err.is_internal() {
            error!(error = %err, "Request failed");
            return ApiError::Internal;
        }
        match err {
            ServiceError::InvalidArgument(msg) | ServiceError::InvalidReason(msg) => {
                ApiError::BadRequest(msg)
            }
            ServiceError::Unauthenticated => ApiError::Unauthorized(err.to_string()),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::QuotaExceeded { .. } => ApiError::TooManyRequests(err.to_string()),
            ServiceError::Configuration(_) | ServiceError::Repository(_) | ServiceError::BlobStore(_) => {
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}
