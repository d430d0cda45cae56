use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use blob_store::BlobStoreError;
use tracing::error;

use crate::errors::ApiError;
use crate::server::state::AppState;

/// `GET /blobs/{key}` - raw object bytes from the configured blob store.
pub async fn get_blob(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = match state.blobs.get(&key).await {
        Ok(bytes) => bytes,
        Err(BlobStoreError::NotFound(_)) => {
            return Err(ApiError::NotFound(format!("Blob not found: {key}")));
        }
        Err(e) => {
            error!(error = %e, key = %key, "Blob read failed");
            return Err(ApiError::Internal);
        }
    };

    // served as application/octet-stream
    Ok(Bytes::from(bytes).into_response())
}
