// App state for the Axum server
use std::sync::Arc;

use agent_hunt_service::Services;
use blob_store::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Backs `GET /blobs/*key` so avatar URLs from the mock store resolve locally.
    pub blobs: Arc<dyn BlobStore>,
}
