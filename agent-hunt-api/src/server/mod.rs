// Server module - HTTP server setup and routing
pub mod handlers;
pub mod state;

use std::net::SocketAddr;

use agent_hunt_service::MAX_AVATAR_BYTES;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::ApiError;
use self::state::AppState;

/// Room for the text fields of a submission on top of the avatar.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the Axum application router with all routes and middleware
pub fn create_app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/entities",
            get(handlers::agents::list_agents)
                .post(handlers::agents::create_agent)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + FORM_OVERHEAD_BYTES)),
        )
        .route(
            "/entities/:id/actions",
            get(handlers::actions::viewer_actions).post(handlers::actions::apply_action),
        )
        .route("/entities/:id/counts", get(handlers::actions::action_counts))
        .route(
            "/identities/:address/activity-check",
            get(handlers::identities::activity_check),
        )
        .route("/blobs/*key", get(handlers::blobs::get_blob))
        .fallback(handlers::not_found)
        .layer(middleware::map_response(json_method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Gives 405 responses the JSON error body, keeping the `Allow` header.
async fn json_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut json = ApiError::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        json.headers_mut().insert(header::ALLOW, allow);
    }
    json
}

/// Run the server on the specified address until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> std::io::Result<()> {
    info!("Server listening on {}", addr);
    info!("- Entities endpoint: http://{}/entities", addr);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
