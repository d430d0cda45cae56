//! Agent Hunt API Main Entry Point
//!
//! Serves the agent hunt directory over HTTP: listings, submissions, and the
//! upvote and flag ledger.

use std::env;

use agent_hunt_api::server::{create_app, run_server, state::AppState};
use agent_hunt_api::{Dependencies, Settings, StartupError};
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
///
/// `LOG_FORMAT=json` switches to structured JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("agent_hunt_api=info,agent_hunt_service=info,tower_http=info")
    });

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "agent-hunt",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
}

async fn run() -> Result<(), StartupError> {
    let settings = Settings::from_env()?;
    let cors = settings.cors_layer()?;

    let dependencies = Dependencies::new(&settings).await?;
    info!("Dependencies initialized successfully");

    let app = create_app(
        AppState {
            services: dependencies.services,
            blobs: dependencies.blobs,
        },
        cors,
    );
    run_server(app, settings.bind_addr).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting agent hunt API");

    match run().await {
        Ok(()) => {
            info!("Server stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Agent hunt API failed");
            Err(e)
        }
    }
}
