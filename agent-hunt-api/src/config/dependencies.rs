use std::sync::Arc;

use agent_hunt_repository::{postgres, Repositories};
use agent_hunt_service::{ServiceConfig, Services};
use blob_store::BlobStore;
use tracing::info;

use crate::config::{Settings, StorageBackend};
use crate::errors::StartupError;

/// `Dependencies` holds the components the API serves requests with.
///
/// Repositories and the blob store are built once here and handed
/// explicitly into every service component.
pub struct Dependencies {
    pub services: Services,
    pub blobs: Arc<dyn BlobStore>,
}

impl Dependencies {
    /// Connects to storage and wires the service components.
    ///
    /// With the PostgreSQL backend this opens the pool and, unless disabled,
    /// applies pending migrations.
    pub async fn new(settings: &Settings) -> Result<Self, StartupError> {
        let repositories = match &settings.storage {
            StorageBackend::Postgres {
                database_url,
                max_connections,
                run_migrations,
            } => {
                let pool = postgres::connect(database_url, *max_connections).await?;
                if *run_migrations {
                    postgres::run_migrations(&pool).await?;
                    info!("Database migrations applied");
                }
                Repositories::postgres(pool)
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Repositories::in_memory()
            }
        };

        let blobs: Arc<dyn BlobStore> = Arc::from(settings.blob_source.clone().into_store());
        Self::from_parts(repositories, blobs, settings.service.clone())
    }

    /// Wires the service components over already built repositories.
    pub fn from_parts(
        repositories: Repositories,
        blobs: Arc<dyn BlobStore>,
        config: ServiceConfig,
    ) -> Result<Self, StartupError> {
        let services = Services::new(repositories, Arc::clone(&blobs), config)?;
        Ok(Self { services, blobs })
    }
}
