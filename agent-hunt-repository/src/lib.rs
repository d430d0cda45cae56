//! # Agent Hunt Repository
//! This crate provides traits and implementations for persisting identities,
//! agent listings and the action ledger. It includes definitions for errors,
//! interfaces, a PostgreSQL implementation and an in-memory implementation
//! used by tests and local development.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

pub use errors::RepositoryError;
pub use interfaces::{ActionsRepository, AgentsRepository, IdentitiesRepository};
pub use memory::InMemoryStore;
pub use postgres::{PostgresActionsRepository, PostgresAgentsRepository, PostgresIdentitiesRepository};

/// The set of repositories the service layer operates over.
///
/// Handles are cheap to clone and are constructed once per process, then
/// passed explicitly into each component.
#[derive(Clone)]
pub struct Repositories {
    pub identities: Arc<dyn IdentitiesRepository>,
    pub agents: Arc<dyn AgentsRepository>,
    pub actions: Arc<dyn ActionsRepository>,
}

impl Repositories {
    /// Builds PostgreSQL-backed repositories sharing one connection pool.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            identities: Arc::new(PostgresIdentitiesRepository::new(pool.clone())),
            agents: Arc::new(PostgresAgentsRepository::new(pool.clone())),
            actions: Arc::new(PostgresActionsRepository::new(pool)),
        }
    }

    /// Builds repositories backed by a single fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }

    /// Builds repositories over an existing in-memory store, so callers can
    /// keep a handle for seeding and inspection.
    pub fn from_store(store: Arc<InMemoryStore>) -> Self {
        Self {
            identities: store.clone(),
            agents: store.clone(),
            actions: store,
        }
    }
}
