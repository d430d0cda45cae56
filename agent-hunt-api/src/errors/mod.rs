//! Error types for the agent hunt API.
//!
//! `StartupError` covers everything that can stop the server from coming up;
//! [`ApiError`] is what a request handler returns.
mod api;

pub use api::ApiError;

use agent_hunt_repository::RepositoryError;
use agent_hunt_service::ServiceError;

/// Invalid or missing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
            reason,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
