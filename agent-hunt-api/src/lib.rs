//! Agent Hunt API
//!
//! HTTP surface of the agent hunt directory: settings read from the
//! environment, dependency wiring, and the axum router over the service
//! components.

pub mod config;
pub mod errors;
pub mod server;

pub use config::{Dependencies, Settings};
pub use errors::{ApiError, ConfigError, StartupError};
