//! Configuration module for the agent hunt API.
//! Reads settings from the environment and wires the service dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{Settings, StorageBackend};
