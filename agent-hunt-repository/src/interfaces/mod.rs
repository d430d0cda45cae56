//! This module defines and re-exports the interfaces for the repositories.
//! It serves as a central point for accessing traits related to data interaction.
mod actions;
mod agents;
mod identities;

pub use actions::ActionsRepository;
pub use agents::AgentsRepository;
pub use identities::IdentitiesRepository;
