//! # Agent Hunt Shared
//! This crate defines the data structures shared across the agent hunt workspace.
//! It includes identities, agent listings, ledger actions and their aggregates,
//! and the enriched shapes returned by the listing queries.
pub mod types;
