//! # hub-core
//!
//! Core types, plugin identifiers, and error types for Plughub.
//!
//! This crate provides the foundational types shared across all Plughub crates:
//! - Plugin identifiers (`{name}_{uuid}`) and name validation
//! - Publish requests, registry entries, and durable publish records
//! - Review status derivation from live pull request fields
//! - Publish saga steps and the journal seam the publisher writes to
//! - Response types returned by the HTTP surface and the CLI
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod journal;
pub mod responses;

pub use entities::{Avatar, PublishRecord, PublishRequest, RegistryEntry, ReviewRequest};
pub use enums::{PublishStage, PublishStep, ReviewPolicy, ReviewStatus};
pub use errors::CoreError;
pub use ids::PluginId;
pub use journal::{NoJournal, PublishJournal};
