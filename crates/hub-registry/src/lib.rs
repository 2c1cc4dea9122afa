//! # hub-registry
//!
//! GitHub repository used as a plugin registry.
//!
//! - [`publisher`]: proposes a plugin as a branch, commit, and pull request,
//!   journaling each step and deleting the branch when a later step fails
//! - [`reader`]: listings, plugin details, review status, and bot releases,
//!   all behind a read-through TTL cache
//! - [`download`]: allow-list for the download proxy
//!
//! All GitHub access goes through the [`GitHubApi`] trait; [`GitHubClient`]
//! is the reqwest implementation.

pub mod api;
pub mod cache;
pub mod download;
pub mod github;
pub mod publisher;
pub mod reader;

mod error;
mod http;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use api::{GitHubApi, RegistryManifest};
pub use download::DownloadPolicy;
pub use error::{PublishError, RegistryError};
pub use github::GitHubClient;
pub use publisher::{PublishSettings, Publisher};
pub use reader::{PluginLookup, ReaderSettings, RegistryReader};
