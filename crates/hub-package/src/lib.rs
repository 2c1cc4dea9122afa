//! # hub-package
//!
//! Client-side plugin packaging for Plughub.
//!
//! - [`archive`]: two-entry zip archive with the plugin id injected into the manifest
//! - [`checksum`]: SHA-256 fingerprint of the finished archive
//! - [`manifest`]: order-preserving YAML manifest handling
//! - [`validate`]: pre-publish checks on name, source, and manifest

pub mod archive;
pub mod checksum;
pub mod error;
pub mod manifest;
pub mod validate;

pub use archive::{ArchiveBuilder, ArchiveLayout, PluginArtifact};
pub use checksum::{sha256_hex, verify};
pub use error::PackageError;
pub use manifest::PluginManifest;
pub use validate::{ValidationReport, validate};
