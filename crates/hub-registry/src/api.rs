//! GitHub endpoints used by the registry, and their wire types.
//!
//! Every response is deserialized into a small typed struct and narrowed
//! to domain types here, so the publisher and reader never touch raw JSON.

use std::future::Future;

use hub_core::ReviewRequest;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct RepoWire {
    pub default_branch: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefWire {
    pub object: ShaWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShaWire {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitWire {
    pub tree: ShaWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NumberWire {
    pub number: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullWire {
    pub number: u64,
    #[serde(default)]
    pub merged: bool,
    pub state: String,
    #[serde(default)]
    pub comments: u64,
}

impl From<PullWire> for ReviewRequest {
    fn from(pull: PullWire) -> Self {
        Self {
            number: pull.number,
            merged: pull.merged,
            closed: pull.state == "closed",
            comments: pull.comments,
        }
    }
}

/// One entry of a contents-API directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ContentEntry {
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }
}

/// Entry of a tree created on top of a base tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sha: String,
}

impl TreeEntry {
    /// A regular (non-executable) file pointing at an uploaded blob.
    #[must_use]
    pub const fn file(path: String, sha: String) -> Self {
        Self {
            path,
            mode: "100644",
            kind: "blob",
            sha,
        }
    }
}

/// Pull request to open against the registry.
#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub browser_download_url: String,
}

/// A release of the bot repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A value stored either bare or as a one-element array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_first(self) -> Option<T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.into_iter().next(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RegistryManifestWire {
    #[serde(default)]
    plugin_id: Option<OneOrMany<String>>,
    #[serde(default)]
    plugin_name: Option<OneOrMany<String>>,
    #[serde(default)]
    plugin_author: Option<OneOrMany<String>>,
    #[serde(default)]
    plugin_readme: Option<OneOrMany<String>>,
    #[serde(default)]
    plugin_version: Option<OneOrMany<String>>,
}

/// The `{name}.json` document stored beside each registry plugin.
///
/// Older registry entries wrap every field in a one-element array; both
/// shapes deserialize to the same value. Absent fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegistryManifestWire")]
pub struct RegistryManifest {
    pub plugin_id: String,
    pub plugin_name: String,
    pub plugin_author: String,
    pub plugin_readme: String,
    pub plugin_version: String,
}

impl From<RegistryManifestWire> for RegistryManifest {
    fn from(wire: RegistryManifestWire) -> Self {
        let narrow = |field: Option<OneOrMany<String>>| {
            field.and_then(OneOrMany::into_first).unwrap_or_default()
        };
        Self {
            plugin_id: narrow(wire.plugin_id),
            plugin_name: narrow(wire.plugin_name),
            plugin_author: narrow(wire.plugin_author),
            plugin_readme: narrow(wire.plugin_readme),
            plugin_version: narrow(wire.plugin_version),
        }
    }
}

// ── Trait ──────────────────────────────────────────────────────────

/// The registry's view of GitHub.
///
/// Repository-scoped methods act on the configured registry repository.
/// Raw paths (`plugins/{id}/{file}`) are relative to the repository root on
/// the configured read branch.
pub trait GitHubApi: Send + Sync {
    /// Name of the repository's default branch.
    fn default_branch(&self) -> impl Future<Output = Result<String, RegistryError>> + Send;

    /// Latest commit SHA of `branch`.
    fn branch_head(&self, branch: &str)
    -> impl Future<Output = Result<String, RegistryError>> + Send;

    /// Root tree SHA of a commit.
    fn commit_tree(&self, commit: &str)
    -> impl Future<Output = Result<String, RegistryError>> + Send;

    /// Create `refs/heads/{branch}` at `sha`. A taken name fails with 422.
    fn create_branch(
        &self,
        branch: &str,
        sha: &str,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send;

    /// Upload a blob; returns its SHA.
    fn create_blob(&self, content: &[u8])
    -> impl Future<Output = Result<String, RegistryError>> + Send;

    fn create_tree(
        &self,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> impl Future<Output = Result<String, RegistryError>> + Send;

    fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parent: &str,
    ) -> impl Future<Output = Result<String, RegistryError>> + Send;

    /// Fast-forward `branch` to `sha` (never forced).
    fn update_branch(
        &self,
        branch: &str,
        sha: &str,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send;

    /// Open a pull request; returns its number.
    fn open_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> impl Future<Output = Result<u64, RegistryError>> + Send;

    fn delete_branch(&self, branch: &str)
    -> impl Future<Output = Result<(), RegistryError>> + Send;

    fn pull_request(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<ReviewRequest, RegistryError>> + Send;

    /// One page of a directory listing.
    fn list_directory(
        &self,
        path: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<ContentEntry>, RegistryError>> + Send;

    /// Body of a raw file.
    fn fetch_raw(&self, path: &str)
    -> impl Future<Output = Result<Vec<u8>, RegistryError>> + Send;

    /// Whether a raw file exists (HEAD succeeds).
    fn raw_exists(&self, path: &str)
    -> impl Future<Output = Result<bool, RegistryError>> + Send;

    /// Public URL of a raw file.
    fn raw_url(&self, path: &str) -> String;

    /// Releases of `repo` (`owner/name`), newest first.
    fn releases(&self, repo: &str)
    -> impl Future<Output = Result<Vec<Release>, RegistryError>> + Send;

    /// Start a GET for a proxied download; the body is left unread.
    fn download(&self, url: &str)
    -> impl Future<Output = Result<reqwest::Response, RegistryError>> + Send;
}
