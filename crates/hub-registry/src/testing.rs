//! In-memory [`GitHubApi`] for tests.
//!
//! Records every call by method name, serves raw files and pull requests
//! from maps, and fails any method registered with [`FakeGitHub::fail`].

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use hub_core::ReviewRequest;

use crate::api::{ContentEntry, GitHubApi, NewPullRequest, Release, TreeEntry};
use crate::error::RegistryError;

pub const RAW_BASE: &str = "https://raw.test";

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    failures: HashMap<&'static str, u16>,
    raw_files: HashMap<String, Vec<u8>>,
    downloads: HashMap<String, Vec<u8>>,
    directory: Vec<ContentEntry>,
    pulls: HashMap<u64, ReviewRequest>,
    releases: Vec<Release>,
    branches: HashSet<String>,
    blobs: Vec<Vec<u8>>,
    trees: Vec<Vec<TreeEntry>>,
    opened: Vec<NewPullRequest>,
}

#[derive(Default)]
pub struct FakeGitHub {
    state: Mutex<FakeState>,
}

impl FakeGitHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make `method` fail with an API error carrying `status`.
    #[must_use]
    pub fn fail(self, method: &'static str, status: u16) -> Self {
        self.lock().failures.insert(method, status);
        self
    }

    #[must_use]
    pub fn with_raw(self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.lock().raw_files.insert(path.to_string(), body.into());
        self
    }

    #[must_use]
    pub fn with_download(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.lock().downloads.insert(url.to_string(), body.into());
        self
    }

    #[must_use]
    pub fn with_dirs(self, names: &[&str]) -> Self {
        self.lock()
            .directory
            .extend(names.iter().map(|name| ContentEntry {
                name: (*name).to_string(),
                kind: String::from("dir"),
            }));
        self
    }

    #[must_use]
    pub fn with_file_entry(self, name: &str) -> Self {
        self.lock().directory.push(ContentEntry {
            name: name.to_string(),
            kind: String::from("file"),
        });
        self
    }

    #[must_use]
    pub fn with_pull(self, pull: ReviewRequest) -> Self {
        self.lock().pulls.insert(pull.number, pull);
        self
    }

    #[must_use]
    pub fn with_releases(self, releases: Vec<Release>) -> Self {
        self.lock().releases = releases;
        self
    }

    /// Method names in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == method).count()
    }

    #[must_use]
    pub fn blobs(&self) -> Vec<Vec<u8>> {
        self.lock().blobs.clone()
    }

    #[must_use]
    pub fn trees(&self) -> Vec<Vec<TreeEntry>> {
        self.lock().trees.clone()
    }

    #[must_use]
    pub fn opened_pulls(&self) -> Vec<NewPullRequest> {
        self.lock().opened.clone()
    }

    #[must_use]
    pub fn branch_exists(&self, branch: &str) -> bool {
        self.lock().branches.contains(branch)
    }

    fn enter(&self, method: &'static str) -> Result<MutexGuard<'_, FakeState>, RegistryError> {
        let mut state = self.lock();
        state.calls.push(method.to_string());
        if let Some(status) = state.failures.get(method) {
            return Err(RegistryError::Api {
                status: *status,
                message: format!("{method} failed"),
            });
        }
        Ok(state)
    }
}

impl GitHubApi for FakeGitHub {
    async fn default_branch(&self) -> Result<String, RegistryError> {
        drop(self.enter("default_branch")?);
        Ok(String::from("main"))
    }

    async fn branch_head(&self, branch: &str) -> Result<String, RegistryError> {
        drop(self.enter("branch_head")?);
        Ok(format!("head-of-{branch}"))
    }

    async fn commit_tree(&self, commit: &str) -> Result<String, RegistryError> {
        drop(self.enter("commit_tree")?);
        Ok(format!("tree-of-{commit}"))
    }

    async fn create_branch(&self, branch: &str, _sha: &str) -> Result<(), RegistryError> {
        let mut state = self.enter("create_branch")?;
        if !state.branches.insert(branch.to_string()) {
            return Err(RegistryError::Api {
                status: 422,
                message: String::from("Reference already exists"),
            });
        }
        Ok(())
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, RegistryError> {
        let mut state = self.enter("create_blob")?;
        state.blobs.push(content.to_vec());
        Ok(format!("blob-{}", state.blobs.len()))
    }

    async fn create_tree(
        &self,
        _base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, RegistryError> {
        let mut state = self.enter("create_tree")?;
        state.trees.push(entries.to_vec());
        Ok(String::from("new-tree"))
    }

    async fn create_commit(
        &self,
        _message: &str,
        _tree: &str,
        _parent: &str,
    ) -> Result<String, RegistryError> {
        drop(self.enter("create_commit")?);
        Ok(String::from("new-commit"))
    }

    async fn update_branch(&self, _branch: &str, _sha: &str) -> Result<(), RegistryError> {
        drop(self.enter("update_branch")?);
        Ok(())
    }

    async fn open_pull_request(&self, request: &NewPullRequest) -> Result<u64, RegistryError> {
        let mut state = self.enter("open_pull_request")?;
        state.opened.push(request.clone());
        Ok(100 + state.opened.len() as u64)
    }

    async fn delete_branch(&self, branch: &str) -> Result<(), RegistryError> {
        let mut state = self.enter("delete_branch")?;
        if state.branches.remove(branch) {
            Ok(())
        } else {
            Err(RegistryError::Api {
                status: 422,
                message: String::from("Reference does not exist"),
            })
        }
    }

    async fn pull_request(&self, number: u64) -> Result<ReviewRequest, RegistryError> {
        let state = self.enter("pull_request")?;
        state
            .pulls
            .get(&number)
            .copied()
            .ok_or_else(|| RegistryError::Api {
                status: 404,
                message: String::from("Not Found"),
            })
    }

    async fn list_directory(
        &self,
        _path: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ContentEntry>, RegistryError> {
        let state = self.enter("list_directory")?;
        let skip = (page.saturating_sub(1) * per_page) as usize;
        Ok(state
            .directory
            .iter()
            .skip(skip)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn fetch_raw(&self, path: &str) -> Result<Vec<u8>, RegistryError> {
        let state = self.enter("fetch_raw")?;
        state
            .raw_files
            .get(path)
            .cloned()
            .ok_or_else(|| RegistryError::Api {
                status: 404,
                message: String::from("404: Not Found"),
            })
    }

    async fn raw_exists(&self, path: &str) -> Result<bool, RegistryError> {
        let state = self.enter("raw_exists")?;
        Ok(state.raw_files.contains_key(path))
    }

    fn raw_url(&self, path: &str) -> String {
        format!("{RAW_BASE}/{path}")
    }

    async fn releases(&self, _repo: &str) -> Result<Vec<Release>, RegistryError> {
        let state = self.enter("releases")?;
        Ok(state.releases.clone())
    }

    async fn download(&self, url: &str) -> Result<reqwest::Response, RegistryError> {
        let state = self.enter("download")?;
        let Some(body) = state.downloads.get(url).cloned() else {
            return Err(RegistryError::Api {
                status: 404,
                message: String::from("Not Found"),
            });
        };
        let response = ::http::Response::builder()
            .status(200)
            .header("content-type", "application/zip")
            .header("content-length", body.len().to_string())
            .body(body)
            .map_err(|e| RegistryError::Parse(e.to_string()))?;
        Ok(reqwest::Response::from(response))
    }
}
