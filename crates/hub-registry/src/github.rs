//! reqwest-backed [`GitHubApi`] implementation.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hub_config::GitHubConfig;
use hub_core::ReviewRequest;
use reqwest::{Method, RequestBuilder, header};
use serde_json::json;

use crate::api::{
    CommitWire, ContentEntry, GitHubApi, NewPullRequest, NumberWire, PullWire, RefWire, Release,
    RepoWire, ShaWire, TreeEntry,
};
use crate::error::RegistryError;
use crate::http::check_response;

const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the registry repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    /// Proxied downloads stream large archives, so only connecting is timed.
    downloads: reqwest::Client,
    api_url: String,
    raw_url: String,
    repo: String,
    read_branch: String,
    token: String,
}

impl GitHubClient {
    /// Create a client for the configured registry repository.
    ///
    /// A token is optional for reads; writes fail upstream without one.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotConfigured`] if `repo` is not `owner/name`.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    pub fn from_config(config: &GitHubConfig) -> Result<Self, RegistryError> {
        config
            .validate()
            .map_err(|e| RegistryError::NotConfigured(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::builder()
                .user_agent(concat!("plughub/", env!("CARGO_PKG_VERSION")))
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client should build"),
            downloads: reqwest::Client::builder()
                .user_agent(concat!("plughub/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client should build"),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            raw_url: config.raw_url.trim_end_matches('/').to_string(),
            repo: config.repo.clone(),
            read_branch: config.branch.clone(),
            token: config.token.clone(),
        })
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Whether `url`, once normalized, points into the registry repository
    /// on the raw content host. Only such URLs carry the token.
    fn in_registry(&self, url: &str) -> bool {
        let Ok(parsed) = reqwest::Url::parse(url) else {
            return false;
        };
        parsed.username().is_empty()
            && parsed.password().is_none()
            && parsed
                .as_str()
                .starts_with(&format!("{}/{}/", self.raw_url, self.repo))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }

    /// Request against `/repos/{repo}/{path}`.
    fn repo_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/repos/{}/{path}", self.api_url, self.repo);
        self.api_request(method, &url)
    }

    fn api_request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        self.authorized(builder)
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        builder: RequestBuilder,
    ) -> Result<T, RegistryError> {
        let resp = check_response(builder.send().await?).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_empty(builder: RequestBuilder) -> Result<(), RegistryError> {
        check_response(builder.send().await?).await?;
        Ok(())
    }
}

impl GitHubApi for GitHubClient {
    async fn default_branch(&self) -> Result<String, RegistryError> {
        let url = format!("{}/repos/{}", self.api_url, self.repo);
        let repo: RepoWire = Self::send_json(self.api_request(Method::GET, &url)).await?;
        Ok(repo.default_branch)
    }

    async fn branch_head(&self, branch: &str) -> Result<String, RegistryError> {
        let path = format!("git/ref/heads/{branch}");
        let reference: RefWire = Self::send_json(self.repo_request(Method::GET, &path)).await?;
        Ok(reference.object.sha)
    }

    async fn commit_tree(&self, commit: &str) -> Result<String, RegistryError> {
        let path = format!("git/commits/{commit}");
        let commit: CommitWire = Self::send_json(self.repo_request(Method::GET, &path)).await?;
        Ok(commit.tree.sha)
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<(), RegistryError> {
        let body = json!({ "ref": format!("refs/heads/{branch}"), "sha": sha });
        Self::send_empty(self.repo_request(Method::POST, "git/refs").json(&body)).await
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, RegistryError> {
        let body = json!({ "content": STANDARD.encode(content), "encoding": "base64" });
        let blob: ShaWire =
            Self::send_json(self.repo_request(Method::POST, "git/blobs").json(&body)).await?;
        Ok(blob.sha)
    }

    async fn create_tree(
        &self,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, RegistryError> {
        let body = json!({ "base_tree": base_tree, "tree": entries });
        let tree: ShaWire =
            Self::send_json(self.repo_request(Method::POST, "git/trees").json(&body)).await?;
        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parent: &str,
    ) -> Result<String, RegistryError> {
        let body = json!({ "message": message, "tree": tree, "parents": [parent] });
        let commit: ShaWire =
            Self::send_json(self.repo_request(Method::POST, "git/commits").json(&body)).await?;
        Ok(commit.sha)
    }

    async fn update_branch(&self, branch: &str, sha: &str) -> Result<(), RegistryError> {
        let path = format!("git/refs/heads/{branch}");
        let body = json!({ "sha": sha, "force": false });
        Self::send_empty(self.repo_request(Method::PATCH, &path).json(&body)).await
    }

    async fn open_pull_request(&self, request: &NewPullRequest) -> Result<u64, RegistryError> {
        let pull: NumberWire =
            Self::send_json(self.repo_request(Method::POST, "pulls").json(request)).await?;
        Ok(pull.number)
    }

    async fn delete_branch(&self, branch: &str) -> Result<(), RegistryError> {
        let path = format!("git/refs/heads/{branch}");
        Self::send_empty(self.repo_request(Method::DELETE, &path)).await
    }

    async fn pull_request(&self, number: u64) -> Result<ReviewRequest, RegistryError> {
        let path = format!("pulls/{number}");
        let pull: PullWire = Self::send_json(self.repo_request(Method::GET, &path)).await?;
        Ok(pull.into())
    }

    async fn list_directory(
        &self,
        path: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ContentEntry>, RegistryError> {
        let path = format!(
            "contents/{path}?ref={}&per_page={per_page}&page={page}",
            urlencoding::encode(&self.read_branch)
        );
        Self::send_json(self.repo_request(Method::GET, &path)).await
    }

    async fn fetch_raw(&self, path: &str) -> Result<Vec<u8>, RegistryError> {
        let url = self.raw_url(path);
        if !self.in_registry(&url) {
            return Err(RegistryError::InvalidSource(url));
        }
        let resp = check_response(self.authorized(self.http.get(&url)).send().await?).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn raw_exists(&self, path: &str) -> Result<bool, RegistryError> {
        let url = self.raw_url(path);
        if !self.in_registry(&url) {
            return Err(RegistryError::InvalidSource(url));
        }
        let resp = self.authorized(self.http.head(&url)).send().await?;
        Ok(resp.status().is_success())
    }

    fn raw_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.raw_url,
            self.repo,
            self.read_branch,
            path.trim_start_matches('/')
        )
    }

    async fn releases(&self, repo: &str) -> Result<Vec<Release>, RegistryError> {
        let url = format!("{}/repos/{repo}/releases", self.api_url);
        Self::send_json(self.api_request(Method::GET, &url)).await
    }

    async fn download(&self, url: &str) -> Result<reqwest::Response, RegistryError> {
        let builder = self.downloads.get(url);
        let builder = if self.in_registry(url) {
            self.authorized(builder)
        } else {
            builder
        };
        check_response(builder.send().await?).await
    }
}
