//! Allow-list for the `/download` proxy.

use hub_config::DownloadConfig;

use crate::error::RegistryError;

const GITHUB_WEB: &str = "https://github.com/";
const GITHUB_RAW: &str = "https://raw.githubusercontent.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPolicy {
    allowed_prefixes: Vec<String>,
}

impl DownloadPolicy {
    #[must_use]
    pub const fn new(allowed_prefixes: Vec<String>) -> Self {
        Self { allowed_prefixes }
    }

    #[must_use]
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(config.allowed_prefixes.clone())
    }

    /// Check an already-decoded URL and return the URL to fetch.
    ///
    /// The URL is parsed and normalized first, so the allow-list sees the
    /// same URL the request will go to.
    /// `https://github.com/{owner}/{repo}/blob/{ref}/{path}` is rewritten to
    /// the raw content host; other allowed URLs pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidSource`] for an empty or unparsable
    /// URL, one carrying credentials, one outside the allow-list, or one with
    /// a `..` segment in any spelling.
    pub fn resolve(&self, url: &str) -> Result<String, RegistryError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RegistryError::InvalidSource(String::from(
                "missing download URL",
            )));
        }
        let invalid = || RegistryError::InvalidSource(url.to_string());
        let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid());
        }
        if url.split(['/', '?', '#']).any(is_parent_segment) {
            return Err(invalid());
        }
        let normalized = parsed.as_str();
        if !self
            .allowed_prefixes
            .iter()
            .any(|p| normalized.starts_with(p.as_str()))
        {
            return Err(invalid());
        }
        Ok(rewrite_blob_url(normalized))
    }
}

/// `..`, with either dot optionally percent-encoded.
fn is_parent_segment(segment: &str) -> bool {
    urlencoding::decode(segment).is_ok_and(|decoded| decoded == "..")
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self::from_config(&DownloadConfig::default())
    }
}

fn rewrite_blob_url(url: &str) -> String {
    let Some(rest) = url.strip_prefix(GITHUB_WEB) else {
        return url.to_string();
    };
    let mut parts = rest.splitn(4, '/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), Some("blob"), Some(tail)) => {
            format!("{GITHUB_RAW}{owner}/{repo}/{tail}")
        }
        _ => url.to_string(),
    }
}

/// File name for `Content-Disposition` when upstream sends none.
#[must_use]
pub fn file_name(url: &str) -> &str {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.zip")
}
