//! Registry reader: listings, plugin details, review status, and releases.
//!
//! Every read goes through a [`TtlCache`] keyed by its parameters.

use std::time::Duration;

use futures::future::join_all;
use hub_config::HubConfig;
use hub_core::responses::{
    PluginInfo, PublishedPlugin, ReleaseChannels, ReleaseInfo, ReviewInfo,
};
use hub_core::{PluginId, RegistryEntry, ReviewPolicy};

use crate::api::{GitHubApi, RegistryManifest, Release};
use crate::cache::TtlCache;
use crate::error::RegistryError;

/// Which plugin `plugin_info` should describe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PluginLookup {
    /// A plugin still tracked through its pull request.
    Review {
        pr: u64,
        plugin_id: String,
        name: String,
    },
    /// A plugin already merged into the registry.
    Published { plugin_id: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSettings {
    pub page_size: u32,
    pub avatar_extensions: Vec<String>,
    pub review_policy: ReviewPolicy,
    /// Repository whose releases are reported, `owner/name`.
    pub release_repo: String,
    /// Base URL of this server, used to route release downloads through `/download`.
    pub public_url: String,
    pub list_ttl: Duration,
    pub info_ttl: Duration,
    pub release_ttl: Duration,
}

impl ReaderSettings {
    #[must_use]
    pub fn from_config(config: &HubConfig) -> Self {
        Self {
            page_size: config.general.page_size,
            avatar_extensions: config.general.avatar_extensions.clone(),
            review_policy: config.publish.review_policy,
            release_repo: config.download.release_repo.clone(),
            public_url: config.public_url().to_string(),
            list_ttl: config.cache.list_ttl(),
            info_ttl: config.cache.info_ttl(),
            release_ttl: config.cache.release_ttl(),
        }
    }
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self::from_config(&HubConfig::default())
    }
}

pub struct RegistryReader<G> {
    api: G,
    settings: ReaderSettings,
    listings: TtlCache<u32, Vec<RegistryEntry>>,
    details: TtlCache<PluginLookup, PluginInfo>,
    releases: TtlCache<(), ReleaseChannels>,
}

impl<G: GitHubApi> RegistryReader<G> {
    pub fn new(api: G, settings: ReaderSettings) -> Self {
        Self {
            api,
            listings: TtlCache::new(settings.list_ttl),
            details: TtlCache::new(settings.info_ttl),
            releases: TtlCache::new(settings.release_ttl),
            settings,
        }
    }

    pub const fn api(&self) -> &G {
        &self.api
    }

    /// One page of accepted plugins.
    ///
    /// Directories whose manifest cannot be fetched or parsed are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the directory listing itself fails.
    pub async fn list_plugins(&self, page: u32) -> Result<Vec<RegistryEntry>, RegistryError> {
        let page = page.max(1);
        self.listings
            .get_or_try_insert_with(page, || self.fetch_page(page))
            .await
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<RegistryEntry>, RegistryError> {
        let dirs = self
            .api
            .list_directory("plugins", page, self.settings.page_size)
            .await?;
        let fetches = dirs
            .iter()
            .filter(|entry| entry.is_dir())
            .map(|entry| self.fetch_entry(&entry.name));
        let entries = join_all(fetches)
            .await
            .into_iter()
            .filter_map(|result| {
                result
                    .inspect_err(|e| tracing::warn!(error = %e, "skipping registry entry"))
                    .ok()
            })
            .collect::<Vec<_>>();
        tracing::debug!(page, count = entries.len(), "listed registry page");
        Ok(entries)
    }

    async fn fetch_entry(&self, dir: &str) -> Result<RegistryEntry, RegistryError> {
        let plugin_id =
            PluginId::parse(dir).map_err(|e| RegistryError::Parse(format!("{dir}: {e}")))?;
        let name = plugin_id.name();
        let manifest = self.fetch_manifest(dir, name).await?;
        let avatar = self.find_avatar(dir, name).await;

        Ok(RegistryEntry {
            plugin_id: non_empty(manifest.plugin_id, dir),
            name: non_empty(manifest.plugin_name, name),
            author: non_empty(manifest.plugin_author, "unknown"),
            version: non_empty(manifest.plugin_version, "1.0.0"),
            avatar,
            zip: self.api.raw_url(&format!("plugins/{dir}/{name}.zip")),
            approved: true,
        })
    }

    async fn fetch_manifest(&self, dir: &str, name: &str) -> Result<RegistryManifest, RegistryError> {
        let body = self
            .api
            .fetch_raw(&format!("plugins/{dir}/{name}.json"))
            .await?;
        serde_json::from_slice(&body)
            .map_err(|e| RegistryError::Parse(format!("{dir}/{name}.json: {e}")))
    }

    /// First avatar extension that exists, probed in order.
    async fn find_avatar(&self, dir: &str, name: &str) -> Option<String> {
        for ext in &self.settings.avatar_extensions {
            let path = format!("plugins/{dir}/{name}.{ext}");
            match self.api.raw_exists(&path).await {
                Ok(true) => return Some(self.api.raw_url(&path)),
                Ok(false) => {}
                Err(e) => tracing::debug!(%path, error = %e, "avatar probe failed"),
            }
        }
        None
    }

    /// Details or review status of one plugin.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the pull request or manifest cannot be read.
    pub async fn plugin_info(&self, lookup: &PluginLookup) -> Result<PluginInfo, RegistryError> {
        self.details
            .get_or_try_insert_with(lookup.clone(), || self.fetch_info(lookup))
            .await
    }

    async fn fetch_info(&self, lookup: &PluginLookup) -> Result<PluginInfo, RegistryError> {
        match lookup {
            PluginLookup::Review {
                pr,
                plugin_id,
                name,
            } => {
                let request = self.api.pull_request(*pr).await?;
                let policy = self.settings.review_policy;
                let (avatar, zip) = if request.merged {
                    (
                        self.find_avatar(plugin_id, name).await,
                        Some(self.api.raw_url(&format!("plugins/{plugin_id}/{name}.zip"))),
                    )
                } else {
                    (None, None)
                };
                Ok(PluginInfo::Review(ReviewInfo::from_request(
                    &request, policy, avatar, zip,
                )))
            }
            PluginLookup::Published { plugin_id, name } => {
                let manifest = self.fetch_manifest(plugin_id, name).await?;
                Ok(PluginInfo::Published(PublishedPlugin {
                    plugin_id: non_empty(manifest.plugin_id, plugin_id),
                    name: non_empty(manifest.plugin_name, name),
                    description: manifest.plugin_readme,
                    author: manifest.plugin_author,
                    version: manifest.plugin_version,
                    approved: true,
                    avatar: self.find_avatar(plugin_id, name).await,
                    zip: self.api.raw_url(&format!("plugins/{plugin_id}/{name}.zip")),
                }))
            }
        }
    }

    /// Newest stable and newest pre-release of the bot.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the release feed cannot be read.
    pub async fn latest_releases(&self) -> Result<ReleaseChannels, RegistryError> {
        self.releases
            .get_or_try_insert_with((), || async {
                let releases = self.api.releases(&self.settings.release_repo).await?;
                Ok(channels(&releases, &self.settings.public_url))
            })
            .await
    }
}

fn channels(releases: &[Release], public_url: &str) -> ReleaseChannels {
    let published = || releases.iter().filter(|r| !r.draft);
    let info = |release: &Release| ReleaseInfo {
        latest_version: release.tag_name.clone(),
        release_date: release.published_at.clone(),
        release_notes: release.body.clone(),
        download_url: release.assets.first().map(|asset| {
            format!(
                "{public_url}/download?url={}",
                urlencoding::encode(&asset.browser_download_url)
            )
        }),
        prerelease: release.prerelease,
    };
    ReleaseChannels {
        stable: published().find(|r| !r.prerelease).map(&info),
        development: published().find(|r| r.prerelease).map(&info),
    }
}

fn non_empty(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use hub_core::ReviewRequest;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::ReleaseAsset;
    use crate::testing::{FakeGitHub, RAW_BASE};

    fn manifest_json(id: &str, name: &str) -> String {
        format!(
            r#"{{"plugin_id":"{id}","plugin_name":"{name}","plugin_author":"Bob","plugin_readme":"hi","plugin_version":"1.0.0"}}"#
        )
    }

    fn reader(api: FakeGitHub) -> RegistryReader<FakeGitHub> {
        RegistryReader::new(api, ReaderSettings::default())
    }

    #[tokio::test]
    async fn malformed_manifest_is_dropped() {
        let api = FakeGitHub::new()
            .with_dirs(&["Echo_1", "weather_bot_2", "Broken_3"])
            .with_file_entry("README.md")
            .with_raw("plugins/Echo_1/Echo.json", manifest_json("Echo_1", "Echo"))
            .with_raw(
                "plugins/weather_bot_2/weather_bot.json",
                manifest_json("weather_bot_2", "weather_bot"),
            )
            .with_raw("plugins/Broken_3/Broken.json", "{ not json");
        let entries = reader(api).list_plugins(1).await.unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Echo", "weather_bot"]);
        assert_eq!(
            entries[1].zip,
            format!("{RAW_BASE}/plugins/weather_bot_2/weather_bot.zip")
        );
        assert!(entries.iter().all(|e| e.approved));
    }

    #[tokio::test]
    async fn missing_manifest_is_dropped() {
        let api = FakeGitHub::new()
            .with_dirs(&["Echo_1", "Ghost_2"])
            .with_raw("plugins/Echo_1/Echo.json", manifest_json("Echo_1", "Echo"));
        let entries = reader(api).list_plugins(1).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn avatar_probe_order_and_fallback() {
        let api = FakeGitHub::new()
            .with_dirs(&["Echo_1", "Plain_2"])
            .with_raw("plugins/Echo_1/Echo.json", manifest_json("Echo_1", "Echo"))
            .with_raw("plugins/Echo_1/Echo.png", vec![1])
            .with_raw("plugins/Echo_1/Echo.gif", vec![2])
            .with_raw("plugins/Plain_2/Plain.json", manifest_json("Plain_2", "Plain"));
        let entries = reader(api).list_plugins(1).await.unwrap();
        assert_eq!(
            entries[0].avatar.as_deref(),
            Some(format!("{RAW_BASE}/plugins/Echo_1/Echo.png").as_str())
        );
        assert_eq!(entries[1].avatar, None);
    }

    #[tokio::test]
    async fn legacy_manifest_fields_are_narrowed() {
        let legacy = r#"{"plugin_id":["Echo_1"],"plugin_name":["Echo"],"plugin_author":["Bob"],"plugin_version":["0.9"]}"#;
        let api = FakeGitHub::new()
            .with_dirs(&["Echo_1"])
            .with_raw("plugins/Echo_1/Echo.json", legacy);
        let entries = reader(api).list_plugins(1).await.unwrap();
        assert_eq!(entries[0].version, "0.9");
        assert_eq!(entries[0].author, "Bob");
    }

    #[tokio::test]
    async fn listing_is_cached_per_page() {
        let api = FakeGitHub::new()
            .with_dirs(&["Echo_1"])
            .with_raw("plugins/Echo_1/Echo.json", manifest_json("Echo_1", "Echo"));
        let reader = reader(api);
        reader.list_plugins(1).await.unwrap();
        reader.list_plugins(1).await.unwrap();
        reader.list_plugins(2).await.unwrap();
        assert_eq!(reader.api().call_count("list_directory"), 2);
    }

    #[tokio::test]
    async fn listing_failure_is_an_error() {
        let reader = reader(FakeGitHub::new().fail("list_directory", 500));
        assert!(reader.list_plugins(1).await.is_err());
    }

    #[tokio::test]
    async fn review_hides_assets_until_merged() {
        let api = FakeGitHub::new()
            .with_pull(ReviewRequest {
                number: 5,
                merged: false,
                closed: false,
                comments: 1,
            })
            .with_raw("plugins/Echo_1/Echo.png", vec![1]);
        let reader = reader(api);
        let info = reader
            .plugin_info(&PluginLookup::Review {
                pr: 5,
                plugin_id: "Echo_1".into(),
                name: "Echo".into(),
            })
            .await
            .unwrap();
        let PluginInfo::Review(review) = info else {
            panic!("expected review info");
        };
        assert!(review.under_review);
        assert_eq!(review.comments, 1);
        assert_eq!(review.avatar, None);
        assert_eq!(reader.api().call_count("raw_exists"), 0);
    }

    #[tokio::test]
    async fn merged_review_resolves_assets() {
        let api = FakeGitHub::new()
            .with_pull(ReviewRequest {
                number: 6,
                merged: true,
                closed: true,
                comments: 0,
            })
            .with_raw("plugins/Echo_1/Echo.jpg", vec![1]);
        let info = reader(api)
            .plugin_info(&PluginLookup::Review {
                pr: 6,
                plugin_id: "Echo_1".into(),
                name: "Echo".into(),
            })
            .await
            .unwrap();
        let PluginInfo::Review(review) = info else {
            panic!("expected review info");
        };
        assert!(review.approved);
        assert_eq!(
            review.avatar.as_deref(),
            Some(format!("{RAW_BASE}/plugins/Echo_1/Echo.jpg").as_str())
        );
        assert_eq!(
            review.zip.as_deref(),
            Some(format!("{RAW_BASE}/plugins/Echo_1/Echo.zip").as_str())
        );
    }

    #[tokio::test]
    async fn comments_policy_marks_rejected() {
        let api = FakeGitHub::new().with_pull(ReviewRequest {
            number: 7,
            merged: false,
            closed: false,
            comments: 2,
        });
        let settings = ReaderSettings {
            review_policy: ReviewPolicy::CommentsMeanRejected,
            ..ReaderSettings::default()
        };
        let info = RegistryReader::new(api, settings)
            .plugin_info(&PluginLookup::Review {
                pr: 7,
                plugin_id: "Echo_1".into(),
                name: "Echo".into(),
            })
            .await
            .unwrap();
        assert!(matches!(info, PluginInfo::Review(r) if r.rejected));
    }

    #[tokio::test]
    async fn published_info_reads_manifest() {
        let api = FakeGitHub::new().with_raw("plugins/Echo_1/Echo.json", manifest_json("Echo_1", "Echo"));
        let info = reader(api)
            .plugin_info(&PluginLookup::Published {
                plugin_id: "Echo_1".into(),
                name: "Echo".into(),
            })
            .await
            .unwrap();
        let PluginInfo::Published(plugin) = info else {
            panic!("expected published info");
        };
        assert_eq!(plugin.description, "hi");
        assert_eq!(plugin.author, "Bob");
        assert!(plugin.approved);
    }

    fn release(tag: &str, prerelease: bool) -> Release {
        Release {
            tag_name: tag.into(),
            published_at: Some("2024-09-01T00:00:00Z".into()),
            body: Some(format!("notes for {tag}")),
            prerelease,
            draft: false,
            assets: vec![ReleaseAsset {
                browser_download_url: format!(
                    "https://github.com/shuakami/amyalmond_bot/releases/download/{tag}/bot.zip"
                ),
            }],
        }
    }

    #[tokio::test]
    async fn releases_split_into_channels() {
        let api = FakeGitHub::new().with_releases(vec![
            release("v2.0.0-rc1", true),
            release("v1.9.0", false),
            release("v1.8.0", false),
        ]);
        let channels = reader(api).latest_releases().await.unwrap();
        let stable = channels.stable.unwrap();
        assert_eq!(stable.latest_version, "v1.9.0");
        assert_eq!(
            stable.download_url.as_deref(),
            Some(
                "http://127.0.0.1:8787/download?url=https%3A%2F%2Fgithub.com%2Fshuakami%2Famyalmond_bot%2Freleases%2Fdownload%2Fv1.9.0%2Fbot.zip"
            )
        );
        assert_eq!(channels.development.unwrap().latest_version, "v2.0.0-rc1");
    }

    #[tokio::test]
    async fn no_prerelease_means_no_development_channel() {
        let api = FakeGitHub::new().with_releases(vec![release("v1.0.0", false)]);
        let channels = reader(api).latest_releases().await.unwrap();
        assert!(channels.stable.is_some());
        assert!(channels.development.is_none());
    }
}
