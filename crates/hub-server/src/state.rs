//! Shared state handed to every request.

use hub_config::HubConfig;
use hub_core::PublishJournal;
use hub_db::HubDb;
use hub_registry::{
    DownloadPolicy, GitHubApi, GitHubClient, PublishSettings, Publisher, ReaderSettings,
    RegistryReader,
};

use crate::error::ServerError;

pub struct AppState<G, J> {
    pub publisher: Publisher<G, J>,
    pub reader: RegistryReader<G>,
    pub downloads: DownloadPolicy,
}

impl<G: GitHubApi, J: PublishJournal> AppState<G, J> {
    pub const fn new(
        publisher: Publisher<G, J>,
        reader: RegistryReader<G>,
        downloads: DownloadPolicy,
    ) -> Self {
        Self {
            publisher,
            reader,
            downloads,
        }
    }
}

impl AppState<GitHubClient, HubDb> {
    /// Production state: GitHub clients from `[github]`, journal in `db`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if `[github]` is incomplete.
    pub fn from_config(config: &HubConfig, db: HubDb) -> Result<Self, ServerError> {
        let github = config.require_github()?;
        let publisher = Publisher::new(
            GitHubClient::from_config(github)?,
            db,
            PublishSettings::from_config(github, &config.publish),
        );
        let reader = RegistryReader::new(
            GitHubClient::from_config(github)?,
            ReaderSettings::from_config(config),
        );
        Ok(Self::new(
            publisher,
            reader,
            DownloadPolicy::from_config(&config.download),
        ))
    }
}
