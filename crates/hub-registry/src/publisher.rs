//! Registry publisher: proposes a plugin to the registry as a pull request.
//!
//! The publish is a saga of GitHub calls. Each completed step is appended
//! to the [`PublishJournal`]; once the review branch exists, a failure in a
//! later step triggers a best-effort branch deletion (when enabled) so a
//! retry with the same plugin id does not collide with a dead branch.
//!
//! ```text
//! resolve branch → resolve commit → create branch → upload blobs (x4)
//!   → create tree → create commit → update ref → open pull request
//! ```

use hub_config::PublishConfig;
use hub_core::{PluginId, PublishJournal, PublishRequest, PublishStage, PublishStep};
use hub_core::enums::dangling_branch;

use crate::api::{GitHubApi, NewPullRequest, RegistryManifest, TreeEntry};
use crate::error::PublishError;

/// Publisher behaviour that is not part of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Target branch; `None` resolves the repository's default branch.
    pub base_branch: Option<String>,
    /// Delete the review branch when a later step fails.
    pub cleanup_on_failure: bool,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            base_branch: None,
            cleanup_on_failure: true,
        }
    }
}

impl PublishSettings {
    #[must_use]
    pub fn from_config(github: &hub_config::GitHubConfig, publish: &PublishConfig) -> Self {
        Self {
            base_branch: (!github.resolve_default_branch).then(|| github.branch.clone()),
            cleanup_on_failure: publish.cleanup_on_failure,
        }
    }
}

/// Files of one plugin, ready for upload.
struct PluginFiles {
    artifact: Vec<u8>,
    manifest: Vec<u8>,
    checksum: Vec<u8>,
    avatar: Vec<u8>,
    avatar_ext: String,
}

impl PluginFiles {
    fn from_request(request: &PublishRequest, plugin_id: &PluginId) -> Result<Self, PublishError> {
        let manifest = RegistryManifest {
            plugin_id: plugin_id.to_string(),
            plugin_name: request.plugin_name.clone(),
            plugin_author: request.plugin_author.clone(),
            plugin_readme: request.plugin_readme.clone(),
            plugin_version: request.plugin_version.clone(),
        };
        let manifest = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| hub_core::CoreError::validation(format!("manifest: {e}")))?;
        let avatar = request.avatar.as_ref();
        Ok(Self {
            artifact: request.artifact.clone().unwrap_or_default(),
            manifest,
            checksum: request.checksum.trim().to_ascii_lowercase().into_bytes(),
            avatar: avatar.map(|a| a.bytes.clone()).unwrap_or_default(),
            avatar_ext: avatar
                .and_then(hub_core::Avatar::extension)
                .unwrap_or_default(),
        })
    }
}

pub struct Publisher<G, J> {
    api: G,
    journal: J,
    settings: PublishSettings,
}

impl<G: GitHubApi, J: PublishJournal> Publisher<G, J> {
    pub const fn new(api: G, journal: J, settings: PublishSettings) -> Self {
        Self {
            api,
            journal,
            settings,
        }
    }

    pub const fn api(&self) -> &G {
        &self.api
    }

    pub const fn journal(&self) -> &J {
        &self.journal
    }

    /// Propose a plugin to the registry; returns the pull request number.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Validation`] before any upstream call
    /// - [`PublishError::BranchExists`] if the plugin id was already proposed
    /// - [`PublishError::Upstream`] naming the failed stage
    pub async fn publish(&self, request: &PublishRequest) -> Result<u64, PublishError> {
        let plugin_id = request.validate()?;
        let files = PluginFiles::from_request(request, &plugin_id)?;

        let base_branch = match &self.settings.base_branch {
            Some(branch) => branch.clone(),
            None => self
                .api
                .default_branch()
                .await
                .map_err(PublishError::at(PublishStage::ResolveBranch))?,
        };
        let base_commit = self
            .api
            .branch_head(&base_branch)
            .await
            .map_err(PublishError::at(PublishStage::ResolveCommit))?;
        let base_tree = self
            .api
            .commit_tree(&base_commit)
            .await
            .map_err(PublishError::at(PublishStage::ResolveCommit))?;
        tracing::debug!(%plugin_id, %base_branch, %base_commit, "resolved publish base");

        let branch = plugin_id.branch_name();
        if let Err(e) = self.api.create_branch(&branch, &base_commit).await {
            if e.is_unprocessable() {
                return Err(PublishError::BranchExists { branch });
            }
            return Err(PublishError::at(PublishStage::CreateBranch)(e));
        }
        self.record(
            &plugin_id,
            PublishStep::BranchCreated {
                branch: branch.clone(),
                base_commit: base_commit.clone(),
            },
        )
        .await;

        let proposal = Proposal {
            plugin_id: &plugin_id,
            plugin_name: &request.plugin_name,
            branch: &branch,
            base_branch: &base_branch,
            base_commit: &base_commit,
            base_tree: &base_tree,
        };
        match self.populate_branch(&proposal, &files).await {
            Ok(number) => {
                tracing::info!(%plugin_id, pr = number, "plugin proposed to registry");
                Ok(number)
            }
            Err(err) => {
                if let Some(stage) = err.stage() {
                    self.record(
                        &plugin_id,
                        PublishStep::Failed {
                            stage,
                            message: err.to_string(),
                        },
                    )
                    .await;
                }
                if self.settings.cleanup_on_failure {
                    self.compensate(&plugin_id, &branch).await;
                }
                Err(err)
            }
        }
    }

    async fn populate_branch(
        &self,
        proposal: &Proposal<'_>,
        files: &PluginFiles,
    ) -> Result<u64, PublishError> {
        let plugin_id = proposal.plugin_id;
        let name = proposal.plugin_name;

        let (zip_sha, manifest_sha, checksum_sha, avatar_sha) = tokio::try_join!(
            self.api.create_blob(&files.artifact),
            self.api.create_blob(&files.manifest),
            self.api.create_blob(&files.checksum),
            self.api.create_blob(&files.avatar),
        )
        .map_err(PublishError::at(PublishStage::UploadBlobs))?;
        self.record(plugin_id, PublishStep::BlobsUploaded).await;

        let dir = plugin_id.registry_dir();
        let entries = [
            TreeEntry::file(format!("{dir}/{name}.zip"), zip_sha),
            TreeEntry::file(format!("{dir}/{name}.json"), manifest_sha),
            TreeEntry::file(format!("{dir}/checksum.txt"), checksum_sha),
            TreeEntry::file(format!("{dir}/{name}.{}", files.avatar_ext), avatar_sha),
        ];
        let tree = self
            .api
            .create_tree(proposal.base_tree, &entries)
            .await
            .map_err(PublishError::at(PublishStage::CreateTree))?;

        let commit = self
            .api
            .create_commit(
                &format!("Added new plugin: {name}"),
                &tree,
                proposal.base_commit,
            )
            .await
            .map_err(PublishError::at(PublishStage::CreateCommit))?;
        self.record(plugin_id, PublishStep::CommitCreated { sha: commit.clone() })
            .await;

        self.api
            .update_branch(proposal.branch, &commit)
            .await
            .map_err(PublishError::at(PublishStage::UpdateRef))?;
        self.record(plugin_id, PublishStep::RefUpdated { sha: commit })
            .await;

        let number = self
            .api
            .open_pull_request(&NewPullRequest {
                title: format!("Add plugin: {name}"),
                body: format!("This PR adds a new plugin: {name}"),
                head: proposal.branch.to_string(),
                base: proposal.base_branch.to_string(),
            })
            .await
            .map_err(PublishError::at(PublishStage::OpenPullRequest))?;
        self.record(plugin_id, PublishStep::PullRequestOpened { number })
            .await;
        Ok(number)
    }

    /// Delete the review branch after a failed publish; failures are only logged.
    async fn compensate(&self, plugin_id: &PluginId, branch: &str) {
        match self.api.delete_branch(branch).await {
            Ok(()) => {
                tracing::info!(%plugin_id, branch, "deleted review branch after failed publish");
                self.record(
                    plugin_id,
                    PublishStep::CleanedUp {
                        branch: branch.to_string(),
                    },
                )
                .await;
            }
            Err(e) => {
                tracing::warn!(%plugin_id, branch, error = %e, "failed to delete review branch");
            }
        }
    }

    /// Remove the branch a crashed or failed publish left behind.
    ///
    /// Returns the deleted branch, or `None` if the journal shows nothing
    /// dangling. A branch that is already gone counts as cleaned up.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Journal`] if the journal cannot be read and
    /// [`PublishError::Cleanup`] if GitHub refuses the deletion.
    pub async fn cleanup(&self, plugin_id: &PluginId) -> Result<Option<String>, PublishError> {
        let steps = self
            .journal
            .steps(plugin_id.as_str())
            .await
            .map_err(PublishError::Journal)?;
        let Some(branch) = dangling_branch(&steps).map(str::to_string) else {
            tracing::debug!(%plugin_id, "no dangling branch");
            return Ok(None);
        };

        match self.api.delete_branch(&branch).await {
            Ok(()) => {}
            Err(e) if e.is_unprocessable() || e.is_not_found() => {
                tracing::debug!(%plugin_id, %branch, "branch already gone");
            }
            Err(source) => return Err(PublishError::Cleanup { branch, source }),
        }
        self.record(
            plugin_id,
            PublishStep::CleanedUp {
                branch: branch.clone(),
            },
        )
        .await;
        Ok(Some(branch))
    }

    /// Journal writes are advisory.
    async fn record(&self, plugin_id: &PluginId, step: PublishStep) {
        if let Err(e) = self.journal.record(plugin_id.as_str(), &step).await {
            tracing::warn!(%plugin_id, step = step.as_str(), error = %e, "journal write failed");
        }
    }
}

struct Proposal<'a> {
    plugin_id: &'a PluginId,
    plugin_name: &'a str,
    branch: &'a str,
    base_branch: &'a str,
    base_commit: &'a str,
    base_tree: &'a str,
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use hub_core::{Avatar, CoreError, NoJournal};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::FakeGitHub;

    #[derive(Default)]
    struct MemoryJournal {
        steps: Mutex<Vec<(String, PublishStep)>>,
    }

    impl MemoryJournal {
        fn names(&self) -> Vec<&'static str> {
            self.steps
                .lock()
                .unwrap()
                .iter()
                .map(|(_, s)| s.as_str())
                .collect()
        }
    }

    impl PublishJournal for MemoryJournal {
        async fn record(&self, plugin_id: &str, step: &PublishStep) -> Result<(), CoreError> {
            self.steps
                .lock()
                .unwrap()
                .push((plugin_id.to_string(), step.clone()));
            Ok(())
        }

        async fn steps(&self, plugin_id: &str) -> Result<Vec<PublishStep>, CoreError> {
            Ok(self
                .steps
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _)| id == plugin_id)
                .map(|(_, s)| s.clone())
                .collect())
        }
    }

    fn request() -> PublishRequest {
        PublishRequest {
            plugin_id: "Echo_0b8f7c2e".into(),
            plugin_name: "Echo".into(),
            plugin_author: "Bob".into(),
            plugin_version: "1.0.0".into(),
            plugin_readme: "Repeats messages".into(),
            checksum: "AB".repeat(32),
            avatar: Some(Avatar {
                bytes: vec![0x89, b'P', b'N', b'G'],
                media_type: "image/png".into(),
            }),
            artifact: Some(vec![b'P', b'K', 3, 4, 1, 2]),
        }
    }

    fn publisher<J: PublishJournal>(api: FakeGitHub, journal: J) -> Publisher<FakeGitHub, J> {
        Publisher::new(api, journal, PublishSettings::default())
    }

    #[tokio::test]
    async fn happy_path_opens_pull_request() {
        let journal = MemoryJournal::default();
        let publisher = publisher(FakeGitHub::new(), journal);
        let number = publisher.publish(&request()).await.unwrap();
        assert_eq!(number, 101);

        let api = publisher.api();
        assert_eq!(api.call_count("create_blob"), 4);
        let tree = &api.trees()[0];
        let paths: Vec<&str> = tree.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "plugins/Echo_0b8f7c2e/Echo.zip",
                "plugins/Echo_0b8f7c2e/Echo.json",
                "plugins/Echo_0b8f7c2e/checksum.txt",
                "plugins/Echo_0b8f7c2e/Echo.png",
            ]
        );

        let pull = &api.opened_pulls()[0];
        assert_eq!(pull.title, "Add plugin: Echo");
        assert_eq!(pull.head, "add-plugin-Echo_0b8f7c2e");
        assert_eq!(pull.base, "main");

        let blobs = api.blobs();
        assert!(blobs.contains(&"ab".repeat(32).into_bytes()));
        let manifest = blobs
            .iter()
            .find_map(|b| serde_json::from_slice::<RegistryManifest>(b).ok())
            .unwrap();
        assert_eq!(manifest.plugin_id, "Echo_0b8f7c2e");

        assert_eq!(
            publisher.journal().names(),
            vec![
                "branch_created",
                "blobs_uploaded",
                "commit_created",
                "ref_updated",
                "pull_request_opened",
            ]
        );
    }

    #[tokio::test]
    async fn empty_checksum_makes_no_upstream_calls() {
        let mut bad = request();
        bad.checksum = String::new();
        let publisher = publisher(FakeGitHub::new(), NoJournal);
        let err = publisher.publish(&bad).await.unwrap_err();
        assert!(matches!(err, PublishError::Validation(_)));
        assert!(publisher.api().calls().is_empty());
    }

    #[tokio::test]
    async fn non_image_avatar_rejected_before_upstream() {
        let mut bad = request();
        bad.avatar = Some(Avatar {
            bytes: vec![1],
            media_type: "application/pdf".into(),
        });
        let publisher = publisher(FakeGitHub::new(), NoJournal);
        assert!(matches!(
            publisher.publish(&bad).await.unwrap_err(),
            PublishError::Validation(_)
        ));
        assert!(publisher.api().calls().is_empty());
    }

    #[tokio::test]
    async fn branch_failure_stops_before_blobs() {
        let publisher = publisher(FakeGitHub::new().fail("create_branch", 500), NoJournal);
        let err = publisher.publish(&request()).await.unwrap_err();
        assert_eq!(err.stage(), Some(PublishStage::CreateBranch));
        let api = publisher.api();
        assert_eq!(api.call_count("create_blob"), 0);
        assert_eq!(api.call_count("create_commit"), 0);
        assert_eq!(api.call_count("open_pull_request"), 0);
        assert_eq!(api.call_count("delete_branch"), 0);
    }

    #[tokio::test]
    async fn existing_branch_is_distinguished() {
        let publisher = publisher(FakeGitHub::new(), NoJournal);
        publisher.publish(&request()).await.unwrap();
        let err = publisher.publish(&request()).await.unwrap_err();
        assert!(
            matches!(err, PublishError::BranchExists { ref branch } if branch == "add-plugin-Echo_0b8f7c2e")
        );
        assert_eq!(publisher.api().call_count("create_blob"), 4);
    }

    #[tokio::test]
    async fn later_failure_deletes_branch_and_journals_cleanup() {
        let journal = MemoryJournal::default();
        let publisher = publisher(FakeGitHub::new().fail("create_commit", 502), journal);
        let err = publisher.publish(&request()).await.unwrap_err();
        assert_eq!(err.stage(), Some(PublishStage::CreateCommit));

        let api = publisher.api();
        assert_eq!(api.call_count("delete_branch"), 1);
        assert!(!api.branch_exists("add-plugin-Echo_0b8f7c2e"));
        assert_eq!(api.call_count("open_pull_request"), 0);
        assert_eq!(
            publisher.journal().names(),
            vec!["branch_created", "blobs_uploaded", "failed", "cleaned_up"]
        );
    }

    #[tokio::test]
    async fn cleanup_failure_keeps_original_error() {
        let api = FakeGitHub::new()
            .fail("open_pull_request", 500)
            .fail("delete_branch", 500);
        let publisher = publisher(api, MemoryJournal::default());
        let err = publisher.publish(&request()).await.unwrap_err();
        assert_eq!(err.stage(), Some(PublishStage::OpenPullRequest));
        assert!(!publisher.journal().names().contains(&"cleaned_up"));
    }

    #[tokio::test]
    async fn disabled_cleanup_leaves_branch_for_later() {
        let settings = PublishSettings {
            base_branch: Some("master".into()),
            cleanup_on_failure: false,
        };
        let publisher = Publisher::new(
            FakeGitHub::new().fail("update_branch", 500),
            MemoryJournal::default(),
            settings,
        );
        publisher.publish(&request()).await.unwrap_err();
        assert_eq!(publisher.api().call_count("default_branch"), 0);
        assert!(publisher.api().branch_exists("add-plugin-Echo_0b8f7c2e"));

        let id = PluginId::parse("Echo_0b8f7c2e").unwrap();
        let removed = publisher.cleanup(&id).await.unwrap();
        assert_eq!(removed.as_deref(), Some("add-plugin-Echo_0b8f7c2e"));
        assert!(!publisher.api().branch_exists("add-plugin-Echo_0b8f7c2e"));

        // Second run finds nothing to do.
        assert_eq!(publisher.cleanup(&id).await.unwrap(), None);
        assert_eq!(publisher.api().call_count("delete_branch"), 1);
    }

    #[tokio::test]
    async fn cleanup_ignores_opened_pull_requests() {
        let publisher = publisher(FakeGitHub::new(), MemoryJournal::default());
        publisher.publish(&request()).await.unwrap();
        let id = PluginId::parse("Echo_0b8f7c2e").unwrap();
        assert_eq!(publisher.cleanup(&id).await.unwrap(), None);
        assert!(publisher.api().branch_exists("add-plugin-Echo_0b8f7c2e"));
    }
}
