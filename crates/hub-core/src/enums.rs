//! Review statuses, publish stages, and publish journal steps.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ReviewStatus
// ---------------------------------------------------------------------------

/// Derived status of a review request (pull request) against the registry.
///
/// Never stored: recomputed on every read from the live pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    UnderReview,
    Rejected,
}

impl ReviewStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::UnderReview => "under_review",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReviewPolicy
// ---------------------------------------------------------------------------

/// How an unmerged pull request is classified as rejected.
///
/// `ClosedUnmerged` (default): rejected only when the pull request was closed
/// without merging; comments are reported but do not change the status.
///
/// `CommentsMeanRejected`: any comment on an unmerged pull request counts as
/// a rejection. This reproduces the registry's historical behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPolicy {
    #[default]
    ClosedUnmerged,
    CommentsMeanRejected,
}

// ---------------------------------------------------------------------------
// PublishStage
// ---------------------------------------------------------------------------

/// Upstream stage of the publish protocol, used to report where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStage {
    ResolveBranch,
    ResolveCommit,
    CreateBranch,
    UploadBlobs,
    CreateTree,
    CreateCommit,
    UpdateRef,
    OpenPullRequest,
}

impl PublishStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResolveBranch => "resolve_branch",
            Self::ResolveCommit => "resolve_commit",
            Self::CreateBranch => "create_branch",
            Self::UploadBlobs => "upload_blobs",
            Self::CreateTree => "create_tree",
            Self::CreateCommit => "create_commit",
            Self::UpdateRef => "update_ref",
            Self::OpenPullRequest => "open_pull_request",
        }
    }

    /// Whether the registry branch already exists when this stage runs.
    #[must_use]
    pub const fn after_branch_created(self) -> bool {
        !matches!(
            self,
            Self::ResolveBranch | Self::ResolveCommit | Self::CreateBranch
        )
    }
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PublishStep
// ---------------------------------------------------------------------------

/// A completed step of the publish saga, appended to the publish journal.
///
/// ```text
/// branch_created → blobs_uploaded → commit_created → ref_updated → pull_request_opened
///        ↘ failed → cleaned_up
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PublishStep {
    BranchCreated { branch: String, base_commit: String },
    BlobsUploaded,
    CommitCreated { sha: String },
    RefUpdated { sha: String },
    PullRequestOpened { number: u64 },
    Failed { stage: PublishStage, message: String },
    CleanedUp { branch: String },
}

impl PublishStep {
    /// Step name used as the SQL discriminator column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BranchCreated { .. } => "branch_created",
            Self::BlobsUploaded => "blobs_uploaded",
            Self::CommitCreated { .. } => "commit_created",
            Self::RefUpdated { .. } => "ref_updated",
            Self::PullRequestOpened { .. } => "pull_request_opened",
            Self::Failed { .. } => "failed",
            Self::CleanedUp { .. } => "cleaned_up",
        }
    }
}

/// Branch left behind by a journal, if any: created, never turned into a
/// pull request, and not yet cleaned up.
#[must_use]
pub fn dangling_branch(steps: &[PublishStep]) -> Option<&str> {
    let opened = steps
        .iter()
        .any(|s| matches!(s, PublishStep::PullRequestOpened { .. }));
    let cleaned = steps
        .iter()
        .any(|s| matches!(s, PublishStep::CleanedUp { .. }));
    if opened || cleaned {
        return None;
    }
    steps.iter().find_map(|s| match s {
        PublishStep::BranchCreated { branch, .. } => Some(branch.as_str()),
        _ => None,
    })
}
