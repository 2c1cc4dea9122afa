//! Entity structs shared by the packager, the registry clients, and the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{ReviewPolicy, ReviewStatus};
use crate::errors::CoreError;
use crate::ids::PluginId;

/// Avatar image uploaded alongside a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub bytes: Vec<u8>,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
}

impl Avatar {
    /// File extension derived from the media subtype.
    ///
    /// `image/png` → `png`, `image/svg+xml` → `svg`. Returns `None` for
    /// anything that is not an `image/*` type.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let essence = self.media_type.split(';').next()?.trim();
        let (kind, subtype) = essence.split_once('/')?;
        if !kind.eq_ignore_ascii_case("image") {
            return None;
        }
        let subtype = subtype.split('+').next()?.trim();
        if subtype.is_empty() {
            return None;
        }
        Some(subtype.to_ascii_lowercase())
    }
}

/// Everything the server needs to propose a plugin to the registry.
///
/// File payloads are optional so that an incomplete upload can be rejected
/// with a precise validation message instead of a parse failure.
#[derive(Debug, Clone, Default)]
pub struct PublishRequest {
    pub plugin_id: String,
    pub plugin_name: String,
    pub plugin_author: String,
    pub plugin_version: String,
    pub plugin_readme: String,
    pub checksum: String,
    pub avatar: Option<Avatar>,
    pub artifact: Option<Vec<u8>>,
}

impl PublishRequest {
    /// Check every precondition that does not need the network.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first failed precondition.
    pub fn validate(&self) -> Result<PluginId, CoreError> {
        if self.checksum.trim().is_empty() {
            return Err(CoreError::validation("checksum is missing or invalid"));
        }
        let Some(artifact) = &self.artifact else {
            return Err(CoreError::validation("plugin archive is missing"));
        };
        if artifact.is_empty() {
            return Err(CoreError::validation("plugin archive is empty"));
        }
        let Some(avatar) = &self.avatar else {
            return Err(CoreError::validation("plugin avatar is missing"));
        };
        if avatar.bytes.is_empty() {
            return Err(CoreError::validation("plugin avatar is empty"));
        }
        if avatar.extension().is_none() {
            return Err(CoreError::validation(format!(
                "plugin avatar must be an image, got '{}'",
                avatar.media_type
            )));
        }
        let id = PluginId::parse(&self.plugin_id)?;
        if id.name() != self.plugin_name {
            return Err(CoreError::validation(format!(
                "plugin id '{id}' does not belong to plugin '{}'",
                self.plugin_name
            )));
        }
        Ok(id)
    }
}

/// Live fields of a registry pull request that review status derives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub number: u64,
    pub merged: bool,
    pub closed: bool,
    pub comments: u64,
}

impl ReviewRequest {
    /// Derive the review status under the given policy.
    #[must_use]
    pub const fn status(&self, policy: ReviewPolicy) -> ReviewStatus {
        if self.merged {
            return ReviewStatus::Approved;
        }
        let rejected = match policy {
            ReviewPolicy::ClosedUnmerged => self.closed,
            ReviewPolicy::CommentsMeanRejected => self.comments > 0,
        };
        if rejected {
            ReviewStatus::Rejected
        } else {
            ReviewStatus::UnderReview
        }
    }
}

/// A plugin accepted into the registry, as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub plugin_id: String,
    pub name: String,
    pub author: String,
    pub version: String,
    pub avatar: Option<String>,
    pub zip: String,
    pub approved: bool,
}

/// Durable client-side record of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    pub plugin_id: String,
    pub plugin_name: String,
    pub plugin_author: String,
    pub plugin_version: String,
    pub pr_number: u64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn complete_request() -> PublishRequest {
        PublishRequest {
            plugin_id: "Echo_9f1c".into(),
            plugin_name: "Echo".into(),
            plugin_author: "Bob".into(),
            plugin_version: "1.0.0".into(),
            plugin_readme: "Echoes messages".into(),
            checksum: "ab".repeat(32),
            avatar: Some(Avatar {
                bytes: vec![0x89, b'P', b'N', b'G'],
                media_type: "image/png".into(),
            }),
            artifact: Some(vec![b'P', b'K', 3, 4]),
        }
    }

    #[rstest]
    #[case("image/png", Some("png"))]
    #[case("image/jpeg", Some("jpeg"))]
    #[case("image/svg+xml", Some("svg"))]
    #[case("IMAGE/WebP; charset=binary", Some("webp"))]
    #[case("application/zip", None)]
    #[case("garbage", None)]
    fn avatar_extension(#[case] media_type: &str, #[case] expected: Option<&str>) {
        let avatar = Avatar {
            bytes: vec![1],
            media_type: media_type.into(),
        };
        assert_eq!(avatar.extension().as_deref(), expected);
    }

    #[test]
    fn complete_request_validates() {
        let id = complete_request().validate().unwrap();
        assert_eq!(id.as_str(), "Echo_9f1c");
    }

    #[test]
    fn empty_checksum_rejected_first() {
        let mut request = complete_request();
        request.checksum = "  ".into();
        request.artifact = None;
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn missing_files_rejected() {
        let mut request = complete_request();
        request.artifact = None;
        assert!(request.validate().unwrap_err().to_string().contains("archive"));

        let mut request = complete_request();
        request.avatar = None;
        assert!(request.validate().unwrap_err().to_string().contains("avatar"));
    }

    #[test]
    fn id_must_match_name() {
        let mut request = complete_request();
        request.plugin_name = "Other".into();
        assert!(matches!(
            request.validate().unwrap_err(),
            CoreError::Validation(_)
        ));
    }

    #[rstest]
    #[case(true, false, 0, ReviewPolicy::ClosedUnmerged, ReviewStatus::Approved)]
    #[case(false, false, 0, ReviewPolicy::ClosedUnmerged, ReviewStatus::UnderReview)]
    #[case(false, false, 3, ReviewPolicy::ClosedUnmerged, ReviewStatus::UnderReview)]
    #[case(false, true, 0, ReviewPolicy::ClosedUnmerged, ReviewStatus::Rejected)]
    #[case(false, false, 3, ReviewPolicy::CommentsMeanRejected, ReviewStatus::Rejected)]
    #[case(false, true, 0, ReviewPolicy::CommentsMeanRejected, ReviewStatus::UnderReview)]
    #[case(true, true, 5, ReviewPolicy::CommentsMeanRejected, ReviewStatus::Approved)]
    fn review_status_derivation(
        #[case] merged: bool,
        #[case] closed: bool,
        #[case] comments: u64,
        #[case] policy: ReviewPolicy,
        #[case] expected: ReviewStatus,
    ) {
        let request = ReviewRequest {
            number: 7,
            merged,
            closed,
            comments,
        };
        assert_eq!(request.status(policy), expected);
    }
}
