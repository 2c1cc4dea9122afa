//! Response types returned as JSON by the Plughub server and `phub`.

use serde::{Deserialize, Serialize};

use crate::entities::ReviewRequest;
use crate::enums::{PublishStage, ReviewPolicy, ReviewStatus};

/// Response from `POST /publish`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishResponse {
    pub status: String,
    pub pr_number: u64,
}

impl PublishResponse {
    #[must_use]
    pub fn success(pr_number: u64) -> Self {
        Self {
            status: String::from("success"),
            pr_number,
        }
    }
}

/// Error body returned by every endpoint on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<PublishStage>,
}

/// Status of a plugin still tracked through its review request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewInfo {
    pub pr_number: u64,
    pub status: ReviewStatus,
    pub approved: bool,
    pub under_review: bool,
    pub rejected: bool,
    pub comments: u64,
    pub avatar: Option<String>,
    pub zip: Option<String>,
}

impl ReviewInfo {
    /// Build the status view; asset URLs are only kept once approved.
    #[must_use]
    pub fn from_request(
        request: &ReviewRequest,
        policy: ReviewPolicy,
        avatar: Option<String>,
        zip: Option<String>,
    ) -> Self {
        let status = request.status(policy);
        let approved = status == ReviewStatus::Approved;
        Self {
            pr_number: request.number,
            status,
            approved,
            under_review: status == ReviewStatus::UnderReview,
            rejected: status == ReviewStatus::Rejected,
            comments: request.comments,
            avatar: avatar.filter(|_| approved),
            zip: zip.filter(|_| approved),
        }
    }
}

/// Details of a plugin already live in the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishedPlugin {
    pub plugin_id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub approved: bool,
    pub avatar: Option<String>,
    pub zip: String,
}

/// Response from `GET /plugin-info`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PluginInfo {
    Review(ReviewInfo),
    Published(PublishedPlugin),
}

/// One release channel of the bot itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub latest_version: String,
    pub release_date: Option<String>,
    pub release_notes: Option<String>,
    /// Download link routed through this server's `/download` proxy.
    pub download_url: Option<String>,
    pub prerelease: bool,
}

/// Response from `GET /releases`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseChannels {
    pub stable: Option<ReleaseInfo>,
    pub development: Option<ReleaseInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn review_info_hides_assets_until_approved() {
        let pending = ReviewRequest {
            number: 9,
            merged: false,
            closed: false,
            comments: 2,
        };
        let info = ReviewInfo::from_request(
            &pending,
            ReviewPolicy::ClosedUnmerged,
            Some("https://raw/a.png".into()),
            Some("https://raw/a.zip".into()),
        );
        assert!(info.under_review);
        assert_eq!(info.comments, 2);
        assert_eq!(info.avatar, None);
        assert_eq!(info.zip, None);

        let merged = ReviewRequest {
            merged: true,
            ..pending
        };
        let info = ReviewInfo::from_request(
            &merged,
            ReviewPolicy::ClosedUnmerged,
            Some("https://raw/a.png".into()),
            Some("https://raw/a.zip".into()),
        );
        assert!(info.approved);
        assert_eq!(info.zip.as_deref(), Some("https://raw/a.zip"));
    }

    #[test]
    fn plugin_info_is_tagged() {
        let info = PluginInfo::Published(PublishedPlugin {
            plugin_id: "Echo_1".into(),
            name: "Echo".into(),
            description: "d".into(),
            author: "Bob".into(),
            version: "1.0.0".into(),
            approved: true,
            avatar: None,
            zip: "z".into(),
        });
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["kind"], "published");
        assert_eq!(json["plugin_id"], "Echo_1");
    }

    #[test]
    fn error_response_omits_missing_stage() {
        let body = ErrorResponse {
            error: "boom".into(),
            stage: None,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"error":"boom"}"#);
    }
}
