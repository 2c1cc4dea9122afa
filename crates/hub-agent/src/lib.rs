//! # hub-agent
//!
//! Client for the agent that runs next to the bot on the user's machine and
//! manages its installed plugins.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list      | `GET /plugins/list` |
//! | install   | `POST /plugins/url_install?url=` |
//! | uninstall | `POST /plugins/uninstall?plugin_name=` |
//!
//! Every response has the shape `{status, message, plugins}`.

mod error;

pub use error::AgentError;

use std::time::Duration;

use hub_config::AgentConfig;
use serde::{Deserialize, Serialize};

/// A plugin installed in the local bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPlugin {
    #[serde(default)]
    pub plugin_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Body of every agent response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub plugins: Vec<LocalPlugin>,
}

impl AgentReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// URL the agent should fetch a registry plugin from: the archive routed
/// through the server's `/download` proxy.
#[must_use]
pub fn proxied_download_url(public_url: &str, zip_url: &str) -> String {
    format!(
        "{}/download?url={}",
        public_url.trim_end_matches('/'),
        urlencoding::encode(zip_url)
    )
}

pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgentClient {
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(concat!("plughub/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("reqwest client should build"),
            base_url: config.url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Plugins installed in the local bot.
    ///
    /// # Errors
    ///
    /// [`AgentError::Unreachable`] when the agent is not running; other
    /// variants when it answers with an error.
    pub async fn list(&self) -> Result<Vec<LocalPlugin>, AgentError> {
        let url = format!("{}/plugins/list", self.base_url);
        let reply = self.send(self.http.get(&url), &url).await?;
        Ok(reply.plugins)
    }

    /// Ask the agent to download and install the archive at `archive_url`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::list`], plus [`AgentError::Rejected`] if the agent
    /// reports failure.
    pub async fn install_url(&self, archive_url: &str) -> Result<AgentReply, AgentError> {
        let url = format!(
            "{}/plugins/url_install?url={}",
            self.base_url,
            urlencoding::encode(archive_url)
        );
        let reply = self.send(self.http.post(&url), &url).await?;
        tracing::info!(archive_url, "agent installed plugin");
        Ok(reply)
    }

    /// Ask the agent to remove an installed plugin.
    ///
    /// # Errors
    ///
    /// Same as [`Self::install_url`].
    pub async fn uninstall(&self, plugin_name: &str) -> Result<AgentReply, AgentError> {
        let url = format!(
            "{}/plugins/uninstall?plugin_name={}",
            self.base_url,
            urlencoding::encode(plugin_name)
        );
        let reply = self.send(self.http.post(&url), &url).await?;
        tracing::info!(plugin_name, "agent uninstalled plugin");
        Ok(reply)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<AgentReply, AgentError> {
        tracing::debug!(url, "calling local agent");
        let resp = request
            .send()
            .await
            .map_err(|e| AgentError::from_send(&self.base_url, e))?;
        let status = resp.status();
        let body = resp.text().await?;
        parse_reply(status.as_u16(), &body)
    }
}

fn parse_reply(status: u16, body: &str) -> Result<AgentReply, AgentError> {
    let parsed = serde_json::from_str::<AgentReply>(body);
    if !(200..300).contains(&status) {
        let message = parsed.map_or_else(|_| body.trim().to_string(), |reply| reply.message);
        return Err(AgentError::Api { status, message });
    }
    let reply = parsed.map_err(|e| AgentError::Parse(e.to_string()))?;
    if reply.is_success() {
        Ok(reply)
    } else {
        Err(AgentError::Rejected(reply.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LIST_FIXTURE: &str = r#"{
        "status": "success",
        "message": "2 plugins",
        "plugins": [
            {"plugin_id": "Echo_1", "name": "Echo", "description": "echoes", "version": "1.0.0", "author": "Bob"},
            {"name": "builtin_help"}
        ]
    }"#;

    #[test]
    fn parses_plugin_list() {
        let reply = parse_reply(200, LIST_FIXTURE).unwrap();
        assert_eq!(reply.plugins.len(), 2);
        assert_eq!(reply.plugins[0].plugin_id.as_deref(), Some("Echo_1"));
        assert_eq!(reply.plugins[1].author, None);
    }

    #[test]
    fn failure_status_in_body_is_rejected() {
        let err = parse_reply(200, r#"{"status": "error", "message": "plugin not found"}"#)
            .unwrap_err();
        assert!(matches!(err, AgentError::Rejected(ref m) if m == "plugin not found"));
    }

    #[test]
    fn http_error_keeps_agent_message() {
        let err = parse_reply(500, r#"{"status": "error", "message": "disk full"}"#).unwrap_err();
        assert!(matches!(err, AgentError::Api { status: 500, ref message } if message == "disk full"));

        let err = parse_reply(502, "Bad Gateway").unwrap_err();
        assert!(matches!(err, AgentError::Api { ref message, .. } if message == "Bad Gateway"));
    }

    #[test]
    fn garbage_body_is_parse_error() {
        assert!(matches!(
            parse_reply(200, "<html>").unwrap_err(),
            AgentError::Parse(_)
        ));
    }

    #[test]
    fn proxied_url_encodes_archive() {
        assert_eq!(
            proxied_download_url(
                "https://hub.example.com/",
                "https://raw.githubusercontent.com/o/r/master/plugins/Echo_1/Echo.zip"
            ),
            "https://hub.example.com/download?url=https%3A%2F%2Fraw.githubusercontent.com%2Fo%2Fr%2Fmaster%2Fplugins%2FEcho_1%2FEcho.zip"
        );
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let config = AgentConfig {
            url: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
        };
        let err = AgentClient::new(&config).list().await.unwrap_err();
        assert!(err.is_unreachable(), "{err}");
    }
}
