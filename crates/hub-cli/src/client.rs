//! HTTP client for the Plughub server.

use std::time::Duration;

use anyhow::Context;
use hub_core::{PublishRequest, RegistryEntry};
use hub_core::responses::{ErrorResponse, PluginInfo, PublishResponse, ReleaseChannels};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

pub struct HubClient {
    http: reqwest::Client,
    base_url: String,
}

impl HubClient {
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(server_url: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(concat!("phub/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(120))
                .build()
                .expect("reqwest client should build"),
            base_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn publish(&self, request: &PublishRequest) -> anyhow::Result<PublishResponse> {
        let mut form = Form::new()
            .text("plugin_id", request.plugin_id.clone())
            .text("plugin_name", request.plugin_name.clone())
            .text("plugin_author", request.plugin_author.clone())
            .text("plugin_version", request.plugin_version.clone())
            .text("plugin_readme", request.plugin_readme.clone())
            .text("checksum", request.checksum.clone());
        if let Some(avatar) = &request.avatar {
            let file_name = format!(
                "avatar.{}",
                avatar.extension().unwrap_or_else(|| String::from("png"))
            );
            let part = Part::bytes(avatar.bytes.clone())
                .file_name(file_name)
                .mime_str(&avatar.media_type)
                .context("invalid avatar media type")?;
            form = form.part("plugin_avatar", part);
        }
        if let Some(artifact) = &request.artifact {
            let part = Part::bytes(artifact.clone())
                .file_name(format!("{}.zip", request.plugin_name))
                .mime_str("application/zip")?;
            form = form.part("plugin_zip", part);
        }

        let url = format!("{}/publish", self.base_url);
        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("failed to reach Plughub server at {}", self.base_url))?;
        read_json(resp).await
    }

    pub async fn plugins(&self, page: u32) -> anyhow::Result<Vec<RegistryEntry>> {
        self.get(&format!("/plugins?page={page}")).await
    }

    pub async fn plugin_info(
        &self,
        plugin_id: &str,
        name: &str,
        pr: Option<u64>,
    ) -> anyhow::Result<PluginInfo> {
        let mut path = format!(
            "/plugin-info?id={}&name={}",
            urlencoding::encode(plugin_id),
            urlencoding::encode(name)
        );
        if let Some(pr) = pr {
            path.push_str(&format!("&pr={pr}"));
        }
        self.get(&path).await
    }

    pub async fn releases(&self) -> anyhow::Result<ReleaseChannels> {
        self.get("/releases").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "calling Plughub server");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to reach Plughub server at {}", self.base_url))?;
        read_json(resp).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> anyhow::Result<T> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    if !(200..300).contains(&status) {
        anyhow::bail!("{}", error_message(status, &body));
    }
    serde_json::from_str(&body).context("unexpected response from Plughub server")
}

fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error,
            stage: Some(stage),
        }) => format!("server error ({status}) at {stage}: {error}"),
        Ok(ErrorResponse { error, stage: None }) => format!("server error ({status}): {error}"),
        Err(_) => format!("server error ({status}): {}", body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_message_names_stage() {
        assert_eq!(
            error_message(502, r#"{"error":"boom","stage":"open_pull_request"}"#),
            "server error (502) at open_pull_request: boom"
        );
        assert_eq!(
            error_message(400, r#"{"error":"checksum is missing or invalid"}"#),
            "server error (400): checksum is missing or invalid"
        );
        assert_eq!(error_message(503, "unavailable\n"), "server error (503): unavailable");
    }
}
