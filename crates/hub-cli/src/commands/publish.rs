use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use hub_config::HubConfig;
use hub_core::{Avatar, PublishRecord, PublishRequest};
use hub_package::{PluginArtifact, PluginManifest};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PublishArgs;
use crate::client::HubClient;
use crate::commands::shared::{PluginSource, open_db};
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct PublishOutput {
    plugin_id: String,
    plugin_name: String,
    pr_number: u64,
    status: String,
}

pub async fn handle(
    args: &PublishArgs,
    flags: &GlobalFlags,
    config: &HubConfig,
) -> anyhow::Result<()> {
    let plugin = PluginSource::read(&args.plugin)?;
    let artifact = plugin.build()?;
    let avatar = Avatar {
        bytes: std::fs::read(&args.avatar)
            .with_context(|| format!("failed to read avatar {}", args.avatar.display()))?,
        media_type: avatar_media_type(&args.avatar)?,
    };
    let request = publish_request(&artifact, avatar, args.readme.clone())?;
    request.validate()?;

    let progress = Progress::spinner(
        &format!("Publishing {} to the registry", request.plugin_name),
        flags.quiet,
    );
    let client = HubClient::new(&config.client.server_url);
    let response = match client.publish(&request).await {
        Ok(response) => {
            progress.finish_clear();
            response
        }
        Err(error) => {
            progress.finish_err("publish failed");
            return Err(error);
        }
    };

    let db = open_db(config).await?;
    db.save_record(&PublishRecord {
        plugin_id: request.plugin_id.clone(),
        plugin_name: request.plugin_name.clone(),
        plugin_author: request.plugin_author.clone(),
        plugin_version: request.plugin_version.clone(),
        pr_number: response.pr_number,
        created_at: Utc::now(),
    })
    .await
    .context("published, but failed to save the local record")?;
    tracing::info!(plugin_id = %request.plugin_id, pr = response.pr_number, "plugin proposed");

    output(
        &PublishOutput {
            plugin_id: request.plugin_id,
            plugin_name: request.plugin_name,
            pr_number: response.pr_number,
            status: response.status,
        },
        flags.format,
    )
}

/// Upload fields taken from the packaged manifest, so the registry sees
/// exactly what the archive declares.
fn publish_request(
    artifact: &PluginArtifact,
    avatar: Avatar,
    readme: Option<String>,
) -> anyhow::Result<PublishRequest> {
    let manifest = PluginManifest::parse(artifact.manifest_yaml())?;
    Ok(PublishRequest {
        plugin_id: artifact.plugin_id().to_string(),
        plugin_name: artifact.plugin_name().to_string(),
        plugin_author: manifest.author().unwrap_or_default(),
        plugin_version: manifest.version().unwrap_or_default(),
        plugin_readme: readme.or_else(|| manifest.description()).unwrap_or_default(),
        checksum: artifact.checksum().to_string(),
        avatar: Some(avatar),
        artifact: Some(artifact.bytes().to_vec()),
    })
}

fn avatar_media_type(path: &Path) -> anyhow::Result<String> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let media_type = match ext.as_str() {
        "png" | "gif" | "webp" | "bmp" => format!("image/{ext}"),
        "jpg" | "jpeg" => String::from("image/jpeg"),
        "svg" => String::from("image/svg+xml"),
        _ => anyhow::bail!(
            "avatar {} must be a png, jpg, gif, webp, bmp, or svg image",
            path.display()
        ),
    };
    Ok(media_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_package::ArchiveBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_carries_manifest_fields() {
        let artifact = ArchiveBuilder::default()
            .build(
                "Echo",
                "class Echo(Plugin):\n    def __init__(self): pass\n",
                "plugin_name: Echo\nversion: 2.1.0\nauthor: Bob\ndescription: echoes\n",
            )
            .unwrap();
        let avatar = Avatar {
            bytes: vec![1, 2, 3],
            media_type: "image/png".into(),
        };
        let request = publish_request(&artifact, avatar, None).unwrap();

        assert_eq!(request.plugin_author, "Bob");
        assert_eq!(request.plugin_version, "2.1.0");
        assert_eq!(request.plugin_readme, "echoes");
        assert_eq!(request.checksum, artifact.checksum());
        assert_eq!(request.validate().unwrap(), *artifact.plugin_id());
    }

    #[test]
    fn avatar_type_from_extension() {
        assert_eq!(avatar_media_type(Path::new("a.PNG")).unwrap(), "image/png");
        assert_eq!(avatar_media_type(Path::new("a.jpg")).unwrap(), "image/jpeg");
        assert_eq!(avatar_media_type(Path::new("a.svg")).unwrap(), "image/svg+xml");
        assert!(avatar_media_type(Path::new("a.txt")).is_err());
        assert!(avatar_media_type(Path::new("avatar")).is_err());
    }
}
