use hub_agent::{AgentClient, LocalPlugin};
use hub_config::HubConfig;
use hub_core::PublishRecord;
use hub_core::responses::PluginInfo;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::client::HubClient;
use crate::commands::shared::open_db;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct MineRow {
    plugin_id: String,
    name: String,
    version: String,
    pr_number: u64,
    status: String,
    /// `None` when the local agent could not be asked.
    installed: Option<bool>,
    published_at: String,
}

pub async fn handle(flags: &GlobalFlags, config: &HubConfig) -> anyhow::Result<()> {
    let records = open_db(config).await?.list_records().await?;
    let progress = Progress::spinner("Checking review status", flags.quiet);
    let client = HubClient::new(&config.client.server_url);

    let mut statuses = Vec::with_capacity(records.len());
    for record in &records {
        let status = match client
            .plugin_info(&record.plugin_id, &record.plugin_name, Some(record.pr_number))
            .await
        {
            Ok(PluginInfo::Review(review)) => review.status.as_str().to_string(),
            Ok(PluginInfo::Published(_)) => String::from("approved"),
            Err(error) => {
                tracing::warn!(plugin_id = %record.plugin_id, error = %error, "status lookup failed");
                String::from("unknown")
            }
        };
        statuses.push(status);
    }

    let installed = match AgentClient::new(&config.agent).list().await {
        Ok(plugins) => Some(plugins),
        Err(error) if error.is_unreachable() => {
            if !flags.quiet {
                eprintln!(
                    "local agent not reachable at {}; start it to see installed plugins",
                    config.agent.url
                );
            }
            None
        }
        Err(error) => {
            tracing::warn!(error = %error, "agent list failed");
            None
        }
    };
    progress.finish_clear();

    output(&rows(&records, statuses, installed.as_deref()), flags.format)
}

fn rows(
    records: &[PublishRecord],
    statuses: Vec<String>,
    installed: Option<&[LocalPlugin]>,
) -> Vec<MineRow> {
    records
        .iter()
        .zip(statuses)
        .map(|(record, status)| MineRow {
            plugin_id: record.plugin_id.clone(),
            name: record.plugin_name.clone(),
            version: record.plugin_version.clone(),
            pr_number: record.pr_number,
            status,
            installed: installed.map(|plugins| {
                plugins.iter().any(|p| {
                    p.plugin_id.as_deref() == Some(record.plugin_id.as_str())
                        || p.name == record.plugin_name
                })
            }),
            published_at: record.created_at.to_rfc3339(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn record(id: &str, name: &str) -> PublishRecord {
        PublishRecord {
            plugin_id: id.into(),
            plugin_name: name.into(),
            plugin_author: "Bob".into(),
            plugin_version: "1.0.0".into(),
            pr_number: 7,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn local(id: Option<&str>, name: &str) -> LocalPlugin {
        LocalPlugin {
            plugin_id: id.map(str::to_string),
            name: name.into(),
            description: None,
            version: None,
            author: None,
        }
    }

    #[test]
    fn marks_installed_by_id_or_name() {
        let records = vec![
            record("Echo_1", "Echo"),
            record("Dice_2", "Dice"),
            record("Clock_3", "Clock"),
        ];
        let agent = vec![local(Some("Echo_1"), "echo"), local(None, "Dice")];
        let rows = rows(
            &records,
            vec!["approved".into(), "under_review".into(), "rejected".into()],
            Some(&agent),
        );

        let installed: Vec<Option<bool>> = rows.iter().map(|r| r.installed).collect();
        assert_eq!(installed, vec![Some(true), Some(true), Some(false)]);
        assert_eq!(rows[1].status, "under_review");
        assert_eq!(rows[0].published_at, "2026-03-01T12:00:00+00:00");
    }

    #[test]
    fn unknown_when_agent_unreachable() {
        let rows = rows(&[record("Echo_1", "Echo")], vec!["approved".into()], None);
        assert_eq!(rows[0].installed, None);
    }
}
