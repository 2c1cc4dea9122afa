//! Publish step journal: append-only log of the publish saga per plugin id.

use hub_core::{CoreError, PublishJournal, PublishStep};

use crate::HubDb;
use crate::error::DatabaseError;

impl HubDb {
    pub async fn append_step(&self, plugin_id: &str, step: &PublishStep) -> Result<(), DatabaseError> {
        let payload = serde_json::to_string(step)
            .map_err(|e| DatabaseError::Query(format!("encode step: {e}")))?;
        self.conn()
            .execute(
                "INSERT INTO publish_steps (plugin_id, step, payload) VALUES (?1, ?2, ?3)",
                libsql::params![plugin_id, step.as_str(), payload],
            )
            .await?;
        Ok(())
    }

    /// Steps for `plugin_id` in the order they were appended.
    pub async fn list_steps(&self, plugin_id: &str) -> Result<Vec<PublishStep>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT payload FROM publish_steps WHERE plugin_id = ?1 ORDER BY id",
                [plugin_id],
            )
            .await?;
        let mut steps = Vec::new();
        while let Some(row) = rows.next().await? {
            let payload = row.get::<String>(0)?;
            let step = serde_json::from_str(&payload)
                .map_err(|e| DatabaseError::Query(format!("decode step '{payload}': {e}")))?;
            steps.push(step);
        }
        Ok(steps)
    }

    /// Plugin ids that have journal entries, most recently active first.
    pub async fn journaled_plugins(&self) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT plugin_id FROM publish_steps GROUP BY plugin_id ORDER BY MAX(id) DESC",
                (),
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }
}

impl PublishJournal for HubDb {
    async fn record(&self, plugin_id: &str, step: &PublishStep) -> Result<(), CoreError> {
        Ok(self.append_step(plugin_id, step).await?)
    }

    async fn steps(&self, plugin_id: &str) -> Result<Vec<PublishStep>, CoreError> {
        Ok(self.list_steps(plugin_id).await?)
    }
}
