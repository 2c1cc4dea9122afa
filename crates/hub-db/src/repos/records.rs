//! Publish record repository: which plugins this user published, under which
//! pull request.

use hub_core::PublishRecord;

use crate::HubDb;
use crate::error::DatabaseError;
use crate::helpers::{from_sql_int, parse_datetime, to_sql_int};

const COLUMNS: &str =
    "plugin_id, plugin_name, plugin_author, plugin_version, pr_number, created_at";

fn row_to_record(row: &libsql::Row) -> Result<PublishRecord, DatabaseError> {
    Ok(PublishRecord {
        plugin_id: row.get::<String>(0)?,
        plugin_name: row.get::<String>(1)?,
        plugin_author: row.get::<String>(2)?,
        plugin_version: row.get::<String>(3)?,
        pr_number: from_sql_int(row.get::<i64>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl HubDb {
    /// Insert a record, replacing any previous record for the same plugin id.
    pub async fn save_record(&self, record: &PublishRecord) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO publish_records
                   (plugin_id, plugin_name, plugin_author, plugin_version, pr_number, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(plugin_id) DO UPDATE SET
                   plugin_name = ?2, plugin_author = ?3, plugin_version = ?4,
                   pr_number = ?5, created_at = ?6",
                libsql::params![
                    record.plugin_id.as_str(),
                    record.plugin_name.as_str(),
                    record.plugin_author.as_str(),
                    record.plugin_version.as_str(),
                    to_sql_int(record.pr_number)?,
                    record.created_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn get_record(&self, plugin_id: &str) -> Result<Option<PublishRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {COLUMNS} FROM publish_records WHERE plugin_id = ?1"),
                [plugin_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    /// All records, newest first.
    pub async fn list_records(&self) -> Result<Vec<PublishRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {COLUMNS} FROM publish_records ORDER BY created_at DESC, plugin_id"),
                (),
            )
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_record(&row)?);
        }
        Ok(results)
    }

    /// Returns whether a record was removed.
    pub async fn delete_record(&self, plugin_id: &str) -> Result<bool, DatabaseError> {
        let affected = self
            .conn()
            .execute("DELETE FROM publish_records WHERE plugin_id = ?1", [plugin_id])
            .await?;
        Ok(affected > 0)
    }
}
