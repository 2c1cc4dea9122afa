//! # hub-db
//!
//! libSQL store for Plughub's own state: the client-side record of each
//! successful publish and the server-side publish step journal.
//!
//! Everything else lives in the registry repository.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;

pub use error::DatabaseError;

use libsql::Builder;

/// Database handle shared by the record and journal repositories.
pub struct HubDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl HubDb {
    /// Open a local database at the given path (`:memory:` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let hub_db = Self { db, conn };
        hub_db.run_migrations().await?;
        tracing::debug!(path, "opened plughub database");
        Ok(hub_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = HubDb::open_local(":memory:").await.unwrap();
        for table in ["publish_records", "publish_steps"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            assert!(
                rows.next().await.unwrap().is_some(),
                "table '{table}' should exist"
            );
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = HubDb::open_local(":memory:").await.unwrap();
        db.run_migrations().await.unwrap();
    }
}
