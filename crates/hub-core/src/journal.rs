//! Publish journal seam.
//!
//! The registry publisher appends every completed saga step through this
//! trait; `hub-db` provides the libSQL-backed implementation. Journal writes
//! are advisory: the publisher logs a failed write and keeps going.

use std::future::Future;

use crate::enums::PublishStep;
use crate::errors::CoreError;

/// Append-only record of publish saga steps, keyed by plugin id.
pub trait PublishJournal: Send + Sync {
    /// Append one step for `plugin_id`.
    fn record(
        &self,
        plugin_id: &str,
        step: &PublishStep,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// All recorded steps for `plugin_id`, oldest first.
    fn steps(&self, plugin_id: &str)
    -> impl Future<Output = Result<Vec<PublishStep>, CoreError>> + Send;
}

/// Journal that remembers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJournal;

impl PublishJournal for NoJournal {
    async fn record(&self, _plugin_id: &str, _step: &PublishStep) -> Result<(), CoreError> {
        Ok(())
    }

    async fn steps(&self, _plugin_id: &str) -> Result<Vec<PublishStep>, CoreError> {
        Ok(Vec::new())
    }
}
