//! # hub-server
//!
//! HTTP surface of Plughub. Holds the GitHub credentials so that clients
//! never see them, and exposes publish, listing, plugin details, releases,
//! and an allow-listed download proxy. See [`router`] for the route table.

mod error;
mod form;
mod request;
pub mod router;
pub mod server;
mod state;
mod stream;

pub use error::{ApiError, ServerError};
pub use form::parse_publish_form;
pub use request::{ApiRequest, Reply};
pub use router::route;
pub use server::serve;
pub use state::AppState;

use hub_config::HubConfig;
use hub_db::HubDb;

/// Open the journal database, build production state from `config`, and
/// serve until Ctrl-C.
///
/// # Errors
///
/// Returns [`ServerError`] if configuration is incomplete, the database
/// cannot be opened, or the address cannot be bound.
pub async fn run(config: &HubConfig) -> Result<(), ServerError> {
    let db_path = config.general.db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = HubDb::open_local(&db_path.to_string_lossy()).await?;
    let state = AppState::from_config(config, db)?;
    serve(state, &config.server.bind, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await
}
