//! Route table and handlers.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /publish` | multipart upload → review pull request |
//! | `GET /plugins?page=` | accepted plugins, one page |
//! | `GET /plugin-info?id=&name=[&pr=]` | review status or published details |
//! | `GET /download?url=` | allow-listed download proxy |
//! | `GET /releases` | latest stable and development bot releases |
//! | `GET /health` | liveness |

use hub_core::ids::is_valid_plugin_name;
use hub_core::responses::PublishResponse;
use hub_core::{PluginId, PublishJournal};
use hub_registry::download::file_name;
use hub_registry::{GitHubApi, PluginLookup};
use serde_json::json;

use crate::error::ApiError;
use crate::form::parse_publish_form;
use crate::request::{ApiRequest, Reply};
use crate::state::AppState;

const ROUTES: &[(&str, &str)] = &[
    ("POST", "/publish"),
    ("GET", "/plugins"),
    ("GET", "/plugin-info"),
    ("GET", "/download"),
    ("GET", "/releases"),
    ("GET", "/health"),
];

/// Dispatch one request. Never fails: errors become JSON error replies.
pub async fn route<G, J>(state: &AppState<G, J>, request: ApiRequest) -> Reply
where
    G: GitHubApi,
    J: PublishJournal,
{
    let result = match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/publish") => publish(state, request).await,
        ("GET", "/plugins") => list_plugins(state, &request).await,
        ("GET", "/plugin-info") => plugin_info(state, &request).await,
        ("GET", "/download") => download(state, &request).await,
        ("GET", "/releases") => releases(state).await,
        ("GET", "/health") => Ok(Reply::ok(&json!({ "status": "ok" }))),
        (method, path) if ROUTES.iter().any(|(_, p)| *p == path) => Err(ApiError::new(
            405,
            format!("method {method} not allowed on {path}"),
        )),
        (_, path) => Err(ApiError::not_found(format!("no route for {path}"))),
    };
    result.unwrap_or_else(|error| {
        tracing::warn!(status = error.status, error = %error.body.error, "request failed");
        Reply::from(error)
    })
}

async fn publish<G, J>(state: &AppState<G, J>, request: ApiRequest) -> Result<Reply, ApiError>
where
    G: GitHubApi,
    J: PublishJournal,
{
    let form = parse_publish_form(request.content_type.as_deref(), request.body).await?;
    form.validate()?;
    let checksum_matches = form
        .artifact
        .as_deref()
        .is_some_and(|artifact| hub_package::verify(artifact, &form.checksum));
    if !checksum_matches {
        return Err(ApiError::bad_request(
            "checksum does not match the uploaded archive",
        ));
    }
    let pr_number = state.publisher.publish(&form).await?;
    Ok(Reply::ok(&PublishResponse::success(pr_number)))
}

async fn list_plugins<G, J>(state: &AppState<G, J>, request: &ApiRequest) -> Result<Reply, ApiError>
where
    G: GitHubApi,
{
    let page = match request.param("page") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ApiError::bad_request(format!("invalid page '{raw}'")))?,
        None => 1,
    };
    let entries = state.reader.list_plugins(page).await?;
    Ok(Reply::ok(&entries))
}

async fn plugin_info<G, J>(state: &AppState<G, J>, request: &ApiRequest) -> Result<Reply, ApiError>
where
    G: GitHubApi,
{
    let plugin_id = PluginId::parse(request.required("id")?)?;
    let name = request.required("name")?;
    if !is_valid_plugin_name(name) || plugin_id.name() != name {
        return Err(ApiError::bad_request(format!(
            "plugin name '{name}' does not match id '{plugin_id}'"
        )));
    }
    let (plugin_id, name) = (plugin_id.to_string(), name.to_string());
    let lookup = match request.param("pr") {
        Some(raw) => PluginLookup::Review {
            pr: raw
                .parse()
                .map_err(|_| ApiError::bad_request(format!("invalid pull request number '{raw}'")))?,
            plugin_id,
            name,
        },
        None => PluginLookup::Published { plugin_id, name },
    };
    let info = state.reader.plugin_info(&lookup).await?;
    Ok(Reply::ok(&info))
}

async fn download<G, J>(state: &AppState<G, J>, request: &ApiRequest) -> Result<Reply, ApiError>
where
    G: GitHubApi,
{
    let source = state
        .downloads
        .resolve(request.param("url").unwrap_or_default())?;
    tracing::info!(source, "proxying download");
    let response = state.reader.api().download(&source).await?;
    Ok(Reply::Download {
        file_name: file_name(&source).to_string(),
        response,
    })
}

async fn releases<G, J>(state: &AppState<G, J>) -> Result<Reply, ApiError>
where
    G: GitHubApi,
{
    let channels = state.reader.latest_releases().await?;
    Ok(Reply::ok(&channels))
}
