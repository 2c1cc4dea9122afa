//! `tiny_http` accept loop.
//!
//! `tiny_http` is blocking, so the loop runs on a blocking thread and every
//! request gets its own blocking task that drives the async router with
//! [`Handle::block_on`].

use std::future::Future;
use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

use hub_core::PublishJournal;
use hub_registry::GitHubApi;
use tokio::runtime::Handle;

use crate::error::{ApiError, ServerError};
use crate::request::{ApiRequest, Reply};
use crate::router::route;
use crate::state::AppState;
use crate::stream::ChunkReader;

/// Largest accepted request body (archive plus avatar plus fields).
pub const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Serve `state` on `bind` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound.
pub async fn serve<G, J>(
    state: AppState<G, J>,
    bind: &str,
    shutdown: impl Future<Output = ()>,
) -> Result<(), ServerError>
where
    G: GitHubApi + 'static,
    J: PublishJournal + 'static,
{
    let server = tiny_http::Server::http(bind).map_err(|e| ServerError::Bind {
        addr: bind.to_string(),
        reason: e.to_string(),
    })?;
    let server = Arc::new(server);
    tracing::info!(addr = %bind, "plughub server listening");

    let state = Arc::new(state);
    let handle = Handle::current();
    let listener = Arc::clone(&server);
    let mut accept = tokio::task::spawn_blocking(move || accept_loop(&listener, &state, &handle));

    tokio::select! {
        joined = &mut accept => {
            joined.map_err(|e| ServerError::Join(e.to_string()))?;
        }
        () = shutdown => {
            tracing::info!("shutting down");
            server.unblock();
            accept.await.map_err(|e| ServerError::Join(e.to_string()))?;
        }
    }
    Ok(())
}

fn accept_loop<G, J>(server: &tiny_http::Server, state: &Arc<AppState<G, J>>, handle: &Handle)
where
    G: GitHubApi + 'static,
    J: PublishJournal + 'static,
{
    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        let task_handle = handle.clone();
        handle.spawn_blocking(move || handle_request(request, &state, &task_handle));
    }
}

fn handle_request<G, J>(mut request: tiny_http::Request, state: &AppState<G, J>, handle: &Handle)
where
    G: GitHubApi,
    J: PublishJournal,
{
    let started = Instant::now();
    let method = request.method().as_str().to_string();
    let url = request.url().to_string();
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let reply = match read_body(&mut request) {
        Ok(body) => {
            let api_request = ApiRequest::new(&method, &url, content_type, body);
            handle.block_on(route(state, api_request))
        }
        Err(error) => Reply::from(error),
    };
    let status = reply.status();
    respond(request, reply, handle);

    let path = url.split('?').next().unwrap_or_default();
    tracing::info!(
        %method,
        path,
        status,
        elapsed_ms = started.elapsed().as_millis(),
        "request"
    );
}

fn read_body(request: &mut tiny_http::Request) -> Result<Vec<u8>, ApiError> {
    let mut body = Vec::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut body)
        .map_err(|e| ApiError::bad_request(format!("failed to read body: {e}")))?;
    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(ApiError::new(
            413,
            format!("request body exceeds {MAX_BODY_BYTES} bytes"),
        ));
    }
    Ok(body)
}

fn respond(request: tiny_http::Request, reply: Reply, handle: &Handle) {
    let result = match reply {
        Reply::Json { status, body } => {
            let mut response = tiny_http::Response::from_data(body).with_status_code(status);
            if let Some(h) = header("Content-Type", "application/json") {
                response.add_header(h);
            }
            request.respond(response)
        }
        Reply::Download {
            file_name,
            response,
        } => {
            let status = response.status().as_u16();
            let length = response
                .content_length()
                .and_then(|n| usize::try_from(n).ok());
            let content_type = upstream_header(&response, reqwest::header::CONTENT_TYPE)
                .unwrap_or_else(|| String::from("application/octet-stream"));
            let disposition = upstream_header(&response, reqwest::header::CONTENT_DISPOSITION)
                .unwrap_or_else(|| format!("attachment; filename=\"{file_name}\""));
            let headers = [
                header("Content-Type", &content_type),
                header("Content-Disposition", &disposition),
            ]
            .into_iter()
            .flatten()
            .collect();
            let body = ChunkReader::spawn(handle, response);
            request.respond(tiny_http::Response::new(
                tiny_http::StatusCode(status),
                headers,
                body,
                length,
                None,
            ))
        }
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "client went away before the response was written");
    }
}

fn upstream_header(
    response: &reqwest::Response,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn header(name: &str, value: &str) -> Option<tiny_http::Header> {
    tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}
