//! Transport-neutral request and reply types.
//!
//! The accept loop converts `tiny_http` requests into [`ApiRequest`] and
//! writes [`Reply`] back, so routing can be tested without a socket.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiRequest {
    /// Split `url` (path plus optional query string) into its parts.
    #[must_use]
    pub fn new(
        method: &str,
        url: &str,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            query: parse_query(query),
            content_type,
            body,
        }
    }

    #[must_use]
    pub fn get(url: &str) -> Self {
        Self::new("GET", url, None, Vec::new())
    }

    /// Decoded query parameter, `None` when absent or blank.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn required(&self, name: &str) -> Result<&str, ApiError> {
        self.param(name)
            .ok_or_else(|| ApiError::bad_request(format!("missing query parameter '{name}'")))
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), std::borrow::Cow::into_owned)
}

/// What a handler produced.
pub enum Reply {
    Json { status: u16, body: Vec<u8> },
    /// Upstream response to stream back unchanged.
    Download {
        file_name: String,
        response: reqwest::Response,
    },
}

impl Reply {
    pub fn json(status: u16, value: &impl Serialize) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::Json { status, body },
            Err(e) => Self::from(ApiError::new(500, e.to_string())),
        }
    }

    pub fn ok(value: &impl Serialize) -> Self {
        Self::json(200, value)
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Json { status, .. } => *status,
            Self::Download { response, .. } => response.status().as_u16(),
        }
    }
}

impl From<ApiError> for Reply {
    fn from(error: ApiError) -> Self {
        let body = serde_json::to_vec(&error.body).unwrap_or_default();
        Self::Json {
            status: error.status,
            body,
        }
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json { status, body } => f
                .debug_struct("Json")
                .field("status", status)
                .field("body", &String::from_utf8_lossy(body))
                .finish(),
            Self::Download { file_name, .. } => f
                .debug_struct("Download")
                .field("file_name", file_name)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_path_and_decodes_query() {
        let req = ApiRequest::get(
            "/download?url=https%3A%2F%2Fgithub.com%2Fo%2Fr%2Fblob%2Fmaster%2Fa.zip&x=a+b",
        );
        assert_eq!(req.path, "/download");
        assert_eq!(
            req.param("url"),
            Some("https://github.com/o/r/blob/master/a.zip")
        );
        assert_eq!(req.param("x"), Some("a b"));
    }

    #[test]
    fn blank_params_are_absent() {
        let req = ApiRequest::get("/plugin-info?id=&name=Echo&flag");
        assert_eq!(req.param("id"), None);
        assert_eq!(req.param("flag"), None);
        assert_eq!(req.param("name"), Some("Echo"));
        assert_eq!(req.required("id").unwrap_err().status, 400);
    }
}
