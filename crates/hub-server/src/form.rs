//! `multipart/form-data` body of `POST /publish`.

use bytes::Bytes;
use hub_core::{Avatar, PublishRequest};

use crate::error::ApiError;

/// Parse an upload into a [`PublishRequest`].
///
/// Text fields map one-to-one onto the request; `plugin_avatar` and
/// `plugin_zip` are file parts. Unknown parts are drained and ignored.
/// Nothing is validated here beyond the multipart framing.
///
/// # Errors
///
/// Returns a 400 [`ApiError`] when the content type is not multipart or the
/// body is malformed.
pub async fn parse_publish_form(
    content_type: Option<&str>,
    body: Vec<u8>,
) -> Result<PublishRequest, ApiError> {
    let content_type = content_type
        .ok_or_else(|| ApiError::bad_request("expected multipart/form-data body"))?;
    let boundary = multer::parse_boundary(content_type)?;
    let stream =
        futures::stream::once(async move { Ok::<_, std::io::Error>(Bytes::from(body)) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut request = PublishRequest::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "plugin_zip" => request.artifact = Some(field.bytes().await?.to_vec()),
            "plugin_avatar" => {
                let media_type = media_type(
                    field.content_type().map(ToString::to_string),
                    field.file_name(),
                );
                let bytes = field.bytes().await?.to_vec();
                request.avatar = Some(Avatar { bytes, media_type });
            }
            "plugin_id" => request.plugin_id = field.text().await?,
            "plugin_name" => request.plugin_name = field.text().await?,
            "plugin_author" => request.plugin_author = field.text().await?,
            "plugin_version" => request.plugin_version = field.text().await?,
            "plugin_readme" => request.plugin_readme = field.text().await?,
            "checksum" => request.checksum = field.text().await?,
            other => {
                tracing::debug!(field = other, "ignoring unknown form field");
                field.bytes().await?;
            }
        }
    }
    Ok(request)
}

/// Declared part type, or one guessed from the file extension when the
/// client sent none or a generic binary type.
fn media_type(declared: Option<String>, file_name: Option<&str>) -> String {
    match declared {
        Some(declared) if declared != "application/octet-stream" => declared,
        _ => file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| match ext.to_ascii_lowercase().as_str() {
                "jpg" => String::from("image/jpeg"),
                "svg" => String::from("image/svg+xml"),
                ext => format!("image/{ext}"),
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BOUNDARY: &str = "plughub-test-boundary";

    /// Build a multipart body: `(name, file_name, content_type, bytes)`.
    fn multipart_body(parts: &[(&str, Option<&str>, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, content_type, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = file_name.map_or_else(
                || format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
                |file| {
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n"
                    )
                },
            );
            body.extend_from_slice(disposition.as_bytes());
            if let Some(content_type) = content_type {
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    #[tokio::test]
    async fn parses_text_and_file_parts() {
        let body = multipart_body(&[
            ("plugin_id", None, None, b"Echo_1"),
            ("plugin_name", None, None, b"Echo"),
            ("plugin_author", None, None, b"Bob"),
            ("checksum", None, None, b"abc123"),
            ("plugin_avatar", Some("a.png"), Some("image/png"), b"PNG"),
            ("plugin_zip", Some("Echo.zip"), Some("application/zip"), b"PK"),
            ("extra", None, None, b"ignored"),
        ]);
        let request = parse_publish_form(Some(&content_type()), body).await.unwrap();

        assert_eq!(request.plugin_id, "Echo_1");
        assert_eq!(request.plugin_name, "Echo");
        assert_eq!(request.plugin_author, "Bob");
        assert_eq!(request.checksum, "abc123");
        assert_eq!(request.plugin_version, "");
        let avatar = request.avatar.unwrap();
        assert_eq!(avatar.media_type, "image/png");
        assert_eq!(avatar.bytes, b"PNG");
        assert_eq!(request.artifact.as_deref(), Some(&b"PK"[..]));
    }

    #[tokio::test]
    async fn non_multipart_is_rejected() {
        let err = parse_publish_form(Some("application/json"), b"{}".to_vec())
            .await
            .unwrap_err();
        assert_eq!(err.status, 400);

        let err = parse_publish_form(None, Vec::new()).await.unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[test]
    fn avatar_type_falls_back_to_extension() {
        assert_eq!(media_type(Some("image/gif".into()), Some("a.png")), "image/gif");
        assert_eq!(
            media_type(Some("application/octet-stream".into()), Some("A.JPG")),
            "image/jpeg"
        );
        assert_eq!(media_type(None, Some("logo.svg")), "image/svg+xml");
        assert_eq!(media_type(None, None), "");
    }
}
