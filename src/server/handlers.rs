//! Route handlers.

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use super::AppState;
use super::error::ApiError;
use crate::catalog::CatalogError;
use crate::download::{ContentType, DownloadRequest};
use crate::parser::classify_input;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const SCRIPT_JS: &str = include_str!("../../static/script.js");

/// Wire shape of `POST /downloads/`.
#[derive(Debug, Deserialize)]
struct DownloadPayload {
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "type")]
    content_type: Option<ContentType>,
    #[serde(default)]
    mp3_conversion: Option<bool>,
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) async fn script() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}

pub(crate) async fn help() -> Json<Value> {
    Json(json!({
        "status": "online",
        "message": "File download service is running",
        "usage": "Use /download/<filename>/ to download a file",
        "files": "Use /files/ to list downloadable files",
    }))
}

pub(crate) async fn list_files(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let files = state.catalog.list().await?;
    Ok(Json(json!({
        "message": "File list retrieved",
        "total_files": files.len(),
        "files": files,
    })))
}

pub(crate) async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let requested = filename.strip_suffix('/').unwrap_or(&filename);
    let file = state.catalog.resolve(requested).await?;

    let handle = tokio::fs::File::open(&file.path)
        .await
        .map_err(|_| CatalogError::not_found(&file.name))?;
    debug!(name = %file.name, size = file.size_bytes, "serving file");

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, content_type_for_filename(&file.name));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(file.size_bytes));
    headers.insert(CONTENT_DISPOSITION, content_disposition(&file.name));

    let body = Body::from_stream(ReaderStream::new(handle));
    Ok((headers, body).into_response())
}

pub(crate) async fn start_download(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = parse_download_request(&body)?;
    let target = classify_input(&request.raw_input)?;
    info!(
        input = %request.raw_input,
        kind = %target.input_type,
        url = %target.canonical_url,
        content_type = %request.content_type,
        mp3 = request.convert_to_mp3,
        "download requested"
    );

    let result = state.orchestrator.download(&target, &request).await;
    let status = if result.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(result)).into_response())
}

/// Parses the body of `POST /downloads/`.
///
/// # Errors
///
/// - [`ApiError::MalformedRequestBody`] for non-JSON, non-object or empty-object
///   bodies, and for fields of the wrong type (including an unknown `type`)
/// - [`ApiError::MissingField`] if `url` is absent or blank
pub fn parse_download_request(body: &[u8]) -> Result<DownloadRequest, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::invalid_json())?;
    if !value.as_object().is_some_and(|map| !map.is_empty()) {
        return Err(ApiError::MalformedRequestBody(
            "Please provide JSON data".to_string(),
        ));
    }

    let payload: DownloadPayload = serde_json::from_value(value)
        .map_err(|e| ApiError::MalformedRequestBody(format!("invalid request body: {e}")))?;

    let raw_input = payload.url.unwrap_or_default().trim().to_string();
    if raw_input.is_empty() {
        return Err(ApiError::MissingField("url"));
    }

    Ok(DownloadRequest {
        raw_input,
        content_type: payload.content_type.unwrap_or_default(),
        convert_to_mp3: payload.mp3_conversion.unwrap_or(false),
    })
}

/// `attachment` disposition carrying the decoded name, plus an RFC 5987 copy.
fn content_disposition(name: &str) -> HeaderValue {
    let encoded = urlencoding::encode(name);
    let quoted = name.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_bytes(
        format!("attachment; filename=\"{quoted}\"; filename*=UTF-8''{encoded}").as_bytes(),
    )
    .unwrap_or_else(|_| {
        // control characters in the name; the percent-encoded form is always valid
        HeaderValue::from_bytes(format!("attachment; filename*=UTF-8''{encoded}").as_bytes())
            .unwrap_or(HeaderValue::from_static("attachment"))
    })
}

fn content_type_for_filename(name: &str) -> HeaderValue {
    let mime = mime_guess::from_path(name).first_or_octet_stream();
    HeaderValue::from_str(mime.as_ref())
        .unwrap_or(HeaderValue::from_static("application/octet-stream"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_download_request_defaults() {
        let request = parse_download_request(br#"{"url": " BV1xx411c7mD "}"#).unwrap();
        assert_eq!(request.raw_input, "BV1xx411c7mD");
        assert_eq!(request.content_type, ContentType::Video);
        assert!(!request.convert_to_mp3);
    }

    #[test]
    fn test_parse_download_request_audio_mp3() {
        let request = parse_download_request(
            br#"{"url":"BV1xx411c7mD","type":"audio","mp3_conversion":true}"#,
        )
        .unwrap();
        assert_eq!(request.content_type, ContentType::Audio);
        assert!(request.convert_to_mp3);
    }

    #[test]
    fn test_parse_download_request_null_fields_use_defaults() {
        let request =
            parse_download_request(br#"{"url":"BV1xx411c7mD","type":null,"mp3_conversion":null}"#)
                .unwrap();
        assert_eq!(request.content_type, ContentType::Video);
        assert!(!request.convert_to_mp3);
    }

    #[test]
    fn test_parse_download_request_invalid_json() {
        let err = parse_download_request(b"{not json").unwrap_err();
        assert_eq!(err.to_string(), "invalid JSON");
    }

    #[test]
    fn test_parse_download_request_empty_object_and_non_object() {
        for body in [&b"{}"[..], b"[]", b"null", b"\"BV1xx411c7mD\""] {
            assert!(matches!(
                parse_download_request(body),
                Err(ApiError::MalformedRequestBody(_))
            ));
        }
    }

    #[test]
    fn test_parse_download_request_missing_url() {
        assert!(matches!(
            parse_download_request(br#"{"type":"audio"}"#),
            Err(ApiError::MissingField("url"))
        ));
        assert!(matches!(
            parse_download_request(br#"{"url":"   "}"#),
            Err(ApiError::MissingField("url"))
        ));
    }

    #[test]
    fn test_parse_download_request_unknown_type() {
        let err = parse_download_request(br#"{"url":"BV1xx411c7mD","type":"podcast"}"#)
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedRequestBody(_)));
        assert!(err.to_string().contains("podcast"));
    }

    #[test]
    fn test_content_disposition_keeps_utf8_name() {
        let value = content_disposition("视频 \"1\".mp4");
        let raw = std::str::from_utf8(value.as_bytes()).unwrap();
        assert!(raw.starts_with("attachment; filename=\"视频 \\\"1\\\".mp4\""));
        assert!(raw.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_content_type_for_filename() {
        assert_eq!(content_type_for_filename("a.MP4"), "video/mp4");
        assert_eq!(content_type_for_filename("a.mp3"), "audio/mpeg");
        assert_eq!(content_type_for_filename("a.webm"), "video/webm");
        assert_eq!(content_type_for_filename("noext"), "application/octet-stream");
    }

    #[test]
    fn test_content_type_for_less_common_audio() {
        for name in ["track.wav", "track.flac"] {
            let value = content_type_for_filename(name);
            assert!(
                value.to_str().unwrap().starts_with("audio/"),
                "{name}: {value:?}"
            );
        }
    }
}
