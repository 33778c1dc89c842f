//! Request-boundary errors and their JSON shapes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::parser::ClassifyError;

/// Message for request bodies that are not JSON at all.
pub const INVALID_JSON_MESSAGE: &str = "invalid JSON";

/// Everything a handler can fail with.
///
/// Download-endpoint errors render as `{"status": "error", "message": ...}`;
/// file-endpoint errors render as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not JSON, not an object, or has fields of the wrong type
    #[error("{0}")]
    MalformedRequestBody(String),

    /// A required field is missing or blank
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// Input could not be turned into a fetch URL
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// Listing or serving a stored file failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ApiError {
    /// Body that failed JSON syntax checks.
    #[must_use]
    pub fn invalid_json() -> Self {
        Self::MalformedRequestBody(INVALID_JSON_MESSAGE.to_string())
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequestBody(_) | Self::MissingField(_) | Self::Classify(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Catalog(CatalogError::InvalidFilename { .. }) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::FileNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Catalog(CatalogError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Catalog(CatalogError::Io { .. }) => {
                json!({ "error": format!("Failed to list files: {self}") })
            }
            Self::Catalog(_) => json!({ "error": self.to_string() }),
            _ => json!({ "status": "error", "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
