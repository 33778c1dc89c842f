//! Turns a classified target into a finished download or a structured failure.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::engine::MediaEngine;
use super::error::EngineError;
use super::options::{ContentType, EngineOptions};
use crate::parser::ResolvedTarget;

/// Title used when the probe does not report one.
pub const UNKNOWN_TITLE: &str = "Unknown title";

/// Message returned with every successful download.
pub const SUCCESS_MESSAGE: &str = "Download complete!";

/// One download as requested over the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Text the user typed (URL or id)
    pub raw_input: String,
    /// Video or audio-only
    pub content_type: ContentType,
    /// Transcode extracted audio to MP3 (audio downloads only)
    pub convert_to_mp3: bool,
}

/// Outcome tag of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    /// The file was written
    Success,
    /// The engine failed; see the message
    Error,
}

/// Result reported to the caller; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    /// Success or error
    pub status: DownloadStatus,
    /// Human-readable outcome
    pub message: String,
    /// Source title, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DownloadResult {
    /// A successful download of `title`.
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            status: DownloadStatus::Success,
            message: SUCCESS_MESSAGE.to_string(),
            title: Some(title.into()),
        }
    }

    /// A failed download caused by `error`.
    #[must_use]
    pub fn failure(error: &EngineError) -> Self {
        Self {
            status: DownloadStatus::Error,
            message: format!("Download failed: {error}"),
            title: None,
        }
    }

    /// Returns true for a successful download.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == DownloadStatus::Success
    }
}

impl fmt::Display for DownloadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{}: {}", self.message, title),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Builds engine options, runs probe then fetch, and maps the outcome.
///
/// Requests are not deduplicated or serialized: two concurrent calls for the
/// same target run the engine twice and race on the output file.
pub struct Orchestrator {
    engine: Arc<dyn MediaEngine>,
    download_dir: PathBuf,
    cookie_file: Option<PathBuf>,
}

impl Orchestrator {
    /// Creates an orchestrator writing into `download_dir`.
    pub fn new(engine: Arc<dyn MediaEngine>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            download_dir: download_dir.into(),
            cookie_file: None,
        }
    }

    /// Uses `path` as the cookie file whenever it exists at download time.
    #[must_use]
    pub fn with_cookie_file(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_file = path;
        self
    }

    /// Engine options this orchestrator would use for `request`.
    #[must_use]
    pub fn engine_options(&self, request: &DownloadRequest) -> EngineOptions {
        EngineOptions::build(
            request.content_type,
            request.convert_to_mp3,
            &self.download_dir,
            self.cookie_file.as_deref(),
        )
    }

    /// Downloads `target`. Engine failures come back as an error result.
    ///
    /// Partially written files are left in the download directory on failure.
    #[tracing::instrument(skip(self, target, request), fields(url = %target.canonical_url, content_type = %request.content_type))]
    pub async fn download(
        &self,
        target: &ResolvedTarget,
        request: &DownloadRequest,
    ) -> DownloadResult {
        match self.try_download(target, request).await {
            Ok(title) => {
                info!(title = %title, engine = self.engine.name(), "download complete");
                DownloadResult::success(title)
            }
            Err(e) => {
                warn!(error = %e, engine = self.engine.name(), "download failed");
                DownloadResult::failure(&e)
            }
        }
    }

    async fn try_download(
        &self,
        target: &ResolvedTarget,
        request: &DownloadRequest,
    ) -> Result<String, EngineError> {
        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| EngineError::io(&self.download_dir, e))?;

        let options = self.engine_options(request);
        let url = target.canonical_url.as_str();

        let metadata = self.engine.probe(url, &options).await?;
        let title = metadata
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        info!(
            title = %title,
            id = metadata.id.as_deref().unwrap_or("-"),
            source_ext = metadata.ext.as_deref().unwrap_or("-"),
            mp3 = options.converts_to_mp3(),
            "starting download"
        );

        self.engine.fetch(url, &options).await?;
        Ok(title)
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("engine", &self.engine.name())
            .field("download_dir", &self.download_dir)
            .field("cookie_file", &self.cookie_file)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result_serializes_title() {
        let json = serde_json::to_value(DownloadResult::success("My Video")).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Download complete!");
        assert_eq!(json["title"], "My Video");
    }

    #[test]
    fn test_failure_result_omits_title() {
        let err = EngineError::exited(Some(1), b"ERROR: Unsupported URL");
        let result = DownloadResult::failure(&err);
        assert!(!result.is_success());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Download failed: ERROR: Unsupported URL");
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_result_display() {
        assert_eq!(
            DownloadResult::success("Clip").to_string(),
            "Download complete!: Clip"
        );
    }
}
