//! Download orchestration on top of an external media engine.
//!
//! This module never extracts, muxes or transcodes anything itself. It builds
//! an [`EngineOptions`] value from the request, asks a [`MediaEngine`] for the
//! title, asks it again for the file, and folds every failure into a
//! [`DownloadResult`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bili_downloader::download::{ContentType, DownloadRequest, Orchestrator, YtDlpEngine};
//! use bili_downloader::parser::classify_input;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(Arc::new(YtDlpEngine::default()), "./downloads");
//! let request = DownloadRequest {
//!     raw_input: "BV1xx411c7mD".to_string(),
//!     content_type: ContentType::Audio,
//!     convert_to_mp3: true,
//! };
//! let target = classify_input(&request.raw_input)?;
//! let result = orchestrator.download(&target, &request).await;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod options;
mod orchestrator;
mod ytdlp;

pub use engine::{MediaEngine, MediaMetadata};
pub use error::EngineError;
pub use options::{
    AUDIO_FORMAT, ContentType, EngineOptions, MP3_QUALITY_KBPS, OUTPUT_NAME_TEMPLATE,
    PostProcessor, VIDEO_CONTAINER, VIDEO_FORMAT,
};
pub use orchestrator::{
    DownloadRequest, DownloadResult, DownloadStatus, Orchestrator, SUCCESS_MESSAGE, UNKNOWN_TITLE,
};
pub use ytdlp::{DEFAULT_YTDLP_BINARY, YtDlpEngine};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, EngineError>` explicitly in function signatures.
