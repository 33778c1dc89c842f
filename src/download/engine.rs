//! Capability interface for the external media engine.

use async_trait::async_trait;
use serde::Deserialize;

use super::error::EngineError;
use super::options::EngineOptions;

/// Metadata reported by a probe.
///
/// Only the fields this service reads are kept; the engine may report more.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaMetadata {
    /// Source-reported title, used for the output file name
    #[serde(default)]
    pub title: Option<String>,
    /// Source-side identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Extension of the selected format before post-processing
    #[serde(default)]
    pub ext: Option<String>,
}

/// Something that can turn a URL plus options into a media file on disk.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Name of the engine (for logging)
    fn name(&self) -> &'static str;

    /// Reads metadata without downloading any media.
    async fn probe(&self, url: &str, options: &EngineOptions)
    -> Result<MediaMetadata, EngineError>;

    /// Downloads the media and writes it according to `options`.
    async fn fetch(&self, url: &str, options: &EngineOptions) -> Result<(), EngineError>;
}
