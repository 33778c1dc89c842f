//! Engine configuration built from a download request.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Format selector for muxed video downloads.
pub const VIDEO_FORMAT: &str = "bestvideo+bestaudio/best";

/// Format selector for audio-only downloads.
pub const AUDIO_FORMAT: &str = "bestaudio/best";

/// Container the engine merges video and audio streams into.
pub const VIDEO_CONTAINER: &str = "mp4";

/// Target bitrate (kbps) for MP3 transcoding.
pub const MP3_QUALITY_KBPS: u32 = 192;

/// Output name relative to the target directory, expanded by the engine.
pub const OUTPUT_NAME_TEMPLATE: &str = "%(title)s.%(ext)s";

/// What a request wants to keep from the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Best video and audio streams merged into one MP4 file
    #[default]
    Video,
    /// Best audio-only stream
    Audio,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// Post-processing step the engine runs after the fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    /// Extract the audio track and transcode it.
    ExtractAudio {
        /// Target codec (e.g. `mp3`)
        codec: String,
        /// Target quality in kbps
        quality_kbps: u32,
    },
}

impl PostProcessor {
    /// MP3 extraction at the fixed target quality.
    #[must_use]
    pub fn mp3() -> Self {
        Self::ExtractAudio {
            codec: "mp3".to_string(),
            quality_kbps: MP3_QUALITY_KBPS,
        }
    }
}

/// Everything the engine needs to know besides the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Full output path template, always inside the target directory
    pub output_template: String,
    /// Stream selection expression
    pub format: String,
    /// Container to merge separate streams into, if any
    pub merge_output_format: Option<String>,
    /// Steps to run after the fetch
    pub post_processors: Vec<PostProcessor>,
    /// Netscape-format cookie file for authenticated fetches
    pub cookie_file: Option<PathBuf>,
}

impl EngineOptions {
    /// Builds engine options for one download.
    ///
    /// The cookie file is only kept when it exists on disk; otherwise the
    /// fetch is anonymous. `convert_to_mp3` is ignored for video downloads.
    #[must_use]
    pub fn build(
        content_type: ContentType,
        convert_to_mp3: bool,
        target_dir: &Path,
        cookie_file: Option<&Path>,
    ) -> Self {
        let output_template = target_dir
            .join(OUTPUT_NAME_TEMPLATE)
            .to_string_lossy()
            .into_owned();
        let cookie_file = cookie_file.filter(|path| path.is_file()).map(Path::to_path_buf);

        match content_type {
            ContentType::Video => Self {
                output_template,
                format: VIDEO_FORMAT.to_string(),
                merge_output_format: Some(VIDEO_CONTAINER.to_string()),
                post_processors: Vec::new(),
                cookie_file,
            },
            ContentType::Audio => Self {
                output_template,
                format: AUDIO_FORMAT.to_string(),
                merge_output_format: None,
                post_processors: if convert_to_mp3 {
                    vec![PostProcessor::mp3()]
                } else {
                    Vec::new()
                },
                cookie_file,
            },
        }
    }

    /// Returns true if an MP3 extraction step is configured.
    #[must_use]
    pub fn converts_to_mp3(&self) -> bool {
        self.post_processors.iter().any(|pp| {
            matches!(pp, PostProcessor::ExtractAudio { codec, .. } if codec == "mp3")
        })
    }
}
