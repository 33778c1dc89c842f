//! [`MediaEngine`] backed by the `yt-dlp` executable.
//!
//! Each call spawns one process. Nothing is killed when the caller goes
//! away, and no timeout is applied: a fetch runs for as long as yt-dlp needs.

use std::path::PathBuf;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::engine::{MediaEngine, MediaMetadata};
use super::error::EngineError;
use super::options::{EngineOptions, PostProcessor};

/// Default executable name, resolved through `PATH`.
pub const DEFAULT_YTDLP_BINARY: &str = "yt-dlp";

/// Drives yt-dlp as a subprocess.
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    binary: PathBuf,
}

impl YtDlpEngine {
    /// Creates an engine that runs the given executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Executable this engine runs.
    #[must_use]
    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    /// Arguments for a metadata-only probe.
    #[must_use]
    pub fn probe_args(url: &str, options: &EngineOptions) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
        ];
        push_common_args(&mut args, options);
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Arguments for the real fetch.
    #[must_use]
    pub fn fetch_args(url: &str, options: &EngineOptions) -> Vec<String> {
        let mut args = vec![
            "--no-progress".to_string(),
            "--output".to_string(),
            options.output_template.clone(),
        ];
        push_common_args(&mut args, options);

        if let Some(container) = &options.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(container.clone());
        }

        for post_processor in &options.post_processors {
            match post_processor {
                PostProcessor::ExtractAudio {
                    codec,
                    quality_kbps,
                } => {
                    args.push("--extract-audio".to_string());
                    args.push("--audio-format".to_string());
                    args.push(codec.clone());
                    args.push("--audio-quality".to_string());
                    args.push(format!("{quality_kbps}K"));
                }
            }
        }

        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<Output, EngineError> {
        let binary = self.binary.display().to_string();
        debug!(binary = %binary, ?args, "running engine");

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|e| EngineError::spawn(binary, e))?;

        if !output.status.success() {
            return Err(EngineError::exited(output.status.code(), &output.stderr));
        }
        Ok(output)
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new(DEFAULT_YTDLP_BINARY)
    }
}

fn push_common_args(args: &mut Vec<String>, options: &EngineOptions) {
    args.push("--format".to_string());
    args.push(options.format.clone());
    if let Some(cookies) = &options.cookie_file {
        args.push("--cookies".to_string());
        args.push(cookies.to_string_lossy().into_owned());
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    #[instrument(skip(self, options))]
    async fn probe(
        &self,
        url: &str,
        options: &EngineOptions,
    ) -> Result<MediaMetadata, EngineError> {
        let output = self.run(Self::probe_args(url, options)).await?;
        serde_json::from_slice(&output.stdout)
            .map_err(|source| EngineError::InvalidMetadata { source })
    }

    #[instrument(skip(self, options))]
    async fn fetch(&self, url: &str, options: &EngineOptions) -> Result<(), EngineError> {
        self.run(Self::fetch_args(url, options)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::download::options::ContentType;

    const URL: &str = "https://www.bilibili.com/video/BV1xx411c7mD";

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_probe_args_skip_download() {
        let opts = EngineOptions::build(ContentType::Video, false, Path::new("/dl"), None);
        let args = YtDlpEngine::probe_args(URL, &opts);
        assert!(args.contains(&"--dump-single-json".to_string()));
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(!args.contains(&"--output".to_string()));
        assert_eq!(args.last().map(String::as_str), Some(URL));
    }

    #[test]
    fn test_fetch_args_video() {
        let opts = EngineOptions::build(ContentType::Video, false, Path::new("/dl"), None);
        let args = YtDlpEngine::fetch_args(URL, &opts);
        assert_eq!(value_after(&args, "--output"), Some("/dl/%(title)s.%(ext)s"));
        assert_eq!(value_after(&args, "--format"), Some("bestvideo+bestaudio/best"));
        assert_eq!(value_after(&args, "--merge-output-format"), Some("mp4"));
        assert!(!args.contains(&"--extract-audio".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
    }

    #[test]
    fn test_fetch_args_audio_mp3() {
        let opts = EngineOptions::build(ContentType::Audio, true, Path::new("/dl"), None);
        let args = YtDlpEngine::fetch_args(URL, &opts);
        assert_eq!(value_after(&args, "--format"), Some("bestaudio/best"));
        assert!(args.contains(&"--extract-audio".to_string()));
        assert_eq!(value_after(&args, "--audio-format"), Some("mp3"));
        assert_eq!(value_after(&args, "--audio-quality"), Some("192K"));
        assert!(!args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn test_url_follows_end_of_options_marker() {
        let opts = EngineOptions::build(ContentType::Audio, false, Path::new("/dl"), None);
        let args = YtDlpEngine::fetch_args("-not-a-flag.bilibili.com", &opts);
        let n = args.len();
        assert_eq!(args[n - 2], "--");
        assert_eq!(args[n - 1], "-not-a-flag.bilibili.com");
    }

    #[test]
    fn test_cookie_file_passed_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let cookies = dir.path().join("cookies.txt");
        std::fs::write(&cookies, "").unwrap();
        let opts = EngineOptions::build(ContentType::Video, false, dir.path(), Some(&cookies));

        let expected = cookies.to_string_lossy().into_owned();
        assert_eq!(
            value_after(&YtDlpEngine::fetch_args(URL, &opts), "--cookies"),
            Some(expected.as_str())
        );
        assert_eq!(
            value_after(&YtDlpEngine::probe_args(URL, &opts), "--cookies"),
            Some(expected.as_str())
        );
    }

    #[test]
    fn test_default_engine_runs_ytdlp_from_path() {
        assert_eq!(YtDlpEngine::default().binary(), Path::new(DEFAULT_YTDLP_BINARY));
        assert_eq!(
            YtDlpEngine::new("/opt/bin/yt-dlp").binary(),
            Path::new("/opt/bin/yt-dlp")
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let engine = YtDlpEngine::new("/nonexistent/bin/yt-dlp-missing");
        let opts = EngineOptions::build(ContentType::Video, false, Path::new("/dl"), None);
        let err = engine.probe(URL, &opts).await.unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }), "got {err:?}");
    }
}
