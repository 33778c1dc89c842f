//! Shared test doubles for integration tests.
//!
//! [`FakeEngine`] stands in for yt-dlp: it records every call with the
//! options it received and, on fetch, writes a small file where yt-dlp would.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bili_downloader::{EngineError, EngineOptions, MediaEngine, MediaMetadata};

/// Which engine method was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Probe,
    Fetch,
}

/// One recorded engine invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: Call,
    pub url: String,
    pub options: EngineOptions,
}

/// Scriptable in-memory engine.
#[derive(Debug, Default)]
pub struct FakeEngine {
    title: Option<String>,
    extension: String,
    probe_error: Option<String>,
    fetch_error: Option<String>,
    fetch_delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeEngine {
    /// Engine whose probe reports `title` and whose fetch succeeds.
    pub fn with_title(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            extension: "mp4".to_string(),
            ..Self::default()
        }
    }

    /// Engine whose probe reports no title.
    pub fn untitled() -> Self {
        Self {
            extension: "mp4".to_string(),
            ..Self::default()
        }
    }

    /// Makes the probe fail with the given yt-dlp style stderr.
    pub fn failing_probe(mut self, stderr: &str) -> Self {
        self.probe_error = Some(stderr.to_string());
        self
    }

    /// Makes the fetch fail with the given yt-dlp style stderr.
    pub fn failing_fetch(mut self, stderr: &str) -> Self {
        self.fetch_error = Some(stderr.to_string());
        self
    }

    /// Extension of the file written on fetch.
    pub fn extension(mut self, ext: &str) -> Self {
        self.extension = ext.to_string();
        self
    }

    /// Holds every fetch open for `delay`.
    pub fn fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls of one kind.
    pub fn calls_of(&self, call: Call) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.call == call).collect()
    }

    /// Highest number of fetches observed running at once.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call, url: &str, options: &EngineOptions) {
        self.calls.lock().unwrap().push(RecordedCall {
            call,
            url: url.to_string(),
            options: options.clone(),
        });
    }

    /// Path the fetch writes to, following the output template.
    pub fn output_path(&self, options: &EngineOptions) -> PathBuf {
        let title = self.title.as_deref().unwrap_or("NA");
        PathBuf::from(
            options
                .output_template
                .replace("%(title)s", title)
                .replace("%(ext)s", &self.extension),
        )
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn probe(
        &self,
        url: &str,
        options: &EngineOptions,
    ) -> Result<MediaMetadata, EngineError> {
        self.record(Call::Probe, url, options);
        if let Some(stderr) = &self.probe_error {
            return Err(EngineError::exited(Some(1), stderr.as_bytes()));
        }
        Ok(MediaMetadata {
            title: self.title.clone(),
            id: Some("BV1xx411c7mD".to_string()),
            ext: Some(self.extension.clone()),
        })
    }

    async fn fetch(&self, url: &str, options: &EngineOptions) -> Result<(), EngineError> {
        self.record(Call::Fetch, url, options);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(stderr) = &self.fetch_error {
            return Err(EngineError::exited(Some(1), stderr.as_bytes()));
        }
        let path = self.output_path(options);
        tokio::fs::write(&path, b"fake media payload")
            .await
            .map_err(|e| EngineError::io(&path, e))
    }
}
