//! Bili Downloader Library
//!
//! A small web front end around yt-dlp: it accepts a Bilibili URL or BV id,
//! has yt-dlp write the video (or audio) into one flat directory, and serves
//! that directory back as a JSON listing plus file downloads.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Input classification (URL, BV id, bare id, domain fragment)
//! - [`download`] - Engine options, the [`MediaEngine`] seam, and orchestration
//! - [`catalog`] - Listing and lookup of stored files
//! - [`server`] - HTTP routes and request-boundary error mapping
//! - [`config`] - Defaults, config file, and command-line overrides

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod download;
pub mod parser;
pub mod server;

// Re-export commonly used types
pub use catalog::{CatalogError, FileCatalog, StoredFile, format_file_size};
pub use config::{AppConfig, ConfigError};
pub use download::{
    ContentType, DownloadRequest, DownloadResult, DownloadStatus, EngineError, EngineOptions,
    MediaEngine, MediaMetadata, Orchestrator, YtDlpEngine,
};
pub use parser::{ClassifyError, InputType, ResolvedTarget, classify_input};
pub use server::{ApiError, AppState, router};
