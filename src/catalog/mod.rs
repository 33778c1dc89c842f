//! Listing and lookup of files in the flat download directory.
//!
//! The directory itself is the catalog: nothing is cached, every call reads
//! what is on disk right now (including files the engine is still writing).

mod error;

pub use error::CatalogError;

use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, warn};

/// Format of `created_date` / `modified_date`, local time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// One regular file in the download directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    /// File name (no directory part)
    pub name: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Size for humans, e.g. `1.50 KB`
    pub size_formatted: String,
    /// Creation time (falls back to modification time where unsupported)
    pub created_date: String,
    /// Last modification time
    pub modified_date: String,
    /// Relative link to the download endpoint
    pub download_url: String,
}

/// A validated request for a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Decoded file name, used for `Content-Disposition`
    pub name: String,
    /// Absolute or base-relative path on disk
    pub path: PathBuf,
    /// Size in bytes at lookup time
    pub size_bytes: u64,
}

/// Read-only view over the download directory.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    dir: PathBuf,
}

impl FileCatalog {
    /// Creates a catalog over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Lists regular files, newest modification first.
    ///
    /// Subdirectories are skipped. Entries that vanish between the directory
    /// read and the metadata call are skipped as well.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the directory cannot be read.
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn list(&self) -> Result<Vec<StoredFile>, CatalogError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| CatalogError::io(&self.dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CatalogError::io(&self.dir, e))?
        {
            let path = entry.path();
            // follows symlinks, like a plain "is this a file" check would
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let modified = metadata.modified().ok();
            let created = metadata.created().ok().or(modified);
            files.push(StoredFile {
                download_url: download_url(&name),
                size_bytes: metadata.len(),
                size_formatted: format_file_size(metadata.len()),
                created_date: created.map(format_timestamp).unwrap_or_default(),
                modified_date: modified.map(format_timestamp).unwrap_or_default(),
                name,
            });
        }

        // Fixed-width timestamps sort chronologically as strings.
        files.sort_by(|a, b| b.modified_date.cmp(&a.modified_date));
        debug!(count = files.len(), "listed download directory");
        Ok(files)
    }

    /// Resolves a file name to a regular file inside the directory.
    ///
    /// `name` must already be percent-decoded (the router's path extractor
    /// does this); it is used verbatim, so names containing `%` round-trip
    /// through [`download_url`]. It is checked before any filesystem access.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidFilename`] for names with a `..` segment or a
    ///   leading separator
    /// - [`CatalogError::FileNotFound`] if no regular file has that name
    pub async fn resolve(&self, name: &str) -> Result<ResolvedFile, CatalogError> {
        validate_filename(name)?;
        let name = name.to_string();
        let path = self.dir.join(&name);

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(ResolvedFile {
                name,
                path,
                size_bytes: metadata.len(),
            }),
            _ => Err(CatalogError::not_found(name)),
        }
    }
}

/// Rejects names that could escape the download directory.
///
/// Dots inside a name (`Wait... what.mp4`) are fine; only a `..` path
/// segment, a root or drive prefix, or a leading `/` or `\` is rejected.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidFilename`] on traversal attempts and empty
/// names.
pub fn validate_filename(name: &str) -> Result<(), CatalogError> {
    if name.is_empty() || is_unsafe_name(name) {
        warn!(name = %name, "rejected filename");
        return Err(CatalogError::invalid_filename(name));
    }
    Ok(())
}

fn is_unsafe_name(name: &str) -> bool {
    name.starts_with('/')
        || name.starts_with('\\')
        || Path::new(name).components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        })
}

/// Relative link to the download endpoint for `name`.
#[must_use]
pub fn download_url(name: &str) -> String {
    format!("/download/{}/", urlencoding::encode(name))
}

/// Formats a byte count as B, KB, MB or GB (two decimals above bytes).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes < KIB {
        format!("{size_bytes} B")
    } else if size_bytes < MIB {
        format!("{:.2} KB", size_bytes as f64 / KIB as f64)
    } else if size_bytes < GIB {
        format!("{:.2} MB", size_bytes as f64 / MIB as f64)
    } else {
        format!("{:.2} GB", size_bytes as f64 / GIB as f64)
    }
}

/// Formats a filesystem timestamp as `YYYY-MM-DD HH:MM:SS` local time.
#[must_use]
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
