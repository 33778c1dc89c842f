//! Error types for the file catalog.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while listing or serving stored files.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Requested name tries to leave the download directory
    #[error("Invalid filename")]
    InvalidFilename {
        /// The rejected name as requested
        name: String,
    },

    /// No regular file with that name exists
    #[error("File not found")]
    FileNotFound {
        /// The decoded name that was looked up
        name: String,
    },

    /// Reading the directory or a file's metadata failed
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Creates an `InvalidFilename` error.
    pub fn invalid_filename(name: impl Into<String>) -> Self {
        Self::InvalidFilename { name: name.into() }
    }

    /// Creates a `FileNotFound` error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::FileNotFound { name: name.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
