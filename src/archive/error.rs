//! Error types for archive extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`super::extract_archive`].
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The container cannot be opened or its entry data cannot be decoded.
    #[error("corrupt archive {path}: {detail}")]
    CorruptArchive {
        /// Archive that failed.
        path: PathBuf,
        /// What went wrong.
        detail: String,
    },

    /// The container holds no entries.
    #[error("archive {path} contains no entries")]
    EmptyArchive {
        /// Archive that was empty.
        path: PathBuf,
    },

    /// Disk error while writing the decompressed payload.
    #[error("IO error extracting to {path}: {source}")]
    ExtractionIo {
        /// File being written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// Creates a `CorruptArchive` error.
    pub fn corrupt(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::CorruptArchive {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Creates an `EmptyArchive` error.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::EmptyArchive { path: path.into() }
    }

    /// Creates an `ExtractionIo` error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ExtractionIo {
            path: path.into(),
            source,
        }
    }
}
