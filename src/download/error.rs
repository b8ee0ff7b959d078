//! Error types for the download module.
//!
//! This module defines structured errors for archive downloads,
//! providing context-rich error messages for debugging and user feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while streaming an archive to disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Connection, TLS, timeout or mid-stream failure, including a body that
    /// ended before its declared length and a malformed URL.
    #[error("transport error downloading {url}: {detail}")]
    Transport {
        /// The URL being downloaded.
        url: String,
        /// Human-readable detail.
        detail: String,
        /// The underlying network error, when there is one.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} downloading {url}")]
    UnexpectedStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Local file system error (create, write, flush).
    #[error("IO error writing to {path}: {source}")]
    Write {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a transport error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let detail = if source.is_timeout() {
            "request timed out".to_string()
        } else {
            source.to_string()
        };
        Self::Transport {
            url: url.into(),
            detail,
            source: Some(source),
        }
    }

    /// Creates a transport error with no underlying network error.
    pub fn transport(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            detail: detail.into(),
            source: None,
        }
    }

    /// Creates an HTTP status error.
    pub fn unexpected_status(url: impl Into<String>, status: u16) -> Self {
        Self::UnexpectedStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

// Context (url, path) is required on every variant, so there are no blanket
// `From<reqwest::Error>` / `From<std::io::Error>` impls; use the constructors.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_includes_url_and_detail() {
        let error = DownloadError::transport("https://example.com/m.zip", "body ended early");
        let msg = error.to_string();
        assert!(msg.contains("https://example.com/m.zip"), "Expected URL in: {msg}");
        assert!(msg.contains("body ended early"), "Expected detail in: {msg}");
    }

    #[test]
    fn test_unexpected_status_display() {
        let error = DownloadError::unexpected_status("https://example.com/m.zip", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
    }

    #[test]
    fn test_write_display_includes_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::write(PathBuf::from("/tmp/manifest.zip"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/manifest.zip"), "Expected path in: {msg}");
    }
}
