//! Archive fetcher: streams one archive URL to a fixed local path.
//!
//! The response body is copied chunk by chunk through a bounded write buffer,
//! so memory use does not grow with the archive size. Any failure after the
//! destination file is opened removes it before the error is returned.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, WRITE_BUFFER_BYTES};
use super::error::DownloadError;
use crate::http::{ReadTimeout, build_http_client};

/// Byte-level progress of a running download.
///
/// `total_bytes` is the declared content length and is `None` when the
/// server did not send one; consumers must not derive a percentage then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes written to the destination so far.
    pub written_bytes: u64,
    /// Declared size of the body, when known.
    pub total_bytes: Option<u64>,
}

impl DownloadProgress {
    /// Completed fraction in `0.0..=1.0`, or `None` when the total is unknown or zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> Option<f64> {
        self.total_bytes
            .filter(|total| *total > 0)
            .map(|total| (self.written_bytes as f64 / total as f64).min(1.0))
    }
}

/// A fully written archive on disk.
///
/// Only produced on success; a failed fetch never yields one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArchive {
    /// Location of the archive file.
    pub path: PathBuf,
    /// Declared content length, when the server sent one.
    pub total_bytes: Option<u64>,
    /// Bytes actually written.
    pub written_bytes: u64,
}

/// HTTP client for archive downloads.
///
/// Create once and reuse; the inner client pools connections.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: Client,
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveFetcher {
    /// Creates a fetcher with default timeouts (30s connect, 5min read).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a fetcher with explicit timeout values.
    ///
    /// `read_timeout_secs` bounds how long the connection may stay silent,
    /// not the length of the whole transfer.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied timeouts.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client =
            build_http_client(connect_timeout_secs, ReadTimeout::BetweenReads(read_timeout_secs))
                .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Downloads `url` to `destination`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// See [`fetch_with_progress`](Self::fetch_with_progress).
    pub async fn fetch(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<DownloadedArchive, DownloadError> {
        self.fetch_with_progress(url, destination, |_| {}).await
    }

    /// Downloads `url` to `destination`, calling `on_progress` after every chunk.
    ///
    /// There is no resume: an existing file at `destination` is truncated.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Transport`] for a malformed URL, connection/TLS/timeout
    ///   failure, a stream error, or a body shorter than its declared length
    /// - [`DownloadError::UnexpectedStatus`] for a non-2xx response
    /// - [`DownloadError::Write`] when the destination cannot be written
    ///
    /// On any error after `destination` was opened, the partial file is removed.
    #[instrument(skip(self, on_progress), fields(url = %url, path = %destination.display()))]
    pub async fn fetch_with_progress<F>(
        &self,
        url: &str,
        destination: &Path,
        mut on_progress: F,
    ) -> Result<DownloadedArchive, DownloadError>
    where
        F: FnMut(DownloadProgress),
    {
        debug!("starting archive download");

        Url::parse(url).map_err(|e| DownloadError::transport(url, format!("invalid URL: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::unexpected_status(url, status.as_u16()));
        }

        let total_bytes = response.content_length();
        debug!(?total_bytes, "response accepted");

        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::write(destination, e))?;

        let stream_result = stream_to_file(
            &mut file,
            response,
            url,
            destination,
            total_bytes,
            &mut on_progress,
        )
        .await;
        drop(file);

        let written_bytes = match stream_result {
            Ok(written) => written,
            Err(error) => {
                debug!(path = %destination.display(), "cleaning up partial archive after error");
                let _ = tokio::fs::remove_file(destination).await;
                return Err(error);
            }
        };

        info!(
            path = %destination.display(),
            bytes = written_bytes,
            "archive download complete"
        );

        Ok(DownloadedArchive {
            path: destination.to_path_buf(),
            total_bytes,
            written_bytes,
        })
    }
}

/// Streams the response body to `file`, returning bytes written.
///
/// Kept separate so the caller can clean up on any error.
async fn stream_to_file<F>(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    total_bytes: Option<u64>,
    on_progress: &mut F,
) -> Result<u64, DownloadError>
where
    F: FnMut(DownloadProgress),
{
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_BYTES, file);
    let mut stream = response.bytes_stream();
    let mut written_bytes: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::write(file_path, e))?;

        written_bytes += chunk.len() as u64;
        on_progress(DownloadProgress {
            written_bytes,
            total_bytes,
        });
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::write(file_path, e))?;

    if let Some(expected) = total_bytes
        && written_bytes < expected
    {
        return Err(DownloadError::transport(
            url,
            format!("body ended after {written_bytes} of {expected} bytes"),
        ));
    }

    Ok(written_bytes)
}
