//! Streaming archive download.
//!
//! This module downloads the manifest archive from the provider to a fixed
//! local path.
//!
//! # Features
//!
//! - Streaming downloads (memory use independent of archive size)
//! - Optional byte-level progress (total only when the server declares it)
//! - Configurable timeouts (30s connect, 5min read by default)
//! - Partial files are removed on every failure path
//!
//! # Example
//!
//! ```no_run
//! use manifest_core::download::ArchiveFetcher;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = ArchiveFetcher::new();
//! let archive = fetcher
//!     .fetch("https://example.com/world.content", Path::new("./manifest-data/manifest.zip"))
//!     .await?;
//! println!("{} bytes", archive.written_bytes);
//! # Ok(())
//! # }
//! ```

mod constants;
mod error;
mod fetcher;

pub use constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use error::DownloadError;
pub use fetcher::{ArchiveFetcher, DownloadProgress, DownloadedArchive};
