//! Manifest Explorer Core Library
//!
//! This library downloads the provider's versioned content manifest,
//! unpacks the embedded SQLite store, and analyses the item definitions it
//! holds.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`manifest`] - Metadata resolution against the provider API
//! - [`download`] - Streaming archive download
//! - [`archive`] - Single-entry archive extraction
//! - [`store`] - Read-only inspection of the extracted store
//! - [`analyzer`] - Item probing, classification and category ranking
//! - [`pipeline`] - Stage orchestration, run record, cancellation
//! - [`config`] - Defaults and pipeline settings

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analyzer;
pub mod archive;
pub mod config;
pub mod download;
mod http;
pub mod manifest;
pub mod pipeline;
pub mod store;
pub(crate) mod user_agent;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types
pub use analyzer::{CategoryAnalyzer, CategoryIndex, ItemKind, ItemProbe, classify};
pub use archive::{ExtractError, ExtractedStore, extract_archive};
pub use config::PipelineConfig;
pub use download::{ArchiveFetcher, DownloadError, DownloadProgress, DownloadedArchive};
pub use manifest::{ApiKey, ManifestDescriptor, ManifestError, ManifestResolver};
pub use pipeline::{
    CancelFlag, DataLayout, ExploreReport, ManifestPipeline, PipelineError, RunRecord, Stage,
};
pub use store::{Record, StoreError, StoreInspector, TableDescriptor};
