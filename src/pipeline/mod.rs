//! End-to-end manifest pipeline.
//!
//! Two steps share one data directory:
//!
//! - **download**: resolve the manifest, fetch the archive, extract the
//!   store, summarise its tables, persist the run record
//! - **explore**: load the run record, inspect the store, classify items,
//!   write the category index
//!
//! # Example
//!
//! ```no_run
//! use manifest_core::config::PipelineConfig;
//! use manifest_core::pipeline::{ManifestPipeline, credential_from_env};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = ManifestPipeline::new(PipelineConfig::default());
//! let key = credential_from_env()?;
//! let summary = pipeline.download(&key, |_| {}).await?;
//! println!("manifest {}", summary.record.version);
//!
//! let report = pipeline.explore().await?;
//! println!("top category: {:?}", report.categories.top());
//! # Ok(())
//! # }
//! ```

mod cancel;
mod error;
mod layout;
mod runner;

pub use cancel::CancelFlag;
pub use error::{PipelineError, Stage};
pub use layout::{DataLayout, RunRecord};
pub use runner::{
    DownloadSummary, ExploreReport, ManifestPipeline, TableSummary, credential_from_env,
};
