//! Manifest archive extraction.
//!
//! The provider ships the manifest store as a ZIP holding a single entry.
//! Extraction takes the first entry unconditionally, writes it to a fixed
//! path so later stages never see the provider's entry name, and deletes
//! the archive afterwards on success and failure alike.

mod error;
mod extract;

pub use error::ExtractError;
pub use extract::{ExtractedStore, STORE_FILE_NAME, extract_archive, extract_archive_to};
