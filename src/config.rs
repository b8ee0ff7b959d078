//! Runtime configuration for a pipeline run.
//!
//! Every field has a working default so the pipeline can run against the
//! public provider with nothing but a credential.

use std::path::PathBuf;

/// Default provider origin; content paths in the manifest are relative to it.
pub const DEFAULT_BASE_URL: &str = "https://www.bungie.net";

/// Path of the metadata endpoint, relative to the base URL.
pub const MANIFEST_ENDPOINT: &str = "/Platform/Destiny2/Manifest/";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV_VAR: &str = "BUNGIE_API_KEY";

/// Default content language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default local data directory.
pub const DEFAULT_DATA_DIR: &str = "./manifest-data";

/// Metadata client connect timeout (10 seconds).
pub const METADATA_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Metadata client read timeout (30 seconds).
pub const METADATA_READ_TIMEOUT_SECS: u64 = 30;

/// Number of entries kept in the category frequency ranking.
pub const DEFAULT_TOP_CATEGORIES: usize = 20;

/// Number of sample records shown per table during exploration.
pub const DEFAULT_SAMPLE_SIZE: u32 = 3;

/// Table holding item definitions.
pub const DEFAULT_ITEM_TABLE: &str = "DestinyInventoryItemDefinition";

/// Table holding the category catalog.
pub const DEFAULT_CATEGORY_TABLE: &str = "DestinyItemCategoryDefinition";

/// Settings consumed by [`crate::pipeline::ManifestPipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Provider origin, e.g. `https://www.bungie.net`.
    pub base_url: String,
    /// Language key looked up in the manifest's content path maps.
    pub language: String,
    /// Directory holding the extracted store, run record and category index.
    pub data_dir: PathBuf,
    /// Metadata client connect timeout in seconds.
    pub metadata_connect_timeout_secs: u64,
    /// Metadata client read timeout in seconds.
    pub metadata_read_timeout_secs: u64,
    /// Archive client connect timeout in seconds.
    pub download_connect_timeout_secs: u64,
    /// Archive client read timeout in seconds.
    pub download_read_timeout_secs: u64,
    /// Size of the category ranking.
    pub top_categories: usize,
    /// Item definition table scanned by the analyzer.
    pub item_table: String,
    /// Category catalog table joined against the ranking.
    pub category_table: String,
    /// Sample records per table in the explore report.
    pub sample_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            metadata_connect_timeout_secs: METADATA_CONNECT_TIMEOUT_SECS,
            metadata_read_timeout_secs: METADATA_READ_TIMEOUT_SECS,
            download_connect_timeout_secs: crate::download::CONNECT_TIMEOUT_SECS,
            download_read_timeout_secs: crate::download::READ_TIMEOUT_SECS,
            top_categories: DEFAULT_TOP_CATEGORIES,
            item_table: DEFAULT_ITEM_TABLE.to_string(),
            category_table: DEFAULT_CATEGORY_TABLE.to_string(),
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_public_provider() {
        let config = PipelineConfig::default();
        assert_eq!(config.base_url, "https://www.bungie.net");
        assert_eq!(config.language, "en");
        assert_eq!(config.data_dir, PathBuf::from("./manifest-data"));
        assert_eq!(config.top_categories, 20);
        assert_eq!(config.download_read_timeout_secs, 300);
    }
}
