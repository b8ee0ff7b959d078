//! Stage orchestration for the download and explore steps.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::cancel::CancelFlag;
use super::error::{PipelineError, Stage};
use super::layout::{DataLayout, RunRecord, write_replacing};
use crate::analyzer::codes::item_type;
use crate::analyzer::{
    CategoryAnalyzer, CategoryIndex, ItemKind, ItemProbe, SubclassFamily, TypeBucket,
    kind_counts, parse_category_catalog, samples_of_kind, type_distribution,
};
use crate::archive::{ExtractedStore, extract_archive};
use crate::config::{API_KEY_ENV_VAR, PipelineConfig};
use crate::download::{ArchiveFetcher, DownloadProgress, DownloadedArchive};
use crate::manifest::{ApiKey, ManifestResolver};
use crate::store::{ColumnDescriptor, StoreError, StoreInspector};

/// Row count and width of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub name: String,
    pub row_count: u64,
    pub column_count: usize,
}

/// Result of a successful download step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Absolute URL the archive came from.
    pub archive_url: String,
    pub archive: DownloadedArchive,
    pub store: ExtractedStore,
    /// Tables of the new store, ascending by name.
    pub tables: Vec<TableSummary>,
    /// The record that was persisted.
    pub record: RunRecord,
}

/// Result of a successful explore step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreReport {
    pub record: RunRecord,
    pub item_table: String,
    pub item_columns: Vec<ColumnDescriptor>,
    pub item_count: u64,
    /// First few item records, probed.
    pub samples: Vec<ItemProbe>,
    pub catalog_size: usize,
    /// Catalog entries that are visible and not deprecated.
    pub visible_categories: usize,
    pub type_distribution: Vec<TypeBucket>,
    pub kind_counts: BTreeMap<ItemKind, u64>,
    /// A few active examples of the main equipment kinds.
    pub kind_samples: BTreeMap<ItemKind, Vec<ItemProbe>>,
    pub subclass_families: BTreeMap<SubclassFamily, u64>,
    pub categories: CategoryIndex,
    /// Where the category index was written.
    pub category_index_path: PathBuf,
}

/// Reads the API key from the credential environment variable.
///
/// # Errors
///
/// [`PipelineError::MissingCredential`] when the variable is unset or blank.
pub fn credential_from_env() -> Result<ApiKey, PipelineError> {
    ApiKey::from_env(API_KEY_ENV_VAR).ok_or_else(|| PipelineError::MissingCredential {
        variable: API_KEY_ENV_VAR.to_string(),
    })
}

/// Runs the download and explore steps against one data directory.
///
/// Stages run strictly one after another. A stage only hands off after it
/// fully succeeded, and the cancel flag is checked before each stage.
#[derive(Debug, Clone)]
pub struct ManifestPipeline {
    config: PipelineConfig,
    layout: DataLayout,
    cancel: CancelFlag,
}

impl ManifestPipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let layout = DataLayout::new(config.data_dir.clone());
        Self {
            config,
            layout,
            cancel: CancelFlag::new(),
        }
    }

    /// Uses `cancel` instead of a private flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    #[must_use]
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Resolve, fetch, extract, then summarise the new store and persist the
    /// run record.
    ///
    /// The previous run record is removed just before extraction replaces the
    /// store. A failure from then on leaves no record, and `explore` reports
    /// [`PipelineError::MissingRunRecord`] until a download succeeds.
    ///
    /// # Errors
    ///
    /// The first failing stage's error, or [`PipelineError::Cancelled`].
    #[instrument(skip(self, api_key, on_progress), fields(language = %self.config.language))]
    pub async fn download<F>(
        &self,
        api_key: &ApiKey,
        on_progress: F,
    ) -> Result<DownloadSummary, PipelineError>
    where
        F: FnMut(DownloadProgress),
    {
        self.cancel.checkpoint(Stage::Resolve)?;
        let data_dir = self.layout.root().to_path_buf();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| PipelineError::output(Stage::Resolve, &data_dir, e))?;

        let resolver = ManifestResolver::with_timeouts(
            self.config.base_url.clone(),
            self.config.metadata_connect_timeout_secs,
            self.config.metadata_read_timeout_secs,
        )?;
        let descriptor = resolver.resolve(api_key).await?;
        let language = self.config.language.as_str();
        let archive_url = descriptor
            .archive_url(&self.config.base_url, language)
            .ok_or_else(|| PipelineError::LanguageUnavailable {
                language: language.to_string(),
                version: descriptor.version.clone(),
                available: descriptor.languages().collect::<Vec<_>>().join(", "),
            })?;
        info!(version = %descriptor.version, url = %archive_url, "manifest resolved");

        self.cancel.checkpoint(Stage::Fetch)?;
        let fetcher = ArchiveFetcher::new_with_timeouts(
            self.config.download_connect_timeout_secs,
            self.config.download_read_timeout_secs,
        );
        let archive = fetcher
            .fetch_with_progress(&archive_url, &self.layout.archive_path(), on_progress)
            .await?;

        if let Err(cancelled) = self.cancel.checkpoint(Stage::Extract) {
            let _ = tokio::fs::remove_file(&archive.path).await;
            return Err(cancelled);
        }
        // The old record must not outlive the store it describes.
        if let Err(error) = RunRecord::discard(&self.layout.run_record_path()).await {
            let _ = tokio::fs::remove_file(&archive.path).await;
            return Err(error);
        }
        let archive_path = archive.path.clone();
        let store = tokio::task::spawn_blocking(move || extract_archive(&archive_path, &data_dir))
            .await
            .map_err(|e| PipelineError::Worker {
                stage: Stage::Extract,
                detail: e.to_string(),
            })??;

        self.cancel.checkpoint(Stage::Inspect)?;
        let inspector = StoreInspector::open_read_only(&store.path).await?;
        let mut tables = Vec::new();
        for table in inspector.list_tables().await? {
            let row_count = inspector.count_rows(&table.name).await?;
            tables.push(TableSummary {
                name: table.name,
                row_count,
                column_count: table.columns.len(),
            });
        }
        info!(tables = tables.len(), "store inspected");

        self.cancel.checkpoint(Stage::Record)?;
        let record = RunRecord {
            version: descriptor.version.clone(),
            download_date: Utc::now(),
            db_path: store.path.clone(),
            tables: tables.iter().map(|t| t.name.clone()).collect(),
            language: language.to_string(),
            table_counts: tables.iter().map(|t| (t.name.clone(), t.row_count)).collect(),
        };
        record.save(&self.layout.run_record_path()).await?;
        info!(version = %record.version, "download step complete");

        Ok(DownloadSummary {
            archive_url,
            archive,
            store,
            tables,
            record,
        })
    }

    /// Inspect the stored manifest, classify its items, and write the category index.
    ///
    /// # Errors
    ///
    /// [`PipelineError::MissingRunRecord`] before any download, otherwise the
    /// first failing stage's error or [`PipelineError::Cancelled`].
    #[instrument(skip(self), fields(data_dir = %self.layout.root().display()))]
    pub async fn explore(&self) -> Result<ExploreReport, PipelineError> {
        self.cancel.checkpoint(Stage::Record)?;
        let record = RunRecord::load(&self.layout.run_record_path()).await?;

        self.cancel.checkpoint(Stage::Inspect)?;
        let inspector = StoreInspector::open_read_only(self.layout.store_path()).await?;
        let item_table = self.config.item_table.clone();
        let item_columns = inspector
            .list_tables()
            .await?
            .into_iter()
            .find(|table| table.name == item_table)
            .map(|table| table.columns)
            .ok_or_else(|| StoreError::unknown_table(&item_table))?;
        let item_count = inspector.count_rows(&item_table).await?;
        let samples: Vec<ItemProbe> = inspector
            .sample_rows(&item_table, self.config.sample_size, 0)
            .await?
            .iter()
            .map(ItemProbe::from_record)
            .collect();

        self.cancel.checkpoint(Stage::Analyze)?;
        let records = inspector.scan_records(&item_table).await?;
        let catalog = if inspector.has_table(&self.config.category_table).await? {
            parse_category_catalog(&inspector.scan_records(&self.config.category_table).await?)
        } else {
            warn!(
                table = %self.config.category_table,
                "category table not found; ranking will carry no definitions"
            );
            BTreeMap::new()
        };
        let catalog_size = catalog.len();
        let categories = CategoryAnalyzer::new(self.config.top_categories)
            .classify_with_catalog(&records, catalog);

        let probes: Vec<ItemProbe> = records.iter().map(ItemProbe::from_record).collect();
        let sample_limit = usize::try_from(self.config.sample_size).unwrap_or(usize::MAX);
        let kind_samples: BTreeMap<ItemKind, Vec<ItemProbe>> =
            [ItemKind::Armor, ItemKind::Weapon, ItemKind::Subclass]
                .into_iter()
                .map(|kind| {
                    let samples: Vec<ItemProbe> = samples_of_kind(&probes, kind, sample_limit)
                        .into_iter()
                        .cloned()
                        .collect();
                    (kind, samples)
                })
                .collect();
        let mut subclass_families: BTreeMap<SubclassFamily, u64> = BTreeMap::new();
        for probe in probes.iter().filter(|p| p.is_active()) {
            if probe.item_type == item_type::SUBCLASS {
                *subclass_families.entry(SubclassFamily::of(probe)).or_default() += 1;
            }
        }

        self.cancel.checkpoint(Stage::Record)?;
        let category_index_path = self.layout.category_index_path();
        let json = serde_json::to_vec_pretty(&categories)
            .map_err(|e| PipelineError::run_record(&category_index_path, e.to_string()))?;
        write_replacing(&category_index_path, &json)
            .await
            .map_err(|e| PipelineError::output(Stage::Record, &category_index_path, e))?;
        info!(
            path = %category_index_path.display(),
            ranked = categories.ranking.len(),
            "category index written"
        );

        Ok(ExploreReport {
            visible_categories: categories.visible_definitions().count(),
            type_distribution: type_distribution(&probes, self.config.top_categories),
            kind_counts: kind_counts(&probes),
            record,
            item_table,
            item_columns,
            item_count,
            samples,
            catalog_size,
            kind_samples,
            subclass_families,
            categories,
            category_index_path,
        })
    }
}
