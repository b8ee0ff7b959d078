//! Fixed file layout of the data directory and the persisted run record.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::PipelineError;
use crate::archive::STORE_FILE_NAME;

const ARCHIVE_FILE_NAME: &str = "manifest.zip";
const RUN_RECORD_FILE_NAME: &str = "manifest-info.json";
const CATEGORY_INDEX_FILE_NAME: &str = "categories.json";
const LOCK_FILE_NAME: &str = ".lock";

/// Stable paths inside the data directory.
///
/// These are process-wide singletons: two runs against the same directory
/// must be serialised by the caller (see [`Self::lock_path`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the downloaded archive lives until extraction deletes it.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE_NAME)
    }

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.root.join(STORE_FILE_NAME)
    }

    #[must_use]
    pub fn run_record_path(&self) -> PathBuf {
        self.root.join(RUN_RECORD_FILE_NAME)
    }

    #[must_use]
    pub fn category_index_path(&self) -> PathBuf {
        self.root.join(CATEGORY_INDEX_FILE_NAME)
    }

    /// Advisory lock file for serialising runs.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE_NAME)
    }
}

/// What the last successful download produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    /// Manifest version that was downloaded.
    pub version: String,
    /// When the download finished (RFC 3339).
    pub download_date: DateTime<Utc>,
    /// Location of the extracted store.
    pub db_path: PathBuf,
    /// Table names, ascending.
    pub tables: Vec<String>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub table_counts: BTreeMap<String, u64>,
}

impl RunRecord {
    /// Reads the record at `path`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::MissingRunRecord`] when the file does not exist,
    /// [`PipelineError::RunRecord`] when it cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PipelineError::MissingRunRecord {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(PipelineError::run_record(path, e.to_string())),
        };
        serde_json::from_slice(&raw)
            .map_err(|e| PipelineError::run_record(path, format!("invalid JSON: {e}")))
    }

    /// Removes the record at `path`, if there is one.
    ///
    /// Called before a new store replaces the old one, so a download that
    /// fails afterwards leaves no record describing a store that is gone.
    ///
    /// # Errors
    ///
    /// [`PipelineError::RunRecord`] when an existing file cannot be removed.
    pub async fn discard(path: &Path) -> Result<(), PipelineError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "previous run record discarded");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipelineError::run_record(path, e.to_string())),
        }
    }

    /// Writes the record to `path`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// [`PipelineError::RunRecord`] when serialisation or the write fails.
    pub async fn save(&self, path: &Path) -> Result<(), PipelineError> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| PipelineError::run_record(path, e.to_string()))?;
        write_replacing(path, &json)
            .await
            .map_err(|e| PipelineError::run_record(path, e.to_string()))?;
        debug!(path = %path.display(), "run record written");
        Ok(())
    }
}

/// Writes `contents` next to `path` and renames it into place.
pub(crate) async fn write_replacing(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut temp_name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Err(e) = tokio::fs::write(&temp_path, contents).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> RunRecord {
        RunRecord {
            version: "230101.1".to_string(),
            download_date: DateTime::parse_from_rfc3339("2026-10-19T08:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
            db_path: PathBuf::from("./manifest-data/manifest.db"),
            tables: vec!["Items".to_string()],
            language: "en".to_string(),
            table_counts: BTreeMap::from([("Items".to_string(), 3)]),
        }
    }

    #[test]
    fn test_layout_paths() {
        let layout = DataLayout::new("/data");
        assert_eq!(layout.archive_path(), PathBuf::from("/data/manifest.zip"));
        assert_eq!(layout.store_path(), PathBuf::from("/data/manifest.db"));
        assert_eq!(layout.run_record_path(), PathBuf::from("/data/manifest-info.json"));
        assert_eq!(layout.category_index_path(), PathBuf::from("/data/categories.json"));
        assert_eq!(layout.lock_path(), PathBuf::from("/data/.lock"));
    }

    #[tokio::test]
    async fn test_run_record_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest-info.json");
        let record = sample_record();

        record.save(&path).await.unwrap();
        let loaded = RunRecord::load(&path).await.unwrap();

        assert_eq!(loaded, record);
        assert!(!temp_dir.path().join("manifest-info.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_run_record_uses_camel_case_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest-info.json");

        sample_record().save(&path).await.unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();

        assert_eq!(value["version"], "230101.1");
        assert_eq!(value["downloadDate"], "2026-10-19T08:30:00Z");
        assert_eq!(value["dbPath"], "./manifest-data/manifest.db");
        assert_eq!(value["tables"][0], "Items");
    }

    #[tokio::test]
    async fn test_run_record_without_optional_fields_loads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest-info.json");
        std::fs::write(
            &path,
            r#"{"version":"1","downloadDate":"2024-01-01T00:00:00.000Z","dbPath":"x.db","tables":[]}"#,
        )
        .unwrap();

        let record = RunRecord::load(&path).await.unwrap();

        assert_eq!(record.version, "1");
        assert!(record.language.is_empty());
        assert!(record.table_counts.is_empty());
    }

    #[tokio::test]
    async fn test_missing_run_record() {
        let temp_dir = TempDir::new().unwrap();
        let result = RunRecord::load(&temp_dir.path().join("manifest-info.json")).await;
        assert!(matches!(result, Err(PipelineError::MissingRunRecord { .. })));
    }

    #[tokio::test]
    async fn test_discard_removes_record_and_tolerates_absence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest-info.json");
        sample_record().save(&path).await.unwrap();

        RunRecord::discard(&path).await.unwrap();
        assert!(!path.exists());
        RunRecord::discard(&path).await.unwrap();

        let result = RunRecord::load(&path).await;
        assert!(matches!(result, Err(PipelineError::MissingRunRecord { .. })));
    }

    #[tokio::test]
    async fn test_corrupt_run_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest-info.json");
        std::fs::write(&path, "{ nope").unwrap();

        let result = RunRecord::load(&path).await;

        assert!(matches!(result, Err(PipelineError::RunRecord { .. })));
    }
}
