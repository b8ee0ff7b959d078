use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::error::ExtractError;

/// File name of the extracted store inside the destination directory.
pub const STORE_FILE_NAME: &str = "manifest.db";

const COPY_BUFFER_BYTES: usize = 64 * 1024;

/// The payload pulled out of a manifest archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedStore {
    /// Fixed location of the store file.
    pub path: PathBuf,
    /// Decompressed size in bytes.
    pub size_bytes: u64,
    /// Name the payload had inside the archive.
    pub entry_name: String,
}

/// Extracts the archive's first entry to `<destination_dir>/manifest.db`.
///
/// Steps:
/// 1. Open the ZIP container and take entry 0 (later entries are ignored)
/// 2. Decompress into a `.partial` sibling of the store path
/// 3. Rename over any existing store
/// 4. Delete the source archive, whether or not 1-3 succeeded
///
/// # Errors
///
/// - [`ExtractError::CorruptArchive`] when the container or entry data is unreadable
/// - [`ExtractError::EmptyArchive`] when the container has no entries
/// - [`ExtractError::ExtractionIo`] when writing the payload fails
pub fn extract_archive(
    archive_path: &Path,
    destination_dir: &Path,
) -> Result<ExtractedStore, ExtractError> {
    extract_archive_to(archive_path, &destination_dir.join(STORE_FILE_NAME))
}

/// Same as [`extract_archive`], writing the payload to an explicit file path.
///
/// # Errors
///
/// Same as [`extract_archive`].
#[instrument(fields(archive = %archive_path.display(), store = %store_path.display()))]
pub fn extract_archive_to(
    archive_path: &Path,
    store_path: &Path,
) -> Result<ExtractedStore, ExtractError> {
    let result = extract_first_entry(archive_path, store_path);

    match fs::remove_file(archive_path) {
        Ok(()) => debug!("removed source archive"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(error = %e, "failed to remove source archive (non-fatal)"),
    }

    if let Ok(store) = &result {
        info!(
            entry = %store.entry_name,
            bytes = store.size_bytes,
            "manifest store extracted"
        );
    }
    result
}

fn extract_first_entry(
    archive_path: &Path,
    store_path: &Path,
) -> Result<ExtractedStore, ExtractError> {
    let file = fs::File::open(archive_path)
        .map_err(|e| ExtractError::corrupt(archive_path, format!("cannot open archive: {e}")))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ExtractError::corrupt(archive_path, format!("invalid ZIP container: {e}")))?;

    if archive.is_empty() {
        return Err(ExtractError::empty(archive_path));
    }
    if archive.len() > 1 {
        warn!(entries = archive.len(), "archive holds more than one entry; using the first");
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| ExtractError::corrupt(archive_path, format!("failed to read entry 0: {e}")))?;
    if entry.is_dir() {
        return Err(ExtractError::corrupt(
            archive_path,
            format!("first entry '{}' is a directory", entry.name()),
        ));
    }
    let entry_name = entry.name().to_string();

    let partial_path = partial_path_for(store_path);
    let copied = copy_entry(&mut entry, archive_path, &partial_path);
    let size_bytes = match copied {
        Ok(size) => size,
        Err(error) => {
            let _ = fs::remove_file(&partial_path);
            return Err(error);
        }
    };

    if let Err(e) = replace_file(&partial_path, store_path) {
        let _ = fs::remove_file(&partial_path);
        return Err(ExtractError::io(store_path, e));
    }

    Ok(ExtractedStore {
        path: store_path.to_path_buf(),
        size_bytes,
        entry_name,
    })
}

/// Copies entry data to `target`, separating decode failures from disk failures.
fn copy_entry<R: Read>(
    entry: &mut R,
    archive_path: &Path,
    target: &Path,
) -> Result<u64, ExtractError> {
    let mut out = fs::File::create(target).map_err(|e| ExtractError::io(target, e))?;
    let mut buffer = vec![0u8; COPY_BUFFER_BYTES];
    let mut total: u64 = 0;

    loop {
        let read = match entry.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ExtractError::corrupt(
                    archive_path,
                    format!("failed to decompress entry: {e}"),
                ));
            }
        };
        out.write_all(&buffer[..read])
            .map_err(|e| ExtractError::io(target, e))?;
        total += read as u64;
    }

    out.sync_all().map_err(|e| ExtractError::io(target, e))?;
    Ok(total)
}

fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        // Windows refuses to rename over an existing file.
        Err(_) if to.exists() => {
            fs::remove_file(to)?;
            fs::rename(from, to)
        }
        Err(e) => Err(e),
    }
}

fn partial_path_for(store_path: &Path) -> PathBuf {
    let mut name = store_path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".partial");
    store_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Helper: create a ZIP with the given entries.
    fn create_test_zip(
        dir: &Path,
        name: &str,
        files: &[(&str, &[u8])],
        method: zip::CompressionMethod,
    ) -> PathBuf {
        let zip_path = dir.join(name);
        let file = fs::File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default().compression_method(method);

        for (entry_name, content) in files {
            writer.start_file(entry_name.to_string(), options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
        zip_path
    }

    #[test]
    fn test_single_entry_extracted_to_fixed_name_and_archive_removed() {
        let temp_dir = TempDir::new().unwrap();
        let payload = vec![9u8; 1024];
        let zip_path = create_test_zip(
            temp_dir.path(),
            "manifest.zip",
            &[("world_sql_content_abc.content", &payload)],
            zip::CompressionMethod::Stored,
        );

        let store = extract_archive(&zip_path, temp_dir.path()).unwrap();

        assert_eq!(store.path, temp_dir.path().join(STORE_FILE_NAME));
        assert_eq!(store.size_bytes, 1024);
        assert_eq!(store.entry_name, "world_sql_content_abc.content");
        assert_eq!(fs::metadata(&store.path).unwrap().len(), 1024);
        assert!(!zip_path.exists(), "source archive must be deleted");
        assert!(!temp_dir.path().join("world_sql_content_abc.content").exists());
    }

    #[test]
    fn test_deflated_entry_is_decompressed() {
        let temp_dir = TempDir::new().unwrap();
        let payload = b"SQLite format 3\0".repeat(512);
        let zip_path = create_test_zip(
            temp_dir.path(),
            "manifest.zip",
            &[("payload.content", &payload)],
            zip::CompressionMethod::Deflated,
        );

        let store = extract_archive(&zip_path, temp_dir.path()).unwrap();

        assert_eq!(fs::read(&store.path).unwrap(), payload);
    }

    #[test]
    fn test_first_entry_wins_when_several_present() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = create_test_zip(
            temp_dir.path(),
            "manifest.zip",
            &[("first.content", b"first"), ("second.content", b"second payload")],
            zip::CompressionMethod::Stored,
        );

        let store = extract_archive(&zip_path, temp_dir.path()).unwrap();

        assert_eq!(store.entry_name, "first.content");
        assert_eq!(fs::read(&store.path).unwrap(), b"first");
    }

    #[test]
    fn test_existing_store_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(STORE_FILE_NAME), b"stale store contents").unwrap();
        let zip_path = create_test_zip(
            temp_dir.path(),
            "manifest.zip",
            &[("payload.content", b"fresh")],
            zip::CompressionMethod::Stored,
        );

        let store = extract_archive(&zip_path, temp_dir.path()).unwrap();

        assert_eq!(fs::read(&store.path).unwrap(), b"fresh");
    }

    #[test]
    fn test_empty_archive_is_rejected_and_removed() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = create_test_zip(
            temp_dir.path(),
            "manifest.zip",
            &[],
            zip::CompressionMethod::Stored,
        );

        let result = extract_archive(&zip_path, temp_dir.path());

        assert!(matches!(result, Err(ExtractError::EmptyArchive { .. })));
        assert!(!zip_path.exists());
        assert!(!temp_dir.path().join(STORE_FILE_NAME).exists());
    }

    #[test]
    fn test_garbage_file_is_corrupt_and_removed() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("manifest.zip");
        fs::write(&zip_path, b"<html>not a zip</html>").unwrap();

        let result = extract_archive(&zip_path, temp_dir.path());

        assert!(matches!(result, Err(ExtractError::CorruptArchive { .. })));
        assert!(!zip_path.exists());
    }

    #[test]
    fn test_entry_failing_checksum_is_corrupt_and_leaves_no_store() {
        let temp_dir = TempDir::new().unwrap();
        let payload = b"SQLite format 3\0 payload bytes";
        let zip_path = create_test_zip(
            temp_dir.path(),
            "manifest.zip",
            &[("payload.content", payload.as_slice())],
            zip::CompressionMethod::Stored,
        );
        let mut bytes = fs::read(&zip_path).unwrap();
        let offset = bytes
            .windows(payload.len())
            .position(|window| window == payload.as_slice())
            .unwrap();
        bytes[offset + 4] ^= 0xFF;
        fs::write(&zip_path, &bytes).unwrap();

        let result = extract_archive(&zip_path, temp_dir.path());

        match result {
            Err(ExtractError::CorruptArchive { detail, .. }) => {
                assert!(detail.contains("decompress"), "unexpected detail: {detail}");
            }
            other => panic!("expected CorruptArchive, got {other:?}"),
        }
        assert!(!temp_dir.path().join(STORE_FILE_NAME).exists());
        assert!(!temp_dir.path().join("manifest.db.partial").exists());
        assert!(!zip_path.exists());
    }

    #[test]
    fn test_missing_archive_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let result = extract_archive(&temp_dir.path().join("absent.zip"), temp_dir.path());
        assert!(matches!(result, Err(ExtractError::CorruptArchive { .. })));
    }

    #[test]
    fn test_unwritable_destination_is_io_error_and_archive_still_removed() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = create_test_zip(
            temp_dir.path(),
            "manifest.zip",
            &[("payload.content", b"data")],
            zip::CompressionMethod::Stored,
        );
        let missing_dir = temp_dir.path().join("missing");

        let result = extract_archive(&zip_path, &missing_dir);

        assert!(matches!(result, Err(ExtractError::ExtractionIo { .. })));
        assert!(!zip_path.exists(), "archive removed even when extraction fails");
        assert!(!missing_dir.exists());
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        assert_eq!(
            partial_path_for(Path::new("/data/manifest.db")),
            PathBuf::from("/data/manifest.db.partial")
        );
    }
}
