//! Error types for the structured-store inspector.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`super::StoreInspector`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file is missing, is not a SQLite database, or a query against it failed.
    #[error("store {path} is unreadable: {detail}")]
    StoreUnreadable {
        /// Store file path.
        path: PathBuf,
        /// What went wrong.
        detail: String,
    },

    /// The requested table does not exist in the store.
    #[error("unknown table '{table}'")]
    UnknownTable {
        /// Name that was looked up.
        table: String,
    },
}

impl StoreError {
    /// Creates a `StoreUnreadable` error.
    pub fn unreadable(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::StoreUnreadable {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Wraps a sqlx failure as `StoreUnreadable`.
    pub fn query(path: impl Into<PathBuf>, source: &sqlx::Error) -> Self {
        Self::unreadable(path, source.to_string())
    }

    /// Creates an `UnknownTable` error.
    pub fn unknown_table(table: impl Into<String>) -> Self {
        Self::UnknownTable {
            table: table.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_table_display_names_table() {
        let err = StoreError::unknown_table("Nope");
        assert_eq!(err.to_string(), "unknown table 'Nope'");
    }

    #[test]
    fn test_unreadable_display_includes_path_and_detail() {
        let err = StoreError::unreadable("/tmp/manifest.db", "file is not a database");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/manifest.db"));
        assert!(msg.contains("file is not a database"));
    }
}
