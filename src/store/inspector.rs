use std::path::{Path, PathBuf};

use futures_util::TryStreamExt;
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Connection, Row};
use tracing::{debug, instrument, warn};

use super::error::StoreError;

const LIST_TABLES_SQL: &str = r"SELECT name FROM sqlite_master
WHERE type = 'table' AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
ORDER BY name";

const TABLE_COLUMNS_SQL: &str = "SELECT name, type FROM pragma_table_info(?1) ORDER BY cid";

const TABLE_EXISTS_SQL: &str = "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1";

/// One column of a table, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Declared SQL type, empty when the column is untyped.
    pub declared_type: String,
}

/// A user-defined table and its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    /// Table name.
    pub name: String,
    /// Columns ordered by position.
    pub columns: Vec<ColumnDescriptor>,
}

/// One `(id, json)` row.
///
/// `json` is `Value::Null` when the blob is absent or not valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Primary key.
    pub id: i64,
    /// Parsed JSON blob.
    pub json: Value,
}

/// Read-only handle on an extracted manifest store.
///
/// Holds no connection. Every operation opens its own read-only connection
/// and closes it before returning, so any number of inspectors may read the
/// same file at once.
#[derive(Debug, Clone)]
pub struct StoreInspector {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl StoreInspector {
    /// Opens the store at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreUnreadable`] when the file does not exist
    /// or is not a SQLite database. The file is never created.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open_read_only(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::unreadable(path, "store file does not exist"));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);
        let inspector = Self {
            path: path.to_path_buf(),
            options,
        };

        // SQLite opens lazily; the first read is what rejects a non-database file.
        let mut conn = inspector.connect().await?;
        let probe = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM sqlite_master")
            .fetch_one(&mut conn)
            .await;
        inspector.release(conn).await;
        let objects = probe.map_err(|e| StoreError::query(path, &e))?;

        debug!(objects, "store opened read-only");
        Ok(inspector)
    }

    /// Path of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lists user-defined tables in ascending name order, with their columns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreUnreadable`] when the schema cannot be read.
    #[instrument(skip(self))]
    pub async fn list_tables(&self) -> Result<Vec<TableDescriptor>, StoreError> {
        let mut conn = self.connect().await?;
        let result = self.query_tables(&mut conn).await;
        self.release(conn).await;
        result
    }

    /// Returns whether a table named `table` exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreUnreadable`] when the schema cannot be read.
    pub async fn has_table(&self, table: &str) -> Result<bool, StoreError> {
        let mut conn = self.connect().await?;
        let result = self.table_exists(&mut conn, table).await;
        self.release(conn).await;
        result
    }

    /// Counts the rows of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownTable`] when the table does not exist,
    /// [`StoreError::StoreUnreadable`] when the query fails.
    #[instrument(skip(self))]
    pub async fn count_rows(&self, table: &str) -> Result<u64, StoreError> {
        let mut conn = self.connect().await?;
        let result = self.query_count(&mut conn, table).await;
        self.release(conn).await;
        result
    }

    /// Returns up to `limit` records of `table`, skipping the first `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownTable`] when the table does not exist,
    /// [`StoreError::StoreUnreadable`] when it lacks `id`/`json` columns.
    #[instrument(skip(self))]
    pub async fn sample_rows(
        &self,
        table: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Record>, StoreError> {
        let mut conn = self.connect().await?;
        let result = self.query_sample(&mut conn, table, limit, offset).await;
        self.release(conn).await;
        result
    }

    /// Reads every record of `table`.
    ///
    /// Rows are streamed off the connection; only the parsed records are kept.
    ///
    /// # Errors
    ///
    /// Same as [`Self::sample_rows`].
    #[instrument(skip(self))]
    pub async fn scan_records(&self, table: &str) -> Result<Vec<Record>, StoreError> {
        let mut conn = self.connect().await?;
        let result = self.query_all(&mut conn, table).await;
        self.release(conn).await;
        if let Ok(records) = &result {
            debug!(table, records = records.len(), "table scanned");
        }
        result
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        SqliteConnection::connect_with(&self.options)
            .await
            .map_err(|e| StoreError::query(&self.path, &e))
    }

    async fn release(&self, conn: SqliteConnection) {
        if let Err(e) = conn.close().await {
            warn!(error = %e, "failed to close store connection");
        }
    }

    async fn query_tables(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<TableDescriptor>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(LIST_TABLES_SQL)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| StoreError::query(&self.path, &e))?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let columns = sqlx::query_as::<_, (String, String)>(TABLE_COLUMNS_SQL)
                .bind(name.as_str())
                .fetch_all(&mut *conn)
                .await
                .map_err(|e| StoreError::query(&self.path, &e))?
                .into_iter()
                .map(|(name, declared_type)| ColumnDescriptor {
                    name,
                    declared_type,
                })
                .collect();
            tables.push(TableDescriptor { name, columns });
        }
        Ok(tables)
    }

    async fn table_exists(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
    ) -> Result<bool, StoreError> {
        let found = sqlx::query_scalar::<_, i64>(TABLE_EXISTS_SQL)
            .bind(table)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| StoreError::query(&self.path, &e))?;
        Ok(found.is_some())
    }

    async fn ensure_table(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
    ) -> Result<(), StoreError> {
        if self.table_exists(conn, table).await? {
            Ok(())
        } else {
            Err(StoreError::unknown_table(table))
        }
    }

    async fn query_count(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
    ) -> Result<u64, StoreError> {
        self.ensure_table(conn, table).await?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| StoreError::query(&self.path, &e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn query_sample(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Record>, StoreError> {
        self.ensure_table(conn, table).await?;
        let sql = format!(
            "SELECT id, CAST(json AS BLOB) AS json FROM {} LIMIT ?1 OFFSET ?2",
            quote_identifier(table)
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| StoreError::query(&self.path, &e))?;
        rows.iter().map(|row| self.decode_record(table, row)).collect()
    }

    async fn query_all(
        &self,
        conn: &mut SqliteConnection,
        table: &str,
    ) -> Result<Vec<Record>, StoreError> {
        self.ensure_table(conn, table).await?;
        let sql = format!(
            "SELECT id, CAST(json AS BLOB) AS json FROM {}",
            quote_identifier(table)
        );

        let mut records = Vec::new();
        let mut rows = sqlx::query(&sql).fetch(&mut *conn);
        while let Some(row) = rows
            .try_next()
            .await
            .map_err(|e| StoreError::query(&self.path, &e))?
        {
            records.push(self.decode_record(table, &row)?);
        }
        Ok(records)
    }

    fn decode_record(&self, table: &str, row: &SqliteRow) -> Result<Record, StoreError> {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::query(&self.path, &e))?;
        let blob: Option<Vec<u8>> = row
            .try_get("json")
            .map_err(|e| StoreError::query(&self.path, &e))?;

        let json = match blob {
            Some(bytes) => parse_record_json(table, id, &bytes),
            None => Value::Null,
        };
        Ok(Record { id, json })
    }
}

fn parse_record_json(table: &str, id: i64, bytes: &[u8]) -> Value {
    match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!(table, id, error = %e, "record JSON is not parseable; treating as empty");
            Value::Null
        }
    }
}

/// Quotes a table name for interpolation into SQL.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
