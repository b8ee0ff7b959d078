//! Builders for provider responses, manifest archives and item stores.

use std::io::{Cursor, Write};
use std::path::Path;

use serde_json::{Value, json};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Connection, SqliteConnection};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";
pub const MANIFEST_PATH: &str = "/Platform/Destiny2/Manifest/";

/// Rows of one `(id INTEGER PRIMARY KEY, json BLOB)` table.
pub type TableRows<'a> = (&'a str, Vec<(i64, String)>);

/// Successful metadata envelope listing one archive per `(language, path)`.
pub fn manifest_envelope(version: &str, archives: &[(&str, &str)]) -> Value {
    let paths: serde_json::Map<String, Value> = archives
        .iter()
        .map(|(language, archive_path)| ((*language).to_string(), json!(archive_path)))
        .collect();
    json!({
        "ErrorCode": 1,
        "ErrorStatus": "Success",
        "Message": "Ok",
        "Response": {
            "version": version,
            "mobileWorldContentPaths": paths,
            "jsonWorldContentPaths": {}
        }
    })
}

pub fn rejected_envelope(code: i64, status: &str, message: &str) -> Value {
    json!({
        "ErrorCode": code,
        "ErrorStatus": status,
        "Message": message
    })
}

pub async fn mount_manifest(server: &MockServer, envelope: Value) {
    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .and(header("X-API-Key", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope))
        .mount(server)
        .await;
}

pub async fn mount_archive(server: &MockServer, archive_path: &str, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(archive_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/zip")
                .set_body_bytes(bytes),
        )
        .mount(server)
        .await;
}

/// A zip archive holding `entries` in order, deflated.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(name.to_string(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Writes a SQLite store with the given tables to `store_path`.
pub async fn create_store(store_path: &Path, tables: &[TableRows<'_>]) {
    let options = SqliteConnectOptions::new()
        .filename(store_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    for (name, rows) in tables {
        sqlx::query(&format!(
            "CREATE TABLE \"{name}\" (id INTEGER PRIMARY KEY NOT NULL, json BLOB)"
        ))
        .execute(&mut conn)
        .await
        .unwrap();
        for (id, json) in rows {
            sqlx::query(&format!("INSERT INTO \"{name}\" (id, json) VALUES (?1, ?2)"))
                .bind(*id)
                .bind(json.as_str())
                .execute(&mut conn)
                .await
                .unwrap();
        }
    }
    conn.close().await.unwrap();
}

/// Bytes of a SQLite store with the given tables.
pub async fn store_bytes(tables: &[TableRows<'_>]) -> Vec<u8> {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("store.sqlite");
    create_store(&store_path, tables).await;
    std::fs::read(&store_path).unwrap()
}

/// Three items, two of which reference category 59.
pub fn three_items() -> TableRows<'static> {
    (
        "Items",
        vec![
            (1, item_json("Alpha", 3, &[59])),
            (2, item_json("Beta", 3, &[59, 1])),
            (3, json!({"displayProperties": {"name": "Gamma"}}).to_string()),
        ],
    )
}

pub fn item_json(name: &str, item_type: i64, category_hashes: &[u32]) -> String {
    json!({
        "displayProperties": {"name": name, "description": ""},
        "itemType": item_type,
        "itemSubType": 0,
        "inventory": {"tierType": 5},
        "itemCategoryHashes": category_hashes
    })
    .to_string()
}

pub fn category_json(hash: u32, name: &str) -> String {
    json!({
        "hash": hash,
        "displayProperties": {"name": name, "description": format!("{name} items")},
        "visible": true,
        "deprecated": false
    })
    .to_string()
}
