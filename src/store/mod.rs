//! Read-only inspection of the extracted manifest store.
//!
//! The store is a SQLite file of `(id, json)` tables. Inspection never
//! writes to it and never keeps a connection open between calls.
//!
//! # Example
//!
//! ```no_run
//! use manifest_core::store::StoreInspector;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreInspector::open_read_only("./manifest-data/manifest.db").await?;
//! for table in store.list_tables().await? {
//!     println!("{}: {} rows", table.name, store.count_rows(&table.name).await?);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod inspector;

pub use error::StoreError;
pub use inspector::{ColumnDescriptor, Record, StoreInspector, TableDescriptor};
