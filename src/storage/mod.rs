// FILE: src/storage/mod.rs
pub mod catalog;
pub mod connection;
pub mod repository;
pub mod result_set;

use std::sync::{Arc, Mutex};

use crate::error::Result;

// Common exports
pub use catalog::SqliteCatalog;
pub use connection::open_database;
pub use repository::Repository;
pub use result_set::ResultSetName;

/// Name of the base catalog table.
pub const CATALOG_TABLE: &str = "files_info";

/// Catalog handle shared between the scan loop and the search menu.
pub type SharedCatalog = Arc<Mutex<SqliteCatalog>>;

// Data Types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub file_name: String,
    pub full_path: String,
    pub file_extension: String,
    pub file_size: u64,
    pub file_type: String,
    pub content: String,
}

impl std::fmt::Display for FileRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (type: {}, size: {})", self.full_path, self.file_type, self.file_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultRow {
    pub file_name: String,
    pub full_path: String,
    pub occurrences: u64,
    pub file_type: String,
}

impl std::fmt::Display for SearchResultRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "File Name: {}, Full Path: {}, Occurrences: {}, File Type: {}",
            self.file_name, self.full_path, self.occurrences, self.file_type
        )
    }
}

/// What the scanner and searcher need from durable storage.
///
/// Writes are batch-atomic: `commit_records` and `replace_results` either
/// apply everything they were given or nothing. Reads see committed data
/// only; how fresh a `scan_all` snapshot is relative to a concurrent writer
/// depends on the isolation level of the backing store.
pub trait CatalogStore {
    /// Point lookup by unique path.
    fn exists(&self, full_path: &str) -> Result<bool>;

    /// Insert all records in one transaction. A path that is already present
    /// fails with `CatalogError::DuplicatePath` and rolls back the whole batch.
    fn commit_records(&mut self, records: &[FileRecord]) -> Result<usize>;

    /// Every cataloged record, in insertion order.
    fn scan_all(&self) -> Result<Vec<FileRecord>>;

    /// Create the named result table if absent, truncate it and fill it with
    /// `rows`, all in one transaction.
    fn replace_results(&mut self, set: &ResultSetName, rows: &[SearchResultRow]) -> Result<()>;

    /// Rows of the named result table, in insertion order.
    fn read_results(&self, set: &ResultSetName) -> Result<Vec<SearchResultRow>>;
}
