//! SQLite-backed `CatalogStore`.

use std::path::Path;
use rusqlite::Connection;

use crate::error::Result;
use crate::storage::{open_database, CatalogStore, FileRecord, Repository, ResultSetName, SearchResultRow};

pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open the catalog at `db_path`, provisioning the schema on first use.
    pub fn open(db_path: &Path) -> Result<Self> {
        Self::with_connection(open_database(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        Repository::new(&conn).initialize()?;
        Ok(Self { conn })
    }

    pub fn file_count(&self) -> Result<u64> {
        Repository::new(&self.conn).file_count()
    }
}

impl CatalogStore for SqliteCatalog {
    fn exists(&self, full_path: &str) -> Result<bool> {
        Repository::new(&self.conn).file_exists(full_path)
    }

    fn commit_records(&mut self, records: &[FileRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let staged = {
            let repo = Repository::new(&tx);
            records.iter().try_for_each(|record| repo.insert_file(record))
        };

        match staged {
            Ok(()) => {
                tx.commit()?;
                Ok(records.len())
            }
            Err(e) => {
                tracing::warn!("[Catalog] Rolling back batch of {} records: {}", records.len(), e);
                tx.rollback()?;
                Err(e)
            }
        }
    }

    fn scan_all(&self) -> Result<Vec<FileRecord>> {
        Repository::new(&self.conn).all_files()
    }

    fn replace_results(&mut self, set: &ResultSetName, rows: &[SearchResultRow]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let repo = Repository::new(&tx);
            repo.create_result_table(set)?;
            repo.truncate_result_table(set)?;
            for row in rows {
                repo.insert_result_row(set, row)?;
            }
        }
        // Dropping an uncommitted transaction rolls it back
        tx.commit()?;
        Ok(())
    }

    fn read_results(&self, set: &ResultSetName) -> Result<Vec<SearchResultRow>> {
        let repo = Repository::new(&self.conn);
        if !repo.result_table_exists(set)? {
            return Ok(Vec::new());
        }
        repo.result_rows(set)
    }
}
