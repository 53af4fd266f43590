// FILE: src/storage/repository.rs
use rusqlite::{params, Connection, ErrorCode};
use crate::error::{Result, CatalogError};
use crate::storage::{FileRecord, ResultSetName, SearchResultRow};

/// SQL access for the catalog and result tables.
///
/// Borrows a plain connection or a `Transaction` (which derefs to one), so the
/// same statements serve both autocommit reads and batched writes.
pub struct Repository<'a> {
    conn: &'a Connection,
}

impl<'a> Repository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn initialize(&self) -> Result<()> {
        // 1. The Catalog
        self.conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS files_info (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_name TEXT NOT NULL,
                full_path TEXT NOT NULL UNIQUE,
                file_extension TEXT NOT NULL DEFAULT '',
                file_size INTEGER NOT NULL DEFAULT 0,
                file_type TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                cataloged_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_files_info_file_name ON files_info(file_name);
        "#)?;

        // 2. Default result set for the interactive menu
        self.create_result_table(&ResultSetName::default())?;

        tracing::debug!("[Repository] Schema ready");
        Ok(())
    }

    pub fn file_exists(&self, full_path: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM files_info WHERE full_path = ?1",
            params![full_path],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert_file(&self, record: &FileRecord) -> Result<()> {
        let result = self.conn.execute(
            "INSERT INTO files_info (file_name, full_path, file_extension, file_size, file_type, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.file_name,
                record.full_path,
                record.file_extension,
                record.file_size,
                record.file_type,
                record.content,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(CatalogError::DuplicatePath(record.full_path.clone()))
            }
            Err(e) => Err(CatalogError::Database(e)),
        }
    }

    pub fn all_files(&self) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT file_name, full_path, file_extension, file_size, file_type, content
             FROM files_info ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FileRecord {
                file_name: row.get(0)?,
                full_path: row.get(1)?,
                file_extension: row.get(2)?,
                file_size: row.get(3)?,
                file_type: row.get(4)?,
                content: row.get(5)?,
            })
        })?;
        let mut records = Vec::new();
        for r in rows { records.push(r?); }
        Ok(records)
    }

    pub fn file_count(&self) -> Result<u64> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM files_info", [], |r| r.get(0))?)
    }

    pub fn create_result_table(&self, set: &ResultSetName) -> Result<()> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_name TEXT NOT NULL,
                full_path TEXT NOT NULL,
                occurrences INTEGER NOT NULL DEFAULT 0,
                file_type TEXT NOT NULL
            );",
            set.quoted()
        ))?;
        Ok(())
    }

    /// SQLite has no TRUNCATE; an unqualified DELETE takes the truncate fast path.
    pub fn truncate_result_table(&self, set: &ResultSetName) -> Result<()> {
        self.conn.execute(&format!("DELETE FROM {}", set.quoted()), [])?;
        Ok(())
    }

    pub fn insert_result_row(&self, set: &ResultSetName, row: &SearchResultRow) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (file_name, full_path, occurrences, file_type) VALUES (?1, ?2, ?3, ?4)",
                set.quoted()
            ),
            params![row.file_name, row.full_path, row.occurrences, row.file_type],
        )?;
        Ok(())
    }

    pub fn result_rows(&self, set: &ResultSetName) -> Result<Vec<SearchResultRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT file_name, full_path, occurrences, file_type FROM {} ORDER BY id",
            set.quoted()
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(SearchResultRow {
                file_name: row.get(0)?,
                full_path: row.get(1)?,
                occurrences: row.get(2)?,
                file_type: row.get(3)?,
            })
        })?;
        let mut results = Vec::new();
        for r in rows { results.push(r?); }
        Ok(results)
    }

    pub fn result_table_exists(&self, set: &ResultSetName) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![set.as_str()],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }
}
