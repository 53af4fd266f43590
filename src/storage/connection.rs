//! Database connection management
//!
//! Opens the SQLite file backing the catalog, creating its parent directory
//! if needed, and applies the connection pragmas.

use std::path::Path;
use rusqlite::Connection;
use crate::error::{Result, CatalogError};

/// Open (or create) the catalog database at `db_path`.
pub fn open_database(db_path: &Path) -> Result<Connection> {
    let db_dir = db_path.parent()
        .ok_or_else(|| CatalogError::InvalidPath(format!("Invalid database path: {}", db_path.display())))?;

    if !db_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(db_dir)?;
    }

    let conn = Connection::open(db_path)?;

    // WAL keeps readers off the writer's lock
    let mode: String = conn.pragma_update_and_check(None, "journal_mode", WAL, |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", NORMAL)?;

    tracing::info!("[Catalog] Opened database at {} (journal_mode={})", db_path.display(), mode);
    Ok(conn)
}

// SQL pragma constants
const WAL: &str = "WAL";
const NORMAL: &str = "NORMAL";
