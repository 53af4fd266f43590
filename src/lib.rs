//! filecat: Incremental File Catalog with Term Search
//!
//! Two engines share one SQLite catalog:
//! - Scanner + Scheduler (poll the watched tree, append new entries once)
//! - Searcher (count term occurrences, materialise a named result set)

pub mod config;
pub mod engine;
pub mod error;
pub mod menu;
pub mod storage;

pub use config::Config;
pub use engine::{search, start_cataloging};
pub use engine::scanner::{ScanReport, Scanner};
pub use engine::scheduler::{ScanScheduler, SchedulerSummary};
pub use engine::searcher::{SearchOutcome, Searcher};
pub use error::{Result, CatalogError};
// Export the common storage types
pub use storage::{
    CatalogStore,
    FileRecord,
    ResultSetName,
    SearchResultRow,
    SharedCatalog,
    SqliteCatalog,
};
