// FILE: src/engine/mod.rs
pub mod classifier;
pub mod scanner;
pub mod scheduler;
pub mod searcher;

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{CatalogError, Result};
use crate::storage::{ResultSetName, SharedCatalog};
use scheduler::{ScanScheduler, SchedulerSummary};
use searcher::{SearchOutcome, Searcher};

/// Catalog `root` every `period` until `cancel` fires.
pub async fn start_cataloging(
    catalog: SharedCatalog,
    root: &Path,
    period: Duration,
    cancel: CancellationToken,
) -> SchedulerSummary {
    ScanScheduler::new(catalog, root, period).run(cancel).await
}

/// One-shot search of the shared catalog into the result set `set`.
///
/// Blocks while a scan pass holds the catalog.
pub fn search(catalog: &SharedCatalog, term: &str, set: &ResultSetName) -> Result<SearchOutcome> {
    let mut guard = catalog.lock()
        .map_err(|_| CatalogError::State("Poisoned lock".into()))?;
    Searcher::search(&mut *guard, term, set)
}
