//! Scan Scheduler
//!
//! Runs a scan pass, waits one period, and repeats until cancelled.
//! Cancellation only interrupts the wait: a pass that has started always
//! runs to its commit or rollback before the loop exits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::engine::scanner::{ScanReport, Scanner};
use crate::error::{CatalogError, Result};
use crate::storage::SharedCatalog;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub passes: usize,
    pub failed_passes: usize,
    pub inserted: usize,
}

pub struct ScanScheduler {
    catalog: SharedCatalog,
    root: PathBuf,
    period: Duration,
}

impl ScanScheduler {
    pub fn new(catalog: SharedCatalog, root: impl Into<PathBuf>, period: Duration) -> Self {
        Self { catalog, root: root.into(), period }
    }

    /// Loop until `cancel` fires, then return what was done.
    pub async fn run(&self, cancel: CancellationToken) -> SchedulerSummary {
        let mut summary = SchedulerSummary::default();
        tracing::info!("[Scheduler] Monitoring {} every {:?}", self.root.display(), self.period);

        while !cancel.is_cancelled() {
            summary.passes += 1;
            match self.run_pass().await {
                Ok(report) => {
                    summary.inserted += report.inserted;
                    tracing::info!("[Scheduler] Pass {} complete. Press Ctrl+C to stop monitoring.", summary.passes);
                }
                Err(e) => {
                    summary.failed_passes += 1;
                    tracing::error!("[Scheduler] Pass {} failed: {}", summary.passes, e);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.period) => {}
            }
        }

        tracing::info!(
            "[Scheduler] Monitoring stopped after {} passes ({} failed, {} records added)",
            summary.passes, summary.failed_passes, summary.inserted
        );
        summary
    }

    /// One pass on the blocking pool, holding the catalog for its duration.
    pub async fn run_pass(&self) -> Result<ScanReport> {
        let catalog = Arc::clone(&self.catalog);
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = catalog.lock()
                .map_err(|_| CatalogError::State("Poisoned lock".into()))?;
            Scanner::scan(&mut *guard, &root)
        })
        .await
        .map_err(|e| CatalogError::State(format!("Scan task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteCatalog;
    use std::fs;
    use std::sync::Mutex;

    fn shared() -> SharedCatalog {
        Arc::new(Mutex::new(SqliteCatalog::open_in_memory().unwrap()))
    }

    fn count(catalog: &SharedCatalog) -> u64 {
        catalog.lock().unwrap().file_count().unwrap()
    }

    #[tokio::test]
    async fn test_cancel_before_start_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = shared();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = ScanScheduler::new(catalog.clone(), dir.path(), Duration::from_millis(5))
            .run(cancel)
            .await;

        assert_eq!(summary, SchedulerSummary::default());
        assert_eq!(count(&catalog), 0);
    }

    #[tokio::test]
    async fn test_repeats_until_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        let catalog = shared();
        let cancel = CancellationToken::new();

        let scheduler = ScanScheduler::new(catalog.clone(), dir.path(), Duration::from_millis(10));
        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move { scheduler.run(cancel).await }
        });

        // A file that appears between passes is picked up by a later pass
        tokio::time::sleep(Duration::from_millis(30)).await;
        fs::write(dir.path().join("b.txt"), "beta").unwrap();
        for _ in 0..200 {
            if count(&catalog) == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cancel.cancel();

        let summary = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();

        assert!(summary.passes >= 2);
        assert_eq!(summary.failed_passes, 0);
        assert_eq!(summary.inserted, 2);
        assert_eq!(count(&catalog), 2);
    }

    #[tokio::test]
    async fn test_failed_pass_does_not_stop_loop() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not_yet");
        let catalog = shared();
        let cancel = CancellationToken::new();

        let scheduler = ScanScheduler::new(catalog.clone(), &missing, Duration::from_millis(10));
        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move { scheduler.run(cancel).await }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        fs::create_dir(&missing).unwrap();
        fs::write(missing.join("late.txt"), "late").unwrap();
        for _ in 0..200 {
            if count(&catalog) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cancel.cancel();

        let summary = handle.await.unwrap();
        assert!(summary.failed_passes >= 1);
        assert_eq!(count(&catalog), 1);
    }
}
