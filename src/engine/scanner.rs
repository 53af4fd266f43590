// FILE: src/engine/scanner.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use walkdir::WalkDir;

use crate::engine::classifier::{self, UNREADABLE};
use crate::error::{CatalogError, Result};
use crate::storage::{CatalogStore, FileRecord};

/// Counters for one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub discovered: usize,
    pub already_cataloged: usize,
    pub inserted: usize,
    pub unreadable: usize,
    pub walk_errors: usize,
    /// Entries left out because their lossy path matched another entry's.
    pub name_collisions: usize,
    pub elapsed: Duration,
}

/// Entries found under a root, plus how many the walker could not reach.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub paths: Vec<PathBuf>,
    pub errors: usize,
}

/// Walked paths split into what still needs cataloging and what was dropped.
#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub fresh: Vec<PathBuf>,
    pub already_cataloged: usize,
    pub collisions: usize,
}

pub struct Scanner;

impl Scanner {
    /// One scan pass over `root`:
    /// 1. Walk every entry below the root
    /// 2. Drop paths the catalog already holds
    /// 3. Classify the rest into records
    /// 4. Commit them as a single batch (all or nothing)
    pub fn scan<S>(store: &mut S, root: &Path) -> Result<ScanReport>
    where
        S: CatalogStore + ?Sized,
    {
        let start = Instant::now();
        let root = Self::resolve_root(root)?;
        tracing::info!("[Scanner] Scanning {}", root.display());

        let walk = Self::walk(&root);
        let discovered = walk.paths.len();

        let dedup = Self::dedup(&*store, walk.paths)?;
        let staged = Self::stage(&dedup.fresh);
        let unreadable = staged.iter().filter(|r| r.content == UNREADABLE).count();

        let inserted = if staged.is_empty() {
            0
        } else {
            store.commit_records(&staged)?
        };

        let report = ScanReport {
            discovered,
            already_cataloged: dedup.already_cataloged,
            inserted,
            unreadable,
            walk_errors: walk.errors,
            name_collisions: dedup.collisions,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            "[Scanner] Inserted file info for directory {}: {} new, {} known, {} unreadable, {} walk errors, {} name collisions. Time taken: {:?}",
            root.display(), report.inserted, report.already_cataloged, report.unreadable,
            report.walk_errors, report.name_collisions, report.elapsed
        );
        Ok(report)
    }

    fn resolve_root(root: &Path) -> Result<PathBuf> {
        if !root.is_dir() {
            return Err(CatalogError::InvalidPath(format!("Not a directory: {}", root.display())));
        }
        Ok(std::fs::canonicalize(root)?)
    }

    /// Every entry strictly below `root`. Symlinks are listed but not followed.
    pub fn walk(root: &Path) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();

        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            match entry {
                Ok(entry) => outcome.paths.push(entry.into_path()),
                Err(e) => {
                    outcome.errors += 1;
                    let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                    tracing::warn!("[Scanner] Could not walk {}: {}", path, e);
                }
            }
        }
        outcome
    }

    /// Keep only paths with no catalog record yet.
    ///
    /// Paths are keyed by their lossy UTF-8 form, so distinct non-UTF-8 names
    /// can share a key; only the first of such a group is kept, the rest are
    /// reported and left out of the pass rather than failing its commit.
    pub fn dedup<S>(store: &S, paths: Vec<PathBuf>) -> Result<DedupOutcome>
    where
        S: CatalogStore + ?Sized,
    {
        let mut outcome = DedupOutcome {
            fresh: Vec::with_capacity(paths.len()),
            ..Default::default()
        };
        let mut staged_keys = HashSet::with_capacity(paths.len());
        for path in paths {
            let key = path.to_string_lossy().into_owned();
            if store.exists(&key)? {
                outcome.already_cataloged += 1;
                continue;
            }
            if !staged_keys.insert(key) {
                outcome.collisions += 1;
                tracing::warn!(
                    "[Scanner] Skipping {:?}: its path is not valid UTF-8 and collides with another entry",
                    path
                );
                continue;
            }
            outcome.fresh.push(path);
        }
        Ok(outcome)
    }

    pub fn stage(paths: &[PathBuf]) -> Vec<FileRecord> {
        paths.iter().map(|p| classifier::build_record(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ResultSetName, SearchResultRow, SqliteCatalog};
    use std::collections::BTreeSet;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.txt"), "Hello hello world").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("notes.MD"), "nested").unwrap();
        fs::write(dir.path().join("sub").join("blob"), [0xffu8, 0xfe]).unwrap();
        dir
    }

    fn paths(catalog: &SqliteCatalog) -> BTreeSet<String> {
        catalog.scan_all().unwrap().into_iter().map(|r| r.full_path).collect()
    }

    #[test]
    fn test_first_pass_catalogs_files_and_directories() {
        let dir = tree();
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();

        let report = Scanner::scan(&mut catalog, dir.path()).unwrap();
        assert_eq!(report.discovered, 4);
        assert_eq!(report.inserted, 4);
        assert_eq!(report.unreadable, 1);
        assert_eq!(report.walk_errors, 0);

        let root = fs::canonicalize(dir.path()).unwrap();
        let records = catalog.scan_all().unwrap();
        let sub = records.iter().find(|r| r.file_name == "sub").unwrap();
        assert_eq!(sub.file_type, "Directory");
        assert_eq!(sub.content, "");
        let notes = records.iter().find(|r| r.file_name == "notes.MD").unwrap();
        assert_eq!(notes.file_type, "MD");
        assert_eq!(notes.full_path, root.join("sub").join("notes.MD").to_string_lossy());
        assert!(records.iter().all(|r| Path::new(&r.full_path) != root.as_path()));
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let dir = tree();
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();

        Scanner::scan(&mut catalog, dir.path()).unwrap();
        let before = catalog.scan_all().unwrap();
        let report = Scanner::scan(&mut catalog, dir.path()).unwrap();

        assert_eq!(report.inserted, 0);
        assert_eq!(report.already_cataloged, 4);
        assert_eq!(catalog.scan_all().unwrap(), before);
    }

    #[test]
    fn test_changed_file_is_not_refreshed() {
        let dir = tree();
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        Scanner::scan(&mut catalog, dir.path()).unwrap();

        fs::write(dir.path().join("report.txt"), "completely different and longer").unwrap();
        Scanner::scan(&mut catalog, dir.path()).unwrap();

        let report = catalog.scan_all().unwrap().into_iter().find(|r| r.file_name == "report.txt").unwrap();
        assert_eq!(report.content, "Hello hello world");
        assert_eq!(report.file_size, 17);
    }

    #[test]
    fn test_catalog_grows_monotonically() {
        let dir = tree();
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        Scanner::scan(&mut catalog, dir.path()).unwrap();
        let first = paths(&catalog);

        fs::write(dir.path().join("later.log"), "appended").unwrap();
        fs::remove_file(dir.path().join("sub").join("blob")).unwrap();
        let report = Scanner::scan(&mut catalog, dir.path()).unwrap();
        let second = paths(&catalog);

        assert_eq!(report.inserted, 1);
        assert!(second.is_superset(&first));
        assert_eq!(second.len(), first.len() + 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_lossy_path_collision_does_not_block_pass() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.txt"), "fine").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"a\xff")), "first").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"a\xfe")), "second").unwrap();
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();

        let report = Scanner::scan(&mut catalog, dir.path()).unwrap();
        assert_eq!(report.discovered, 3);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.name_collisions, 1);
        assert!(catalog.scan_all().unwrap().iter().any(|r| r.file_name == "ok.txt"));

        // Later passes see the shared key as cataloged and keep committing
        fs::write(dir.path().join("new.txt"), "later").unwrap();
        let report = Scanner::scan(&mut catalog, dir.path()).unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.already_cataloged, 3);
        assert_eq!(catalog.file_count().unwrap(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_directory_is_reported_not_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tree();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), "secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop root
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        let report = Scanner::scan(&mut catalog, dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let report = report.unwrap();
        assert_eq!(report.walk_errors, 1);
        assert_eq!(report.discovered, 5);
        assert_eq!(report.inserted, 5);
        let names: BTreeSet<String> = catalog.scan_all().unwrap().into_iter().map(|r| r.file_name).collect();
        assert!(names.contains("locked"));
        assert!(names.contains("report.txt"));
        assert!(!names.contains("hidden.txt"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        let err = Scanner::scan(&mut catalog, &dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath(_)));
    }

    /// Simulates another writer cataloging one path between the scanner's
    /// existence check and its commit.
    struct RacingCatalog {
        inner: SqliteCatalog,
        raced_path: String,
    }

    impl CatalogStore for RacingCatalog {
        fn exists(&self, full_path: &str) -> Result<bool> {
            self.inner.exists(full_path)
        }

        fn commit_records(&mut self, records: &[FileRecord]) -> Result<usize> {
            if let Some(raced) = records.iter().find(|r| r.full_path == self.raced_path) {
                self.inner.commit_records(std::slice::from_ref(raced))?;
            }
            self.inner.commit_records(records)
        }

        fn scan_all(&self) -> Result<Vec<FileRecord>> {
            self.inner.scan_all()
        }

        fn replace_results(&mut self, set: &ResultSetName, rows: &[SearchResultRow]) -> Result<()> {
            self.inner.replace_results(set, rows)
        }

        fn read_results(&self, set: &ResultSetName) -> Result<Vec<SearchResultRow>> {
            self.inner.read_results(set)
        }
    }

    #[test]
    fn test_failed_insert_rolls_back_whole_pass() {
        let dir = tree();
        let root = fs::canonicalize(dir.path()).unwrap();
        let raced_path = root.join("sub").join("notes.MD").to_string_lossy().into_owned();
        let mut catalog = RacingCatalog {
            inner: SqliteCatalog::open_in_memory().unwrap(),
            raced_path: raced_path.clone(),
        };

        let err = Scanner::scan(&mut catalog, dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicatePath(ref p) if *p == raced_path));

        // Only the concurrent writer's record survives
        let survivors = paths(&catalog.inner);
        assert_eq!(survivors, BTreeSet::from([raced_path]));

        // Next pass picks up everything that was rolled back
        let report = Scanner::scan(&mut catalog.inner, dir.path()).unwrap();
        assert_eq!(report.inserted, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_not_followed() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub").join("loop")).unwrap();
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();

        let report = Scanner::scan(&mut catalog, dir.path()).unwrap();
        assert_eq!(report.discovered, 5);
        let link = catalog.scan_all().unwrap().into_iter().find(|r| r.file_name == "loop").unwrap();
        assert_eq!(link.file_type, "Directory");
    }
}
