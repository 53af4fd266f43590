// FILE: src/engine/searcher.rs
use std::time::Instant;

use crate::error::{CatalogError, Result};
use crate::storage::{CatalogStore, FileRecord, ResultSetName, SearchResultRow};

/// What a search pass produced. An empty result is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Matches(Vec<SearchResultRow>),
    NoMatches,
}

impl SearchOutcome {
    pub fn rows(&self) -> &[SearchResultRow] {
        match self {
            SearchOutcome::Matches(rows) => rows,
            SearchOutcome::NoMatches => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SearchOutcome::NoMatches)
    }
}

/// Non-overlapping, case-insensitive occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> u64 {
    if needle.is_empty() {
        return 0;
    }
    haystack.to_lowercase().matches(&needle.to_lowercase()).count() as u64
}

/// Row for `record`, if it matches `term` by name or by content.
///
/// A name match always yields a row and reports 0 occurrences, even when the
/// content matches too; that zero is how the display marks "found by name".
pub fn match_record(record: &FileRecord, term: &str) -> Option<SearchResultRow> {
    let content_hits = count_occurrences(&record.content, term);
    let name_hit = record.file_name.to_lowercase().contains(&term.to_lowercase());

    let occurrences = if name_hit {
        0
    } else if content_hits > 0 {
        content_hits
    } else {
        return None;
    };

    Some(SearchResultRow {
        file_name: record.file_name.clone(),
        full_path: record.full_path.clone(),
        occurrences,
        file_type: record.file_type.clone(),
    })
}

pub struct Searcher;

impl Searcher {
    /// Recompute the result set `set` for `term` against the whole catalog.
    ///
    /// The previous contents of `set` are replaced in one transaction; the
    /// rows returned are read back from the store in insertion order.
    pub fn search<S>(store: &mut S, term: &str, set: &ResultSetName) -> Result<SearchOutcome>
    where
        S: CatalogStore + ?Sized,
    {
        if term.is_empty() {
            return Err(CatalogError::EmptySearchTerm);
        }
        let start = Instant::now();

        let rows: Vec<SearchResultRow> = store
            .scan_all()?
            .iter()
            .filter_map(|record| match_record(record, term))
            .collect();

        store.replace_results(set, &rows)?;
        let stored = store.read_results(set)?;

        tracing::info!(
            "[Searcher] Search for term '{}' into {} completed ({} rows). Time taken: {:?}",
            term, set, stored.len(), start.elapsed()
        );

        if stored.is_empty() {
            Ok(SearchOutcome::NoMatches)
        } else {
            Ok(SearchOutcome::Matches(stored))
        }
    }
}
