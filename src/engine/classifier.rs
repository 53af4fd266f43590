//! Content Classifier
//!
//! Derives the type label, size and textual content recorded for one
//! filesystem entry. Read failures never escape this module: they become
//! the `UNREADABLE` sentinel so one bad file cannot abort a scan pass.

use std::fs;
use std::path::Path;

use crate::storage::FileRecord;

pub const DIRECTORY_TYPE: &str = "Directory";
pub const UNKNOWN_TYPE: &str = "Unknown";
pub const UNREADABLE: &str = "Unreadable";

/// Extension of a base name, dot included: everything from the last dot,
/// provided some non-dot character precedes it (`"..bashrc"` has none).
fn split_extension(name: &str) -> Option<&str> {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    let dot = name.rfind('.')?;
    (dot > stem_start).then(|| &name[dot..])
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `"Directory"`, the uppercased extension, or `"Unknown"`.
///
/// A bare trailing dot (`"name."`) is an extension with nothing after the
/// separator, so it yields `""`.
pub fn classify_type(path: &Path) -> String {
    if path.is_dir() {
        return DIRECTORY_TYPE.to_string();
    }
    match split_extension(&base_name(path)) {
        Some(ext) => ext[1..].to_uppercase(),
        None => UNKNOWN_TYPE.to_string(),
    }
}

/// Full UTF-8 text of a regular file, `""` for a directory, or `UNREADABLE`.
///
/// FIFOs, sockets and devices are never opened: a read could block the pass.
pub fn read_content(path: &Path) -> String {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::warn!("[Classifier] Unreadable content for {}: {}", path.display(), e);
            return UNREADABLE.to_string();
        }
    };
    if meta.is_dir() {
        return String::new();
    }
    if !meta.is_file() {
        tracing::warn!("[Classifier] Not a regular file, content skipped: {}", path.display());
        return UNREADABLE.to_string();
    }
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("[Classifier] Unreadable content for {}: {}", path.display(), e);
            UNREADABLE.to_string()
        }
    }
}

/// Extension with its leading dot, as it appears in the name.
pub fn file_extension(path: &Path) -> String {
    split_extension(&base_name(path))
        .map(str::to_string)
        .unwrap_or_default()
}

fn file_size(path: &Path) -> u64 {
    // Fall back to the link itself for dangling symlinks
    match fs::metadata(path).or_else(|_| fs::symlink_metadata(path)) {
        Ok(meta) => meta.len(),
        Err(e) => {
            tracing::warn!("[Classifier] Size unavailable for {}: {}", path.display(), e);
            0
        }
    }
}

/// Build the catalog record for `path` as it is on disk right now.
pub fn build_record(path: &Path) -> FileRecord {
    FileRecord {
        file_name: base_name(path),
        full_path: path.to_string_lossy().into_owned(),
        file_extension: file_extension(path),
        file_size: file_size(path),
        file_type: classify_type(path),
        content: read_content(path),
    }
}
