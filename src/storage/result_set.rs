//! Typed identifier for a named result set.
//!
//! The name becomes a table name, so it is checked once here and every
//! later SQL statement can interpolate it without re-validation.

use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, Result};
use crate::storage::CATALOG_TABLE;

const MAX_LEN: usize = 64;

pub const DEFAULT_RESULT_SET: &str = "search_results_user";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultSetName(String);

impl ResultSetName {
    pub fn new(name: &str) -> Result<Self> {
        let mut chars = name.chars();
        let valid_head = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        let valid_tail = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid_head || !valid_tail || name.len() > MAX_LEN {
            return Err(CatalogError::InvalidResultSet(name.to_string()));
        }

        let lower = name.to_ascii_lowercase();
        if lower == CATALOG_TABLE || lower.starts_with("sqlite_") {
            return Err(CatalogError::InvalidResultSet(format!("{} is reserved", name)));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for use as an SQL identifier.
    pub(crate) fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl Default for ResultSetName {
    fn default() -> Self {
        Self(DEFAULT_RESULT_SET.to_string())
    }
}

impl FromStr for ResultSetName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for ResultSetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
