//! Runtime configuration
//!
//! Layered lowest to highest: defaults, the JSON file named by
//! `FILECAT_CONFIG`, `FILECAT_*` environment variables, positional arguments
//! (`filecat <watch_dir> [db_path]`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::storage::ResultSetName;

pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;

pub const ENV_CONFIG: &str = "FILECAT_CONFIG";
pub const ENV_DB: &str = "FILECAT_DB";
pub const ENV_SCAN_INTERVAL: &str = "FILECAT_SCAN_INTERVAL_SECS";
pub const ENV_RESULT_SET: &str = "FILECAT_RESULT_SET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub watch_dir: PathBuf,
    pub db_path: PathBuf,
    pub scan_interval: Duration,
    pub result_set: ResultSetName,
}

/// Shape of the optional JSON config file. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub watch_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub scan_interval_secs: Option<u64>,
    pub result_set: Option<String>,
}

impl FileConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| CatalogError::Config(format!("Invalid config file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// `<data_local_dir>/filecat/catalog.db`, or `/tmp/.filecat/catalog.db`.
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("filecat"))
        .unwrap_or_else(|| PathBuf::from("/tmp").join(".filecat"))
        .join("catalog.db")
}

impl Config {
    /// Build from the process environment and arguments (without argv[0]).
    pub fn load(args: &[String]) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let file = match env.get(ENV_CONFIG) {
            Some(path) => FileConfig::load(Path::new(path))?,
            None => FileConfig::default(),
        };
        Self::resolve(file, &env, args)
    }

    pub fn resolve(file: FileConfig, env: &HashMap<String, String>, args: &[String]) -> Result<Self> {
        let watch_dir = args.first()
            .map(PathBuf::from)
            .or(file.watch_dir)
            .ok_or_else(|| CatalogError::Config("No watch directory given".into()))?;

        let db_path = args.get(1)
            .map(PathBuf::from)
            .or_else(|| env.get(ENV_DB).map(PathBuf::from))
            .or(file.db_path)
            .unwrap_or_else(default_db_path);

        let interval_secs = match env.get(ENV_SCAN_INTERVAL) {
            Some(raw) => raw.trim().parse::<u64>()
                .map_err(|_| CatalogError::Config(format!("{} is not a number of seconds: {}", ENV_SCAN_INTERVAL, raw)))?,
            None => file.scan_interval_secs.unwrap_or(DEFAULT_SCAN_INTERVAL_SECS),
        };
        if interval_secs == 0 {
            return Err(CatalogError::Config("Scan interval must be at least one second".into()));
        }

        let result_set = match env.get(ENV_RESULT_SET).cloned().or(file.result_set) {
            Some(name) => ResultSetName::new(&name)?,
            None => ResultSetName::default(),
        };

        Ok(Self {
            watch_dir,
            db_path,
            scan_interval: Duration::from_secs(interval_secs),
            result_set,
        })
    }
}
