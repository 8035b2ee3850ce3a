//! Application configuration.
//!
//! Front ends build an `AppConfig` (defaults plus their own overrides) and
//! hand it to `AppContext::open`. Nothing here reads the environment.

use crate::export::DEFAULT_EXPORT_PATH;
use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "data/marksheet.db";
pub const DEFAULT_LOG_DIR: &str = "data/logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file holding the `students` table.
    pub db_path: PathBuf,
    /// Workbook written by export; overwritten each time.
    pub export_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_level: default_log_level().to_string(),
        }
    }
}

impl AppConfig {
    /// Makes every relative path absolute by joining it onto `base`.
    pub fn resolved_against(self, base: &Path) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        };
        Self {
            db_path: resolve(self.db_path),
            export_path: resolve(self.export_path),
            log_dir: resolve(self.log_dir),
            log_level: self.log_level,
        }
    }
}
