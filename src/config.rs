use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "Recovery Journal";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable that relocates the data directory.
pub const DATA_DIR_ENV: &str = "RECOVERY_JOURNAL_HOME";

/// Schema file name inside the data directory.
pub const FIELDS_CONFIG_FILE: &str = "fields_config.json";

/// Record database file name inside the data directory.
pub const DATABASE_FILE: &str = "journal.db";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "recovery_journal=info,warn"
}

/// Get the application data directory.
/// `$RECOVERY_JOURNAL_HOME` when set, otherwise ~/RecoveryJournal/.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("RecoveryJournal")
}

/// Schema (field configuration) file under a data directory
pub fn fields_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(FIELDS_CONFIG_FILE)
}

/// Record database under a data directory
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILE)
}

/// Directory that receives exported PDF reports
pub fn exports_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("exports")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_data_dir() {
        let base = PathBuf::from("/tmp/journal-home");
        assert!(fields_config_path(&base).starts_with(&base));
        assert!(fields_config_path(&base).ends_with("fields_config.json"));
        assert!(database_path(&base).ends_with("journal.db"));
        assert!(exports_dir(&base).ends_with("exports"));
    }

    #[test]
    fn app_data_dir_is_absolute_or_relative_fallback() {
        let dir = app_data_dir();
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn app_name_is_recovery_journal() {
        assert_eq!(APP_NAME, "Recovery Journal");
    }

    #[test]
    fn default_filter_targets_crate() {
        assert!(default_log_filter().starts_with("recovery_journal="));
    }
}
