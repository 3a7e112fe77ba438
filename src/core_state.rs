//! Application state shared by every command: where the data lives.
//!
//! Nothing is cached between calls. Each command opens its own connection
//! and reloads the schema, so edits made by another process are picked up.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::config;
use crate::db::{self, DatabaseError};
use crate::models::Schema;
use crate::schema_store::SchemaStore;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CoreState {
    data_dir: PathBuf,
}

impl CoreState {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// State rooted at `config::app_data_dir()`.
    pub fn from_env() -> Self {
        Self::new(config::app_data_dir())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Open a fresh connection to the record database (runs migrations).
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&config::database_path(&self.data_dir))
    }

    pub fn schema_store(&self) -> SchemaStore {
        SchemaStore::new(config::fields_config_path(&self.data_dir))
    }

    /// Current schema, falling back to the built-in defaults.
    pub fn load_schema(&self) -> Result<Schema, DatabaseError> {
        self.schema_store().load()
    }

    pub fn exports_dir(&self) -> PathBuf {
        config::exports_dir(&self.data_dir)
    }

    /// First-run setup: data directory, default schema, migrated database.
    /// Returns true when the schema file was created by this call.
    pub fn initialize(&self) -> Result<bool, DatabaseError> {
        std::fs::create_dir_all(&self.data_dir)?;
        let created = self.schema_store().initialize()?;
        drop(self.open_db()?);
        tracing::info!(
            data_dir = %self.data_dir.display(),
            created,
            "{} v{} ready",
            config::APP_NAME,
            config::APP_VERSION
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_under_data_dir() {
        let state = CoreState::new("/tmp/rj-state");
        assert_eq!(state.data_dir(), Path::new("/tmp/rj-state"));
        assert!(state.schema_store().path().ends_with("fields_config.json"));
        assert!(state.exports_dir().ends_with("exports"));
    }

    #[test]
    fn initialize_creates_schema_once() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(dir.path().join("home"));
        assert!(state.initialize().unwrap());
        assert!(!state.initialize().unwrap());
        assert!(state.schema_store().path().exists());
        assert!(config::database_path(state.data_dir()).exists());
    }

    #[test]
    fn schema_defaults_before_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(dir.path());
        assert_eq!(state.load_schema().unwrap(), Schema::builtin());
    }

    #[test]
    fn each_open_is_independent() {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(dir.path());
        let a = state.open_db().unwrap();
        let b = state.open_db().unwrap();
        drop(a);
        let n: i64 = b
            .query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }
}
