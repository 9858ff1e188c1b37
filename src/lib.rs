pub mod config;
pub mod constants;
pub mod db;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod host;
mod models;
pub mod native_host;
pub mod platform;
pub mod policy;
#[cfg(test)]
mod test_utils;
pub mod validation;

use crate::config::{ConfigAccessor, SqliteSettingsStore};
use crate::db::{migrations, Database};
use crate::native_host::NativeHost;
use directories::ProjectDirs;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Error type for maxtab initialization failures
#[derive(Debug)]
pub enum InitError {
    NoProjectDirs,
    DataDirCreation(std::io::Error),
    DatabaseOpen(rusqlite::Error),
    Migration(rusqlite::Error),
    Host(error::AppError),
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitError::NoProjectDirs => write!(f, "Could not determine project directories"),
            InitError::DataDirCreation(e) => write!(f, "Could not create data directory: {e}"),
            InitError::DatabaseOpen(e) => write!(f, "Failed to open database: {e}"),
            InitError::Migration(e) => write!(f, "Failed to run database migrations: {e}"),
            InitError::Host(e) => write!(f, "Native host stopped: {e}"),
        }
    }
}

impl std::error::Error for InitError {}

/// Location of the settings database, creating the data directory if needed.
pub fn get_db_path() -> Result<PathBuf, InitError> {
    let proj_dirs = ProjectDirs::from("com", "maxtab", "MaxTab")
        .ok_or(InitError::NoProjectDirs)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join("maxtab.db"))
}

/// Open the settings database at `path` and wrap it in a config accessor.
pub fn open_config(path: &Path) -> Result<ConfigAccessor, InitError> {
    let db = Database::open(path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    let store = SqliteSettingsStore::new(Arc::new(Mutex::new(db)));
    Ok(ConfigAccessor::new(Arc::new(store)))
}

/// Serve the browser extension over stdin/stdout until it disconnects.
pub async fn run() -> Result<(), InitError> {
    let db_path = get_db_path().inspect_err(|e| error!("maxtab initialization failed: {e}"))?;
    let config = open_config(&db_path).inspect_err(|e| error!("maxtab initialization failed: {e}"))?;
    info!("Using settings database at {}", db_path.display());

    NativeHost::new(Arc::new(config))
        .run(tokio::io::stdin(), tokio::io::stdout())
        .await
        .map_err(InitError::Host)
}

/// Lock a mutex, recovering from poisoning if necessary
pub(crate) fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
