use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::Setting;
use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

/// Durable key-value storage for settings. Values are arbitrary JSON.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the given keys. Keys without a stored value are absent from the map.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, AppError>;

    /// Write every entry of `values`, replacing what was stored.
    async fn set(&self, values: Map<String, Value>) -> Result<(), AppError>;
}

/// `SettingsStore` backed by the `settings` table.
pub struct SqliteSettingsStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteSettingsStore {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, AppError> {
        let rows = with_connection(&self.db, "load settings", |conn| Setting::find_many(conn, keys))?;

        let mut values = Map::new();
        for row in rows {
            match serde_json::from_str::<Value>(&row.value) {
                Ok(value) => {
                    values.insert(row.key, value);
                }
                Err(e) => debug!("Ignoring unparseable stored value for {}: {e}", row.key),
            }
        }
        Ok(values)
    }

    async fn set(&self, values: Map<String, Value>) -> Result<(), AppError> {
        let encoded = values
            .iter()
            .map(|(key, value)| Ok((key.as_str(), serde_json::to_string(value)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;

        with_connection(&self.db, "save settings", |conn| {
            let tx = conn.unchecked_transaction()?;
            for (key, value) in &encoded {
                Setting::upsert(&tx, key, value)?;
            }
            tx.commit()
        })
    }
}
