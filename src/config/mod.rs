pub mod store;
pub mod types;

pub use store::{SettingsStore, SqliteSettingsStore};
pub use types::{Configuration, CONFIG_KEYS};

use crate::error::AppError;
use crate::validation::validate_exclude_patterns;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Reads and writes the settings record, normalizing whatever is stored.
pub struct ConfigAccessor {
    store: Arc<dyn SettingsStore>,
}

impl ConfigAccessor {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Current configuration. Never fails: a store error yields the defaults.
    pub async fn get_config(&self) -> Configuration {
        match self.store.get(&CONFIG_KEYS).await {
            Ok(values) => Configuration::from_stored(&values),
            Err(e) => {
                warn!("Failed to read settings, using defaults: {e}");
                Configuration::default()
            }
        }
    }

    /// Rewrite the stored record so every key holds a valid value.
    /// Valid stored fields are kept as they are.
    pub async fn initialize_defaults(&self) {
        let existing = match self.store.get(&CONFIG_KEYS).await {
            Ok(values) => values,
            Err(e) => {
                warn!("Failed to read settings during initialization: {e}");
                return;
            }
        };

        let merged = Configuration::from_stored(&existing);
        if let Err(e) = self.store.set(merged.to_stored()).await {
            warn!("Failed to write initial settings: {e}");
            return;
        }
        info!("Settings initialized");
    }

    /// Save settings coming from the options page. Rejects the whole record
    /// if any exclusion pattern is invalid.
    pub async fn save(&self, config: &Configuration) -> Result<(), AppError> {
        validate_exclude_patterns(&config.auto_maximize_exclude_patterns)?;
        self.store.set(config.to_stored()).await
    }

    /// Save a settings record exactly as the options page sent it. Missing
    /// keys take their defaults; a value of the wrong type rejects the save.
    pub async fn save_submitted(&self, submitted: Value) -> Result<(), AppError> {
        let config: Configuration = serde_json::from_value(submitted).map_err(|e| AppError::InvalidInput {
            field: "settings",
            reason: e.to_string(),
        })?;
        self.save(&config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Setting;
    use crate::test_utils::{setup_test_config, setup_test_db};
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};

    struct FailingStore;

    #[async_trait]
    impl SettingsStore for FailingStore {
        async fn get(&self, _keys: &[&str]) -> Result<Map<String, Value>, AppError> {
            Err(AppError::LockPoisoned)
        }

        async fn set(&self, _values: Map<String, Value>) -> Result<(), AppError> {
            Err(AppError::LockPoisoned)
        }
    }

    #[tokio::test]
    async fn test_get_config_defaults_on_empty_store() {
        let (config, _dir) = setup_test_config();
        assert_eq!(config.get_config().await, Configuration::default());
    }

    #[tokio::test]
    async fn test_get_config_defaults_on_store_failure() {
        let config = ConfigAccessor::new(Arc::new(FailingStore));
        assert_eq!(config.get_config().await, Configuration::default());
    }

    #[tokio::test]
    async fn test_initialize_defaults_keeps_valid_fields_and_heals_invalid() {
        let (db, _dir) = setup_test_db();
        Setting::upsert(db.connection(), "autoMaximizeEnabled", "false").unwrap();
        Setting::upsert(db.connection(), "lastTabShortcutEnabled", "\"yes\"").unwrap();
        Setting::upsert(db.connection(), "autoMaximizeExcludePatterns", "[\"x\\\\.com\"]").unwrap();
        let db = Arc::new(std::sync::Mutex::new(db));
        let store = Arc::new(SqliteSettingsStore::new(Arc::clone(&db)));
        let config = ConfigAccessor::new(store);

        config.initialize_defaults().await;

        let guard = db.lock().unwrap();
        let conn = guard.connection();
        let stored = |key: &str| -> Value {
            serde_json::from_str(&Setting::find(conn, key).unwrap().unwrap().value).unwrap()
        };
        assert_eq!(stored("autoMaximizeEnabled"), json!(false));
        assert_eq!(stored("lastTabShortcutEnabled"), json!(true));
        assert_eq!(stored("autoMaximizeExcludePatterns"), json!(["x\\.com"]));
        assert_eq!(stored("moveCurrentTabToNewWindowEnabled"), json!(true));
    }

    #[tokio::test]
    async fn test_initialize_defaults_survives_store_failure() {
        let config = ConfigAccessor::new(Arc::new(FailingStore));
        config.initialize_defaults().await;
    }

    #[tokio::test]
    async fn test_save_persists_valid_config() {
        let (config, _dir) = setup_test_config();
        let wanted = Configuration {
            auto_maximize_enabled: false,
            auto_maximize_exclude_patterns: vec!["example\\.com".into()],
            last_tab_shortcut_enabled: true,
            move_current_tab_to_new_window_enabled: false,
        };

        config.save(&wanted).await.unwrap();
        assert_eq!(config.get_config().await, wanted);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_pattern_and_writes_nothing() {
        let (config, _dir) = setup_test_config();
        let wanted = Configuration {
            auto_maximize_enabled: false,
            auto_maximize_exclude_patterns: vec!["(".into()],
            ..Configuration::default()
        };

        let err = config.save(&wanted).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
        assert_eq!(config.get_config().await, Configuration::default());
    }

    #[tokio::test]
    async fn test_save_submitted_fills_missing_keys() {
        let (config, _dir) = setup_test_config();

        config
            .save_submitted(json!({"autoMaximizeEnabled": false}))
            .await
            .unwrap();

        let saved = config.get_config().await;
        assert!(!saved.auto_maximize_enabled);
        assert!(saved.last_tab_shortcut_enabled);
    }

    #[tokio::test]
    async fn test_save_submitted_rejects_wrong_types() {
        let (config, _dir) = setup_test_config();

        for submitted in [
            json!({"autoMaximizeEnabled": "yes"}),
            json!({"autoMaximizeExcludePatterns": ["ok", 7]}),
            json!("not a record"),
            Value::Null,
        ] {
            let err = config.save_submitted(submitted).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput { field: "settings", .. }));
        }
        assert_eq!(config.get_config().await, Configuration::default());
    }
}
