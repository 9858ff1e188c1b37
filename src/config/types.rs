use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const KEY_AUTO_MAXIMIZE_ENABLED: &str = "autoMaximizeEnabled";
pub const KEY_AUTO_MAXIMIZE_EXCLUDE_PATTERNS: &str = "autoMaximizeExcludePatterns";
pub const KEY_LAST_TAB_SHORTCUT_ENABLED: &str = "lastTabShortcutEnabled";
pub const KEY_MOVE_CURRENT_TAB_TO_NEW_WINDOW_ENABLED: &str = "moveCurrentTabToNewWindowEnabled";

/// Every key the configuration reads from the store.
pub const CONFIG_KEYS: [&str; 4] = [
    KEY_AUTO_MAXIMIZE_ENABLED,
    KEY_AUTO_MAXIMIZE_EXCLUDE_PATTERNS,
    KEY_LAST_TAB_SHORTCUT_ENABLED,
    KEY_MOVE_CURRENT_TAB_TO_NEW_WINDOW_ENABLED,
];

/// Snapshot of the user's settings, always fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub auto_maximize_enabled: bool,
    /// Regex sources; order only matters for diagnostics.
    pub auto_maximize_exclude_patterns: Vec<String>,
    pub last_tab_shortcut_enabled: bool,
    /// Consumed by the extension's "move tab to new window" action; only stored here.
    pub move_current_tab_to_new_window_enabled: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            auto_maximize_enabled: true,
            auto_maximize_exclude_patterns: Vec::new(),
            last_tab_shortcut_enabled: true,
            move_current_tab_to_new_window_enabled: true,
        }
    }
}

impl Configuration {
    /// Build a configuration from raw stored values. A value of the wrong
    /// shape counts as missing and falls back to its default.
    pub fn from_stored(values: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            auto_maximize_enabled: stored_bool(
                values,
                KEY_AUTO_MAXIMIZE_ENABLED,
                defaults.auto_maximize_enabled,
            ),
            auto_maximize_exclude_patterns: stored_strings(values, KEY_AUTO_MAXIMIZE_EXCLUDE_PATTERNS)
                .unwrap_or(defaults.auto_maximize_exclude_patterns),
            last_tab_shortcut_enabled: stored_bool(
                values,
                KEY_LAST_TAB_SHORTCUT_ENABLED,
                defaults.last_tab_shortcut_enabled,
            ),
            move_current_tab_to_new_window_enabled: stored_bool(
                values,
                KEY_MOVE_CURRENT_TAB_TO_NEW_WINDOW_ENABLED,
                defaults.move_current_tab_to_new_window_enabled,
            ),
        }
    }

    /// The record as written back to the store, one entry per key.
    pub fn to_stored(&self) -> Map<String, Value> {
        let mut values = Map::new();
        values.insert(KEY_AUTO_MAXIMIZE_ENABLED.into(), Value::Bool(self.auto_maximize_enabled));
        values.insert(
            KEY_AUTO_MAXIMIZE_EXCLUDE_PATTERNS.into(),
            Value::Array(
                self.auto_maximize_exclude_patterns
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect(),
            ),
        );
        values.insert(KEY_LAST_TAB_SHORTCUT_ENABLED.into(), Value::Bool(self.last_tab_shortcut_enabled));
        values.insert(
            KEY_MOVE_CURRENT_TAB_TO_NEW_WINDOW_ENABLED.into(),
            Value::Bool(self.move_current_tab_to_new_window_enabled),
        );
        values
    }
}

fn stored_bool(values: &Map<String, Value>, key: &str, default: bool) -> bool {
    values.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// A sequence with any non-string element is rejected as a whole.
fn stored_strings(values: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    values
        .get(key)?
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_owned))
        .collect()
}
