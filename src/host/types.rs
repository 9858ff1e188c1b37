use serde::{Deserialize, Serialize};

/// Window kinds reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Normal,
    Popup,
    Panel,
    App,
    Devtools,
    #[serde(other)]
    Other,
}

/// Window display states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
    LockedFullscreen,
    #[serde(other)]
    Other,
}

/// Point-in-time view of a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "type")]
    pub window_type: Option<WindowType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<WindowState>,
}

/// Point-in-time view of a tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: bool,
    /// Milliseconds since the epoch, as reported by the host.
    #[serde(default)]
    pub last_accessed: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabQuery {
    pub window_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabUpdate {
    pub active: bool,
}

impl TabUpdate {
    pub fn activate() -> Self {
        Self { active: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowUpdate {
    pub state: WindowState,
}

impl WindowUpdate {
    pub fn maximize() -> Self {
        Self { state: WindowState::Maximized }
    }
}
