use crate::config::ConfigAccessor;
use crate::history::WindowHistory;
use crate::host::{HostApi, Tab, TabQuery, TabUpdate};
use crate::platform::PlatformGuard;
use log::{debug, info};
use std::sync::Arc;

/// Terminal point reached by one "switch to last tab" invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Disabled,
    /// The shortcut clashes with a reserved binding on this browser.
    UnsupportedPlatform,
    NoFocusedWindow,
    TooFewTabs,
    NoActiveTab,
    /// The tab recorded in the window history was activated.
    ActivatedPrevious(i64),
    /// The most recently accessed inactive tab was activated.
    ActivatedMostRecent(i64),
    NoCandidate,
    /// The fallback activation was rejected by the host.
    Failed,
}

/// Pick the inactive tab with the latest `last_accessed`. A missing timestamp
/// sorts below every real one; on ties the first tab in host order wins.
fn most_recent_inactive(tabs: &[Tab]) -> Option<i64> {
    let mut best: Option<(i64, f64)> = None;
    for tab in tabs.iter().filter(|tab| !tab.active) {
        let Some(id) = tab.id else { continue };
        let accessed = tab.last_accessed.unwrap_or(f64::NEG_INFINITY);
        match best {
            Some((_, best_accessed)) if accessed <= best_accessed => {}
            Some(_) | None => best = Some((id, accessed)),
        }
    }
    best.map(|(id, _)| id)
}

/// Activates the previously active tab of the focused window.
pub struct LastTabSwitchPolicy {
    config: Arc<ConfigAccessor>,
    host: Arc<dyn HostApi>,
    history: Arc<WindowHistory>,
    platform: Arc<PlatformGuard>,
}

impl LastTabSwitchPolicy {
    pub fn new(
        config: Arc<ConfigAccessor>,
        host: Arc<dyn HostApi>,
        history: Arc<WindowHistory>,
        platform: Arc<PlatformGuard>,
    ) -> Self {
        Self { config, host, history, platform }
    }

    pub async fn switch(&self) -> SwitchOutcome {
        let config = self.config.get_config().await;
        if !config.last_tab_shortcut_enabled {
            return SwitchOutcome::Disabled;
        }

        if !self.platform.is_supported() {
            debug!("Last-tab switch disabled on this browser");
            return SwitchOutcome::UnsupportedPlatform;
        }

        let window_id = match self.host.get_last_focused_window().await {
            Ok(window) => match window.id {
                Some(id) => id,
                None => return SwitchOutcome::NoFocusedWindow,
            },
            Err(e) => {
                debug!("No focused window for last-tab switch: {e}");
                return SwitchOutcome::NoFocusedWindow;
            }
        };

        let tabs = self.host.query_tabs(TabQuery { window_id }).await;
        if tabs.len() < 2 {
            return SwitchOutcome::TooFewTabs;
        }

        let Some(active_id) = tabs.iter().find(|tab| tab.active).and_then(|tab| tab.id) else {
            return SwitchOutcome::NoActiveTab;
        };

        if let Some(previous_id) = self.history.previous_tab_of(window_id) {
            let still_open = tabs.iter().any(|tab| tab.id == Some(previous_id));
            if previous_id != active_id && still_open {
                match self.host.update_tab(previous_id, TabUpdate::activate()).await {
                    Ok(_) => {
                        info!("Switched window {window_id} back to tab {previous_id}");
                        return SwitchOutcome::ActivatedPrevious(previous_id);
                    }
                    Err(e) => {
                        // Closed concurrently; fall back to access order.
                        debug!("Could not activate previous tab {previous_id}: {e}");
                    }
                }
            }
        }

        let Some(target_id) = most_recent_inactive(&tabs) else {
            return SwitchOutcome::NoCandidate;
        };

        match self.host.update_tab(target_id, TabUpdate::activate()).await {
            Ok(_) => {
                info!("Switched window {window_id} to most recent tab {target_id}");
                SwitchOutcome::ActivatedMostRecent(target_id)
            }
            Err(e) => {
                debug!("Could not activate tab {target_id}: {e}");
                SwitchOutcome::Failed
            }
        }
    }
}
