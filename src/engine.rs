use crate::config::ConfigAccessor;
use crate::constants::{MAXIMIZE_GRACE_PERIOD, SWITCH_TO_LAST_TAB_COMMAND};
use crate::events::HostEvent;
use crate::history::WindowHistory;
use crate::host::HostApi;
use crate::platform::PlatformGuard;
use crate::policy::{AutoMaximizePolicy, LastTabSwitchPolicy};
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Routes host events to the tracker and the two policies.
pub struct Engine {
    config: Arc<ConfigAccessor>,
    history: Arc<WindowHistory>,
    platform: Arc<PlatformGuard>,
    maximize: Arc<AutoMaximizePolicy>,
    last_tab: LastTabSwitchPolicy,
    maximize_grace: Duration,
}

impl Engine {
    pub fn new(config: Arc<ConfigAccessor>, host: Arc<dyn HostApi>) -> Self {
        let history = Arc::new(WindowHistory::new());
        let platform = Arc::new(PlatformGuard::default());
        let maximize = Arc::new(AutoMaximizePolicy::new(Arc::clone(&config), Arc::clone(&host)));
        let last_tab = LastTabSwitchPolicy::new(
            Arc::clone(&config),
            host,
            Arc::clone(&history),
            Arc::clone(&platform),
        );

        Self {
            config,
            history,
            platform,
            maximize,
            last_tab,
            maximize_grace: MAXIMIZE_GRACE_PERIOD,
        }
    }

    /// Override the delay before auto-maximize evaluates a new window.
    #[must_use]
    pub fn with_maximize_grace(mut self, grace: Duration) -> Self {
        self.maximize_grace = grace;
        self
    }

    pub fn history(&self) -> &WindowHistory {
        &self.history
    }

    /// Handle one event. Window creation is evaluated on a spawned task after
    /// the grace period; its handle is returned so callers may await it.
    /// Every other event is fully handled before this returns.
    pub async fn dispatch(&self, event: HostEvent) -> Option<JoinHandle<()>> {
        match event {
            HostEvent::Installed => {
                self.config.initialize_defaults().await;
                None
            }
            HostEvent::WindowCreated(window) => {
                let policy = Arc::clone(&self.maximize);
                let grace = self.maximize_grace;
                Some(tokio::spawn(async move {
                    tokio::time::sleep(grace).await;
                    let outcome = policy.evaluate(&window).await;
                    debug!("Auto-maximize for window {:?}: {outcome:?}", window.id);
                }))
            }
            HostEvent::Command(name) => {
                if name == SWITCH_TO_LAST_TAB_COMMAND {
                    let outcome = self.last_tab.switch().await;
                    debug!("Last-tab switch: {outcome:?}");
                } else {
                    debug!("Ignoring unknown command {name:?}");
                }
                None
            }
            HostEvent::TabActivated { window_id, previous_tab_id } => {
                self.history.on_tab_activated(window_id, previous_tab_id);
                None
            }
            HostEvent::WindowRemoved(window_id) => {
                self.history.on_window_removed(window_id);
                None
            }
            HostEvent::PlatformReported(signals) => {
                self.platform.report(signals);
                None
            }
        }
    }
}
