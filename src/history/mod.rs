use crate::safe_lock;
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Remembers, per live window, the tab that was active before the current one.
///
/// Mutators never suspend, so an update is always applied whole even when a
/// policy evaluation is parked on a host call.
#[derive(Debug, Default)]
pub struct WindowHistory {
    previous_tab_by_window: Mutex<HashMap<i64, i64>>,
}

impl WindowHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_map(&self) -> MutexGuard<'_, HashMap<i64, i64>> {
        safe_lock(&self.previous_tab_by_window, "WindowHistory")
    }

    /// Record a tab-activation transition. A missing or negative previous tab
    /// id leaves the stored entry alone.
    pub fn on_tab_activated(&self, window_id: i64, previous_tab_id: Option<i64>) {
        match previous_tab_id {
            Some(tab_id) if tab_id >= 0 => {
                self.lock_map().insert(window_id, tab_id);
            }
            Some(_) | None => {
                debug!("Tab activated in window {window_id} without a usable previous tab");
            }
        }
    }

    pub fn on_window_removed(&self, window_id: i64) {
        self.lock_map().remove(&window_id);
    }

    pub fn previous_tab_of(&self, window_id: i64) -> Option<i64> {
        self.lock_map().get(&window_id).copied()
    }

    pub fn len(&self) -> usize {
        self.lock_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_map().is_empty()
    }
}
