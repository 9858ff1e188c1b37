pub mod types;

pub use types::{Tab, TabQuery, TabUpdate, Window, WindowState, WindowType, WindowUpdate};

use crate::error::HostError;
use async_trait::async_trait;

/// Windowing and tabbing commands offered by the host browser.
///
/// Every call may suspend; ids passed in may already be stale by the time the
/// host sees them, in which case the mutating calls fail with `HostError`.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Tabs of one window. Never fails; no match yields an empty list.
    async fn query_tabs(&self, query: TabQuery) -> Vec<Tab>;

    /// Succeeds unless the host rejects the command. The host may not echo
    /// the updated tab back, so the snapshot is optional.
    async fn update_tab(&self, tab_id: i64, update: TabUpdate) -> Result<Option<Tab>, HostError>;

    async fn update_window(&self, window_id: i64, update: WindowUpdate) -> Result<Option<Window>, HostError>;

    /// Fails when no window can currently be focused.
    async fn get_last_focused_window(&self) -> Result<Window, HostError>;
}
