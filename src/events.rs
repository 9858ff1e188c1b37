use crate::host::Window;
use crate::platform::PlatformSignals;

/// Lifecycle notifications delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// First activation of the extension.
    Installed,
    WindowCreated(Window),
    /// A bound keyboard command fired.
    Command(String),
    TabActivated {
        window_id: i64,
        previous_tab_id: Option<i64>,
    },
    WindowRemoved(i64),
    /// Client signals used by the platform guard.
    PlatformReported(PlatformSignals),
}
