// src/constants.rs

use std::time::Duration;

/// Command name bound to the "switch to last tab" shortcut
pub const SWITCH_TO_LAST_TAB_COMMAND: &str = "switch-to-last-tab";

/// Delay between a window-created event and the auto-maximize evaluation,
/// so startup tabs have a chance to attach to the window
pub const MAXIMIZE_GRACE_PERIOD: Duration = Duration::from_millis(300);

/// How long a host command may stay unanswered before it fails
pub const HOST_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Chrome limits native messaging to 1MB (1024 * 1024 bytes)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Maximum exclusion pattern length
pub const MAX_PATTERN_LEN: usize = 500;

/// Environment variable holding the log filter for the native host
pub const LOG_ENV_VAR: &str = "MAXTAB_LOG";
