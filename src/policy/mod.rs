pub mod last_tab;
pub mod maximize;

pub use last_tab::{LastTabSwitchPolicy, SwitchOutcome};
pub use maximize::{should_skip_window, AutoMaximizePolicy, MaximizeOutcome};
