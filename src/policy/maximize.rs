use crate::config::ConfigAccessor;
use crate::host::{HostApi, TabQuery, Window, WindowType, WindowUpdate};
use log::{debug, info};
use fancy_regex::Regex;
use std::sync::Arc;

/// Terminal point reached by one auto-maximize evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaximizeOutcome {
    /// The created window carried no id.
    NoWindowId,
    /// Devtools windows are never resized.
    Devtools,
    Disabled,
    /// A tab URL matched an exclusion pattern.
    Excluded { url: String, pattern: String },
    Maximized,
    /// The host rejected the maximize request.
    Failed,
}

/// Whether any URL matches any exclusion pattern. Patterns that fail to
/// compile are skipped, as are matches that exceed the backtracking limit.
/// Returns the first match found, for diagnostics.
pub fn should_skip_window<'a>(urls: &[&'a str], patterns: &[String]) -> Option<(&'a str, String)> {
    if patterns.is_empty() {
        return None;
    }

    let compiled: Vec<Regex> = patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                debug!("Skipping invalid exclusion pattern {pattern:?}: {e}");
                None
            }
        })
        .collect();

    urls.iter().find_map(|url| {
        compiled
            .iter()
            .find(|regex| match regex.is_match(url) {
                Ok(matched) => matched,
                Err(e) => {
                    debug!("Exclusion pattern {:?} gave up on {url}: {e}", regex.as_str());
                    false
                }
            })
            .map(|regex| (*url, regex.as_str().to_string()))
    })
}

/// Maximizes newly created windows unless one of their tabs is excluded.
pub struct AutoMaximizePolicy {
    config: Arc<ConfigAccessor>,
    host: Arc<dyn HostApi>,
}

impl AutoMaximizePolicy {
    pub fn new(config: Arc<ConfigAccessor>, host: Arc<dyn HostApi>) -> Self {
        Self { config, host }
    }

    pub async fn evaluate(&self, window: &Window) -> MaximizeOutcome {
        let Some(window_id) = window.id else {
            return MaximizeOutcome::NoWindowId;
        };
        if window.window_type == Some(WindowType::Devtools) {
            return MaximizeOutcome::Devtools;
        }

        let config = self.config.get_config().await;
        if !config.auto_maximize_enabled {
            return MaximizeOutcome::Disabled;
        }

        let tabs = self.host.query_tabs(TabQuery { window_id }).await;
        let urls: Vec<&str> = tabs
            .iter()
            .filter_map(|tab| tab.url.as_deref())
            .filter(|url| !url.is_empty())
            .collect();

        if let Some((url, pattern)) = should_skip_window(&urls, &config.auto_maximize_exclude_patterns) {
            debug!("Window {window_id} excluded from maximize: {url} matches {pattern:?}");
            return MaximizeOutcome::Excluded { url: url.to_string(), pattern };
        }

        match self.host.update_window(window_id, WindowUpdate::maximize()).await {
            Ok(_) => {
                info!("Maximized window {window_id}");
                MaximizeOutcome::Maximized
            }
            Err(e) => {
                // Window already closed, or maximize unsupported here.
                debug!("Could not maximize window {window_id}: {e}");
                MaximizeOutcome::Failed
            }
        }
    }
}
