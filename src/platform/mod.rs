use crate::safe_lock;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Browsers that share Chrome's engine but reserve the last-tab shortcut differently.
const NON_CHROME_BRANDS: &[&str] = &["microsoft edge", "opera", "brave", "vivaldi", "yandex"];

/// User-agent tokens of Chromium derivatives.
const NON_CHROME_UA_TOKENS: &[&str] = &[
    "Edg/",
    "OPR/",
    "Brave/",
    "Vivaldi/",
    "YaBrowser/",
    "DuckDuckGo/",
    "SamsungBrowser/",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub brand: String,
    #[serde(default)]
    pub version: String,
}

/// Client signals reported by the browser (navigator.userAgentData and friends).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSignals {
    #[serde(default)]
    pub brands: Option<Vec<Brand>>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
}

impl PlatformSignals {
    fn is_empty(&self) -> bool {
        self.brands.as_ref().is_none_or(Vec::is_empty)
            && self.user_agent.as_deref().is_none_or(str::is_empty)
            && self.vendor.as_deref().is_none_or(str::is_empty)
    }
}

/// Whether the signals describe Google Chrome itself rather than a lookalike.
pub fn is_supported_browser(signals: &PlatformSignals) -> bool {
    if let Some(brands) = signals.brands.as_ref().filter(|b| !b.is_empty()) {
        let names: Vec<String> = brands.iter().map(|b| b.brand.to_lowercase()).collect();
        let has_chrome = names.iter().any(|name| name.contains("google chrome"));
        let has_other = names
            .iter()
            .any(|name| NON_CHROME_BRANDS.iter().any(|other| name.contains(other)));
        if has_chrome && !has_other {
            return true;
        }
    }

    // Restricted contexts may expose nothing at all; treat that as compatible.
    if signals.is_empty() {
        return true;
    }

    let ua = signals.user_agent.as_deref().unwrap_or("");
    let chromium_family = ua.contains("Chrome/") || ua.contains("CriOS/");
    if !chromium_family || NON_CHROME_UA_TOKENS.iter().any(|token| ua.contains(token)) {
        return false;
    }

    // Worker environments can report an empty vendor.
    let vendor = signals.vendor.as_deref().unwrap_or("");
    vendor.is_empty() || vendor.contains("Google Inc.")
}

/// Holds the most recently reported platform signals.
#[derive(Debug, Default)]
pub struct PlatformGuard {
    signals: Mutex<PlatformSignals>,
}

impl PlatformGuard {
    pub fn new(signals: PlatformSignals) -> Self {
        Self { signals: Mutex::new(signals) }
    }

    fn lock_signals(&self) -> MutexGuard<'_, PlatformSignals> {
        safe_lock(&self.signals, "PlatformGuard")
    }

    pub fn report(&self, signals: PlatformSignals) {
        debug!("Platform signals reported: {signals:?}");
        *self.lock_signals() = signals;
    }

    pub fn is_supported(&self) -> bool {
        is_supported_browser(&self.lock_signals())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
    const EDGE_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.2592.56";
    const FIREFOX_UA: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";

    fn brands(names: &[&str]) -> Option<Vec<Brand>> {
        Some(
            names
                .iter()
                .map(|name| Brand { brand: (*name).to_string(), version: "126".into() })
                .collect(),
        )
    }

    #[test]
    fn test_chrome_brand_list_is_supported() {
        let signals = PlatformSignals {
            brands: brands(&["Not/A)Brand", "Chromium", "Google Chrome"]),
            ..Default::default()
        };
        assert!(is_supported_browser(&signals));
    }

    #[test]
    fn test_edge_brand_list_falls_back_to_user_agent() {
        let signals = PlatformSignals {
            brands: brands(&["Chromium", "Microsoft Edge"]),
            user_agent: Some(EDGE_UA.into()),
            vendor: Some("Google Inc.".into()),
        };
        assert!(!is_supported_browser(&signals));
    }

    #[test]
    fn test_brand_list_with_chrome_and_lookalike_is_not_trusted() {
        let signals = PlatformSignals {
            brands: brands(&["Google Chrome", "Brave"]),
            user_agent: Some(format!("{CHROME_UA} Brave/126")),
            vendor: Some("Google Inc.".into()),
        };
        assert!(!is_supported_browser(&signals));
    }

    #[test]
    fn test_chrome_user_agent_with_google_vendor() {
        let signals = PlatformSignals {
            brands: None,
            user_agent: Some(CHROME_UA.into()),
            vendor: Some("Google Inc.".into()),
        };
        assert!(is_supported_browser(&signals));
    }

    #[test]
    fn test_chrome_user_agent_with_empty_vendor() {
        let signals = PlatformSignals {
            user_agent: Some(CHROME_UA.into()),
            vendor: Some(String::new()),
            ..Default::default()
        };
        assert!(is_supported_browser(&signals));
    }

    #[test]
    fn test_chrome_user_agent_with_other_vendor() {
        let signals = PlatformSignals {
            user_agent: Some(CHROME_UA.into()),
            vendor: Some("Apple Computer, Inc.".into()),
            ..Default::default()
        };
        assert!(!is_supported_browser(&signals));
    }

    #[test]
    fn test_non_chromium_user_agent_is_unsupported() {
        let signals = PlatformSignals {
            user_agent: Some(FIREFOX_UA.into()),
            vendor: Some(String::new()),
            ..Default::default()
        };
        assert!(!is_supported_browser(&signals));
    }

    #[test]
    fn test_no_signals_is_permissive() {
        assert!(is_supported_browser(&PlatformSignals::default()));
        let signals = PlatformSignals {
            brands: Some(Vec::new()),
            user_agent: Some(String::new()),
            vendor: None,
        };
        assert!(is_supported_browser(&signals));
    }

    #[test]
    fn test_guard_reflects_latest_report() {
        let guard = PlatformGuard::default();
        assert!(guard.is_supported());

        guard.report(PlatformSignals {
            user_agent: Some(EDGE_UA.into()),
            ..Default::default()
        });
        assert!(!guard.is_supported());

        guard.report(PlatformSignals {
            user_agent: Some(CHROME_UA.into()),
            vendor: Some("Google Inc.".into()),
            ..Default::default()
        });
        assert!(guard.is_supported());
    }
}
