//! Device, OS, browser and network descriptors.
//!
//! Detection is best effort over the user-agent string and the host's
//! network-status surface. Any missing signal yields `"unknown"`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Value used for every descriptor that cannot be determined.
pub const UNKNOWN: &str = "unknown";

static TABLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)iPad|Tablet").unwrap());
static MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Mobile|Android|iPhone").unwrap());

static WINDOWS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Windows NT (\d+\.\d+)").unwrap());
static MACOS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Mac OS X (\d+[._]\d+)").unwrap());
static ANDROID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Android (\d+(?:\.\d+)?)").unwrap());
static IOS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:iPhone OS|CPU OS) (\d+_\d+)").unwrap());

static CHROME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Chrome/(\d+)").unwrap());
static FIREFOX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Firefox/(\d+)").unwrap());
static SAFARI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Safari/(\d+)").unwrap());
static EDGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Edg/(\d+)").unwrap());

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Network status as reported by the host (Network Information API shape).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    /// Connection type, e.g. `wifi`, `cellular`
    pub connection_type: Option<String>,
    /// Effective type, e.g. `4g`, `3g`
    pub effective_type: Option<String>,
}

/// Device and network descriptors attached to every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default = "unknown")]
    pub device_type: String,
    #[serde(default = "unknown")]
    pub device_model: String,
    #[serde(default = "unknown")]
    pub os: String,
    #[serde(default = "unknown")]
    pub os_version: String,
    #[serde(default = "unknown")]
    pub browser: String,
    #[serde(default = "unknown")]
    pub browser_version: String,
    #[serde(default = "unknown")]
    pub network_type: String,
    #[serde(default = "unknown")]
    pub network_effective_type: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            device_type: unknown(),
            device_model: unknown(),
            os: unknown(),
            os_version: unknown(),
            browser: unknown(),
            browser_version: unknown(),
            network_type: unknown(),
            network_effective_type: unknown(),
        }
    }
}

impl DeviceInfo {
    /// Classifies the runtime from its user agent and network status.
    pub fn detect(user_agent: Option<&str>, network: Option<&NetworkStatus>) -> Self {
        let mut info = Self::default();

        if let Some(ua) = user_agent.filter(|ua| !ua.trim().is_empty()) {
            let device_type = device_type(ua);
            info.device_type = device_type.to_string();
            info.device_model = device_type.to_string();

            if let Some((os, version)) = operating_system(ua) {
                info.os = os.to_string();
                info.os_version = version;
            }
            if let Some((browser, version)) = browser(ua) {
                info.browser = browser.to_string();
                info.browser_version = version;
            }
        }

        if let Some(network) = network {
            if let Some(kind) = non_empty(network.connection_type.as_deref()) {
                info.network_type = kind.to_string();
            }
            if let Some(kind) = non_empty(network.effective_type.as_deref()) {
                info.network_effective_type = kind.to_string();
            }
        }

        info
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn device_type(ua: &str) -> &'static str {
    if TABLET.is_match(ua) {
        "tablet"
    } else if MOBILE.is_match(ua) {
        "mobile"
    } else {
        "desktop"
    }
}

fn capture(re: &Regex, ua: &str) -> Option<String> {
    re.captures(ua)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().replacen('_', ".", 1))
}

fn operating_system(ua: &str) -> Option<(&'static str, String)> {
    if let Some(v) = capture(&WINDOWS, ua) {
        Some(("Windows", v))
    } else if let Some(v) = capture(&MACOS, ua) {
        Some(("macOS", v))
    } else if let Some(v) = capture(&ANDROID, ua) {
        Some(("Android", v))
    } else {
        capture(&IOS, ua).map(|v| ("iOS", v))
    }
}

fn browser(ua: &str) -> Option<(&'static str, String)> {
    if !ua.contains("Edg") {
        if let Some(v) = capture(&CHROME, ua) {
            return Some(("Chrome", v));
        }
    }
    if let Some(v) = capture(&FIREFOX, ua) {
        return Some(("Firefox", v));
    }
    if !ua.contains("Chrome") {
        if let Some(v) = capture(&SAFARI, ua) {
            return Some(("Safari", v));
        }
    }
    capture(&EDGE, ua).map(|v| ("Edge", v))
}
