//! Config schema types (server, browser launch, booking defaults).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotgrabConfig {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub booking: BookingDefaults,
}

/// Control server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

/// Browser launch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window. Off by default: the operator must be
    /// able to see the window to solve verification challenges by hand.
    pub headless: bool,
    /// Viewport width.
    pub viewport_width: u32,
    /// Viewport height.
    pub viewport_height: u32,
    /// Fixed delay after each page action, in milliseconds.
    pub slow_mo_ms: u64,
    /// CDP request timeout in milliseconds.
    pub navigation_timeout_ms: u64,
    /// Directory holding per-session browser profiles. Defaults to
    /// `<data dir>/user_data`.
    pub user_data_dir: Option<PathBuf>,
    /// Path to a Chrome/Chromium binary (auto-detected if not set).
    pub chrome_path: Option<String>,
    /// Path to a Microsoft Edge binary (auto-detected if not set).
    pub msedge_path: Option<String>,
    /// Additional browser arguments.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport_width: 1280,
            viewport_height: 720,
            slow_mo_ms: 100,
            navigation_timeout_ms: 30000,
            user_data_dir: None,
            chrome_path: None,
            msedge_path: None,
            extra_args: Vec::new(),
        }
    }
}

/// Booking flow defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingDefaults {
    /// Booking site URL used outside test mode.
    pub production_url: String,
}

impl Default for BookingDefaults {
    fn default() -> Self {
        Self {
            production_url: "https://popmartth.rocket-booking.app/".into(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_local_and_headed() {
        let cfg = SlotgrabConfig::default();
        assert_eq!(cfg.server.port, 5000);
        assert!(!cfg.browser.headless);
        assert_eq!(cfg.browser.viewport_width, 1280);
        assert_eq!(cfg.browser.viewport_height, 720);
        assert_eq!(cfg.browser.slow_mo_ms, 100);
        assert!(cfg.booking.production_url.starts_with("https://"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: SlotgrabConfig = toml::from_str(
            r#"
            [server]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.browser.slow_mo_ms, 100);
    }
}
