//! Browser engine selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Browser engine requested by the caller.
///
/// The wire names are what callers put in start requests. Only Chromium-based
/// engines can actually be driven (see [`Engine::cdp_capable`]); firefox
/// and webkit are kept so requests naming them parse and fail with a
/// dedicated error instead of a generic "invalid browser type".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Chrome,
    Msedge,
    Firefox,
    Webkit,
}

impl Engine {
    pub const ALL: [Engine; 4] = [Engine::Chrome, Engine::Msedge, Engine::Firefox, Engine::Webkit];

    /// Parse a wire name. Unknown names return `None`.
    pub fn parse(s: &str) -> Option<Engine> {
        match s {
            "chrome" => Some(Engine::Chrome),
            "msedge" => Some(Engine::Msedge),
            "firefox" => Some(Engine::Firefox),
            "webkit" => Some(Engine::Webkit),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Chrome => "chrome",
            Engine::Msedge => "msedge",
            Engine::Firefox => "firefox",
            Engine::Webkit => "webkit",
        }
    }

    /// Whether this engine speaks the Chrome DevTools Protocol.
    pub fn cdp_capable(self) -> bool {
        matches!(self, Engine::Chrome | Engine::Msedge)
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_names() {
        assert_eq!(Engine::parse("chrome"), Some(Engine::Chrome));
        assert_eq!(Engine::parse("msedge"), Some(Engine::Msedge));
        assert_eq!(Engine::parse("firefox"), Some(Engine::Firefox));
        assert_eq!(Engine::parse("webkit"), Some(Engine::Webkit));
        assert_eq!(Engine::parse("safari"), None);
        assert_eq!(Engine::parse("Chrome"), None);
        assert_eq!(Engine::parse(""), None);
    }

    #[test]
    fn only_chromium_engines_are_cdp_capable() {
        assert!(Engine::Chrome.cdp_capable());
        assert!(Engine::Msedge.cdp_capable());
        assert!(!Engine::Firefox.cdp_capable());
        assert!(!Engine::Webkit.cdp_capable());
    }

    #[test]
    fn display_matches_wire_name() {
        for engine in Engine::ALL {
            assert_eq!(Engine::parse(engine.as_str()), Some(engine));
        }
    }
}
