use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::SlotgrabConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["slotgrab.toml", "slotgrab.yaml", "slotgrab.yml", "slotgrab.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<SlotgrabConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./slotgrab.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/slotgrab/slotgrab.{toml,yaml,yml,json}` (user-global)
///
/// Returns `SlotgrabConfig::default()` if no config file is found.
pub fn discover_and_load() -> SlotgrabConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    SlotgrabConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/slotgrab/
    if let Some(dir) = config_dir() {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/slotgrab/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "slotgrab").map(|d| d.config_dir().to_path_buf())
}

/// Returns the user-global data directory. Browser profile directories
/// live under `<data_dir>/user_data/`.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "slotgrab")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<SlotgrabConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_toml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slotgrab.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0\"\nport = 8123\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0");
        assert_eq!(cfg.server.port, 8123);
    }

    #[test]
    fn load_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slotgrab.json");
        std::fs::write(&path, r#"{"browser":{"headless":true}}"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert!(cfg.browser.headless);
    }

    #[test]
    fn load_yaml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slotgrab.yaml");
        std::fs::write(&path, "booking:\n  production_url: https://stub.example/\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.booking.production_url, "https://stub.example/");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/slotgrab.toml")).is_err());
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slotgrab.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(load_config(&path).is_err());
    }
}
