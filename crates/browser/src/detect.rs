//! Per-engine browser executable detection and install guidance.

use std::path::PathBuf;

use crate::engine::Engine;

/// Chrome/Chromium executable names to search for in PATH.
const CHROME_EXECUTABLES: &[&str] = &[
    "chrome",
    "chrome-browser",
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Microsoft Edge executable names to search for in PATH.
const MSEDGE_EXECUTABLES: &[&str] = &["msedge", "microsoft-edge", "microsoft-edge-stable"];

#[cfg(target_os = "macos")]
const CHROME_MACOS_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(target_os = "macos")]
const MSEDGE_MACOS_PATHS: &[&str] =
    &["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"];

#[cfg(target_os = "windows")]
const CHROME_WINDOWS_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(target_os = "windows")]
const MSEDGE_WINDOWS_PATHS: &[&str] = &[
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
];

/// Result of executable detection for one engine.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Whether an executable was found.
    pub found: bool,
    /// Path to the executable (if found).
    pub path: Option<PathBuf>,
    /// Platform-specific install instructions (when not found).
    pub install_hint: String,
}

impl DetectionResult {
    fn found_at(path: PathBuf) -> Self {
        Self {
            found: true,
            path: Some(path),
            install_hint: String::new(),
        }
    }
}

/// Detect an executable for the given engine.
///
/// Checks (in order):
/// 1. Custom path from config (if provided)
/// 2. Engine-specific environment variable (`CHROME` / `MSEDGE`)
/// 3. Platform-specific installation paths (more reliable than PATH,
///    which can contain broken wrapper scripts)
/// 4. Known executable names in PATH (fallback)
pub fn detect_engine(engine: Engine, custom_path: Option<&str>) -> DetectionResult {
    if let Some(path) = custom_path {
        let p = PathBuf::from(path);
        if p.exists() {
            return DetectionResult::found_at(p);
        }
    }

    if let Some(var) = env_var_name(engine)
        && let Ok(path) = std::env::var(var)
    {
        let p = PathBuf::from(&path);
        if p.exists() {
            return DetectionResult::found_at(p);
        }
    }

    #[cfg(target_os = "macos")]
    for path in macos_paths(engine) {
        let p = PathBuf::from(path);
        if p.exists() {
            return DetectionResult::found_at(p);
        }
    }

    #[cfg(target_os = "windows")]
    for path in windows_paths(engine) {
        let p = PathBuf::from(path);
        if p.exists() {
            return DetectionResult::found_at(p);
        }
    }

    for name in path_executables(engine) {
        if let Ok(path) = which::which(name) {
            return DetectionResult::found_at(path);
        }
    }

    DetectionResult {
        found: false,
        path: None,
        install_hint: install_instructions(engine),
    }
}

fn env_var_name(engine: Engine) -> Option<&'static str> {
    match engine {
        Engine::Chrome => Some("CHROME"),
        Engine::Msedge => Some("MSEDGE"),
        _ => None,
    }
}

fn path_executables(engine: Engine) -> &'static [&'static str] {
    match engine {
        Engine::Chrome => CHROME_EXECUTABLES,
        Engine::Msedge => MSEDGE_EXECUTABLES,
        _ => &[],
    }
}

#[cfg(target_os = "macos")]
fn macos_paths(engine: Engine) -> &'static [&'static str] {
    match engine {
        Engine::Chrome => CHROME_MACOS_PATHS,
        Engine::Msedge => MSEDGE_MACOS_PATHS,
        _ => &[],
    }
}

#[cfg(target_os = "windows")]
fn windows_paths(engine: Engine) -> &'static [&'static str] {
    match engine {
        Engine::Chrome => CHROME_WINDOWS_PATHS,
        Engine::Msedge => MSEDGE_WINDOWS_PATHS,
        _ => &[],
    }
}

/// Platform-specific install instructions for the given engine.
pub fn install_instructions(engine: Engine) -> String {
    let (name, macos, linux, windows) = match engine {
        Engine::Chrome => (
            "Chrome/Chromium",
            "brew install --cask google-chrome",
            "sudo apt install chromium-browser  # or dnf/pacman equivalents",
            "winget install Google.Chrome",
        ),
        Engine::Msedge => (
            "Microsoft Edge",
            "brew install --cask microsoft-edge",
            "see https://www.microsoft.com/edge for Linux packages",
            "winget install Microsoft.Edge",
        ),
        other => {
            return format!("engine '{other}' cannot be driven over CDP");
        },
    };

    let instructions = if cfg!(target_os = "macos") {
        macos
    } else if cfg!(target_os = "windows") {
        windows
    } else {
        linux
    };

    format!(
        "No {name} executable found. Install one:\n\n  {instructions}\n\n\
         Or set the path in the config:\n  \
         [browser]\n  \
         {}_path = \"/path/to/browser\"",
        engine.as_str()
    )
}
