//! Browser session launch and teardown.

use std::path::{Path, PathBuf};

use {
    chromiumoxide::{Browser, BrowserConfig as CdpBrowserConfig, Page},
    futures::StreamExt,
    tokio::{task::JoinHandle, time::Duration},
    tracing::{debug, info},
};

use crate::{detect, engine::Engine, error::BrowserError};

/// Arguments passed to every launch to look less like an automated browser.
const STEALTH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-extensions",
    "--no-sandbox",
    "--disable-setuid-sandbox",
];

/// Engine-agnostic launch settings.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window. Headed by default so the operator can
    /// solve verification challenges by hand.
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout_ms: u64,
    /// Base directory for per-session profile directories.
    pub user_data_dir: PathBuf,
    pub chrome_path: Option<String>,
    pub msedge_path: Option<String>,
    pub extra_args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: false,
            viewport_width: 1280,
            viewport_height: 720,
            navigation_timeout_ms: 30000,
            user_data_dir: slotgrab_config::data_dir().join("user_data"),
            chrome_path: None,
            msedge_path: None,
            extra_args: Vec::new(),
        }
    }
}

impl From<&slotgrab_config::schema::BrowserConfig> for LaunchOptions {
    fn from(cfg: &slotgrab_config::schema::BrowserConfig) -> Self {
        Self {
            headless: cfg.headless,
            viewport_width: cfg.viewport_width,
            viewport_height: cfg.viewport_height,
            navigation_timeout_ms: cfg.navigation_timeout_ms,
            user_data_dir: cfg
                .user_data_dir
                .clone()
                .unwrap_or_else(|| slotgrab_config::data_dir().join("user_data")),
            chrome_path: cfg.chrome_path.clone(),
            msedge_path: cfg.msedge_path.clone(),
            extra_args: cfg.extra_args.clone(),
        }
    }
}

impl LaunchOptions {
    fn custom_path(&self, engine: Engine) -> Option<&str> {
        match engine {
            Engine::Chrome => self.chrome_path.as_deref(),
            Engine::Msedge => self.msedge_path.as_deref(),
            _ => None,
        }
    }
}

/// One live browser process bound to a session id.
///
/// The profile directory is keyed by `(session id, engine)` so re-starting
/// the same pair reuses cookies and logins across restarts.
pub struct BrowserSession {
    id: String,
    engine: Engine,
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a browser for the given session id.
    pub async fn launch(
        id: &str,
        engine: Engine,
        opts: &LaunchOptions,
    ) -> Result<Self, BrowserError> {
        if !engine.cdp_capable() {
            return Err(BrowserError::UnsupportedEngine(engine));
        }

        let detection = detect::detect_engine(engine, opts.custom_path(engine));
        let Some(executable) = detection.path else {
            return Err(BrowserError::LaunchFailed(format!(
                "no executable for engine '{engine}'. {}",
                detection.install_hint
            )));
        };

        let profile = profile_dir(&opts.user_data_dir, id, engine);
        std::fs::create_dir_all(&profile)
            .map_err(|e| BrowserError::LaunchFailed(format!("create profile dir: {e}")))?;

        let mut builder = CdpBrowserConfig::builder();

        // chromiumoxide runs headless by default; with_head() shows the window.
        if !opts.headless {
            builder = builder.with_head();
        }

        builder = builder
            .chrome_executable(&executable)
            .user_data_dir(&profile)
            .viewport(chromiumoxide::handler::viewport::Viewport {
                width: opts.viewport_width,
                height: opts.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            })
            .request_timeout(Duration::from_millis(opts.navigation_timeout_ms));

        for arg in STEALTH_ARGS {
            builder = builder.arg(*arg);
        }
        for arg in &opts.extra_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(|e| {
            BrowserError::LaunchFailed(format!("failed to build browser config: {e}"))
        })?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Drain CDP events until the connection closes.
        let session_id = id.to_string();
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!(session_id, ?event, "browser event");
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!(
            session_id = id,
            %engine,
            executable = %executable.display(),
            profile = %profile.display(),
            "launched browser session"
        );

        Ok(Self {
            id: id.to_string(),
            engine,
            browser,
            page,
            handler_task,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Handle to the session's page. Pages are cheap clones over the same
    /// CDP target, so callers can hold one across the whole flow.
    pub fn page(&self) -> Page {
        self.page.clone()
    }

    /// Close the browser process. In-flight page waits observe the closed
    /// connection and fail, which is how stop cancels a running flow.
    pub async fn close(&mut self) -> Result<(), BrowserError> {
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::CloseFailed(e.to_string()));
        self.handler_task.abort();
        if result.is_ok() {
            info!(session_id = self.id, "closed browser session");
        }
        result
    }
}

/// Profile directory for a `(session id, engine)` pair.
///
/// The id is caller-supplied, so it is flattened to a filesystem-safe name
/// before being used as a path component.
pub fn profile_dir(base: &Path, id: &str, engine: Engine) -> PathBuf {
    let safe: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    base.join(format!("{safe}_{engine}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_dir_is_keyed_by_id_and_engine() {
        let base = Path::new("/tmp/slotgrab");
        assert_eq!(
            profile_dir(base, "run-1", Engine::Chrome),
            PathBuf::from("/tmp/slotgrab/run-1_chrome")
        );
        assert_eq!(
            profile_dir(base, "run-1", Engine::Msedge),
            PathBuf::from("/tmp/slotgrab/run-1_msedge")
        );
    }

    #[test]
    fn profile_dir_flattens_path_separators() {
        let base = Path::new("/tmp/slotgrab");
        let dir = profile_dir(base, "../evil/../../id", Engine::Chrome);
        assert_eq!(dir, PathBuf::from("/tmp/slotgrab/---evil------id_chrome"));
    }

    #[tokio::test]
    async fn launch_rejects_non_cdp_engines() {
        let opts = LaunchOptions::default();
        for engine in [Engine::Firefox, Engine::Webkit] {
            let err = BrowserSession::launch("t", engine, &opts).await.err();
            assert!(matches!(err, Some(BrowserError::UnsupportedEngine(e)) if e == engine));
        }
    }
}
